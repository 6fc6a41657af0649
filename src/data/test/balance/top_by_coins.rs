use super::*;

/// Tests leaderboard ordering and guild scoping.
///
/// Expected: Ok with only the guild's members, richest first, truncated to the limit
#[tokio::test]
async fn orders_by_coins_within_guild() -> Result<(), AppError> {
    let test = TestBuilder::new().with_table(Balance).build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    factory::create_balance_with_coins(db, 1, 9, 50).await?;
    factory::create_balance_with_coins(db, 2, 9, 500).await?;
    factory::create_balance_with_coins(db, 3, 9, 5).await?;
    factory::create_balance_with_coins(db, 4, 8, 9999).await?;

    let repo = BalanceRepository::new(db);
    let top = repo.top_by_coins(9, 2).await?;

    let users: Vec<u64> = top.iter().map(|b| b.user_id).collect();
    assert_eq!(users, vec![2, 1]);

    Ok(())
}
