use super::*;

/// Tests first read of an unknown member.
///
/// Verifies that the ledger creates a row holding the starting coins when a member is
/// looked up for the first time in a guild.
///
/// Expected: Ok with 1000 coins and nothing earned
#[tokio::test]
async fn creates_balance_on_first_read() -> Result<(), AppError> {
    let test = TestBuilder::new().with_table(Balance).build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = BalanceRepository::new(db);
    let balance = repo.get_or_create(Wallet::new(1, 2)).await?;

    assert_eq!(balance.user_id, 1);
    assert_eq!(balance.guild_id, 2);
    assert_eq!(balance.coins, STARTING_COINS);
    assert_eq!(balance.total_earned, 0);
    assert!(balance.last_daily.is_none());

    Ok(())
}

/// Tests reading an existing member.
///
/// Expected: Ok with the stored coins rather than a fresh default
#[tokio::test]
async fn returns_existing_balance() -> Result<(), AppError> {
    let test = TestBuilder::new().with_table(Balance).build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    factory::create_balance_with_coins(db, 10, 20, 42).await?;

    let repo = BalanceRepository::new(db);
    let balance = repo.get_or_create(Wallet::new(10, 20)).await?;

    assert_eq!(balance.coins, 42);

    Ok(())
}

/// Tests that balances are scoped per guild.
///
/// Expected: Ok with an independent default balance in the second guild
#[tokio::test]
async fn balances_are_per_guild() -> Result<(), AppError> {
    let test = TestBuilder::new().with_table(Balance).build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    factory::create_balance_with_coins(db, 10, 20, 42).await?;

    let repo = BalanceRepository::new(db);
    let other = repo.get_or_create(Wallet::new(10, 21)).await?;

    assert_eq!(other.coins, STARTING_COINS);
    assert!(repo.find(Wallet::new(10, 22)).await?.is_none());

    Ok(())
}

/// Tests two first reads of the same member racing each other.
///
/// Verifies that the second insert yields to the first instead of failing on the unique
/// member index.
///
/// Expected: Both Ok with the starting coins and a single stored row
#[tokio::test]
async fn concurrent_first_reads_share_one_row() -> Result<(), AppError> {
    use sea_orm::{EntityTrait, PaginatorTrait};

    let test = TestBuilder::new().with_table(Balance).build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = BalanceRepository::new(db);
    let (first, second) = tokio::join!(
        repo.get_or_create(Wallet::new(5, 6)),
        repo.get_or_create(Wallet::new(5, 6))
    );

    assert_eq!(first?.coins, STARTING_COINS);
    assert_eq!(second?.coins, STARTING_COINS);
    assert_eq!(Balance::find().count(db).await?, 1);

    Ok(())
}
