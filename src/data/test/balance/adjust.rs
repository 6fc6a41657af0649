use super::*;

/// Tests a debit that the balance covers.
///
/// Expected: Ok(true) and coins reduced by the debit
#[tokio::test]
async fn debits_when_funds_available() -> Result<(), AppError> {
    let test = TestBuilder::new().with_table(Balance).build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    factory::create_balance_with_coins(db, 1, 1, 100).await?;

    let repo = BalanceRepository::new(db);
    let applied = repo.adjust(Wallet::new(1, 1), -100, 0).await?;

    assert!(applied);
    assert_eq!(repo.find(Wallet::new(1, 1)).await?.unwrap().coins, 0);

    Ok(())
}

/// Tests a debit exceeding the balance.
///
/// Verifies the conditional update refuses to write a negative balance.
///
/// Expected: Ok(false) and coins untouched
#[tokio::test]
async fn refuses_debit_beyond_balance() -> Result<(), AppError> {
    let test = TestBuilder::new().with_table(Balance).build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    factory::create_balance_with_coins(db, 1, 1, 99).await?;

    let repo = BalanceRepository::new(db);
    let applied = repo.adjust(Wallet::new(1, 1), -100, 0).await?;

    assert!(!applied);
    assert_eq!(repo.find(Wallet::new(1, 1)).await?.unwrap().coins, 99);

    Ok(())
}

/// Tests a credit that counts toward lifetime earnings.
///
/// Expected: Ok(true) with coins and total_earned both increased
#[tokio::test]
async fn credits_and_tracks_earnings() -> Result<(), AppError> {
    let test = TestBuilder::new().with_table(Balance).build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    factory::create_balance_with_coins(db, 1, 1, 100).await?;

    let repo = BalanceRepository::new(db);
    repo.adjust(Wallet::new(1, 1), 250, 250).await?;

    let balance = repo.find(Wallet::new(1, 1)).await?.unwrap();
    assert_eq!(balance.coins, 350);
    assert_eq!(balance.total_earned, 250);

    Ok(())
}

/// Tests adjusting a member with no ledger row.
///
/// Expected: Ok(false) since no row matched
#[tokio::test]
async fn missing_row_is_not_adjusted() -> Result<(), AppError> {
    let test = TestBuilder::new().with_table(Balance).build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = BalanceRepository::new(db);

    assert!(!repo.adjust(Wallet::new(5, 5), 10, 10).await?);

    Ok(())
}
