use super::*;
use chrono::{Duration, Utc};

/// Tests the first ever daily claim.
///
/// Expected: Ok(true), reward credited and last_daily stamped
#[tokio::test]
async fn first_claim_succeeds() -> Result<(), AppError> {
    let test = TestBuilder::new().with_table(Balance).build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    factory::create_balance_with_coins(db, 1, 1, 0).await?;

    let now = Utc::now();
    let repo = BalanceRepository::new(db);
    let claimed = repo
        .claim_daily(Wallet::new(1, 1), 100, now, now - Duration::hours(24))
        .await?;

    assert!(claimed);
    let balance = repo.find(Wallet::new(1, 1)).await?.unwrap();
    assert_eq!(balance.coins, 100);
    assert_eq!(balance.total_earned, 100);
    assert!(balance.last_daily.is_some());

    Ok(())
}

/// Tests claiming again inside the cooldown window.
///
/// Expected: Ok(false) and coins unchanged
#[tokio::test]
async fn second_claim_within_window_is_refused() -> Result<(), AppError> {
    let test = TestBuilder::new().with_table(Balance).build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let now = Utc::now();
    factory::balance::BalanceFactory::new(db)
        .user_id(1)
        .guild_id(1)
        .coins(0)
        .last_daily(now - Duration::hours(1))
        .build()
        .await?;

    let repo = BalanceRepository::new(db);
    let claimed = repo
        .claim_daily(Wallet::new(1, 1), 100, now, now - Duration::hours(24))
        .await?;

    assert!(!claimed);
    assert_eq!(repo.find(Wallet::new(1, 1)).await?.unwrap().coins, 0);

    Ok(())
}

/// Tests claiming once the cooldown window has passed.
///
/// Expected: Ok(true)
#[tokio::test]
async fn claim_after_window_succeeds() -> Result<(), AppError> {
    let test = TestBuilder::new().with_table(Balance).build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let now = Utc::now();
    factory::balance::BalanceFactory::new(db)
        .user_id(1)
        .guild_id(1)
        .last_daily(now - Duration::hours(25))
        .build()
        .await?;

    let repo = BalanceRepository::new(db);

    assert!(
        repo.claim_daily(Wallet::new(1, 1), 100, now, now - Duration::hours(24))
            .await?
    );

    Ok(())
}
