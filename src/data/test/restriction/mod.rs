use crate::{
    data::restriction::GameRestrictionRepository, error::AppError, model::game::GameKind,
};
use entity::prelude::GameRestriction;
use test_utils::{builder::TestBuilder, factory};

/// Tests that restrictions are returned per game and guild.
///
/// Expected: Ok with only the matching game's channels
#[tokio::test]
async fn gets_restrictions_for_game() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_table(GameRestriction)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    factory::create_restriction(db, 1, "blackjack", 100).await?;
    factory::create_restriction(db, 1, "blackjack", 101).await?;
    factory::create_restriction(db, 1, "crash", 102).await?;
    factory::create_restriction(db, 2, "blackjack", 103).await?;

    let repo = GameRestrictionRepository::new(db);
    let mut channels: Vec<u64> = repo
        .get_by_game(1, GameKind::Blackjack)
        .await?
        .into_iter()
        .map(|r| r.channel_id)
        .collect();
    channels.sort();

    assert_eq!(channels, vec![100, 101]);
    assert_eq!(repo.get_by_guild(1).await?.len(), 3);

    Ok(())
}

/// Tests that creating the same restriction twice is a no-op.
///
/// Expected: Ok(true) then Ok(false), one row stored
#[tokio::test]
async fn create_is_idempotent() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_table(GameRestriction)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = GameRestrictionRepository::new(db);

    assert!(repo.create(1, GameKind::Slots, 5).await?);
    assert!(!repo.create(1, GameKind::Slots, 5).await?);
    assert_eq!(repo.get_by_game(1, GameKind::Slots).await?.len(), 1);

    Ok(())
}

/// Tests removing a restriction.
///
/// Expected: Ok(true) for an existing row, Ok(false) afterwards
#[tokio::test]
async fn deletes_restriction() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_table(GameRestriction)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    factory::create_restriction(db, 1, "dice", 7).await?;

    let repo = GameRestrictionRepository::new(db);

    assert!(repo.delete(1, GameKind::Dice, 7).await?);
    assert!(!repo.delete(1, GameKind::Dice, 7).await?);
    assert!(repo.get_by_game(1, GameKind::Dice).await?.is_empty());

    Ok(())
}
