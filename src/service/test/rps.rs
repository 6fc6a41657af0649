use std::time::Duration;

use test_utils::builder::TestBuilder;

use super::*;
use crate::{
    engine::random::SequenceRandom,
    engine::rps::{Challenge, RpsChoice, RpsResult, SoloRound, DUEL_TIE_REWARD, DUEL_WIN_REWARD},
    error::game::GameError,
    service::rps::{RpsCooldowns, RpsService},
    session::SessionStore,
};

struct Stores {
    solo: SessionStore<SoloRound>,
    challenges: SessionStore<Challenge>,
    cooldowns: RpsCooldowns,
}

impl Stores {
    fn new() -> Self {
        Self {
            solo: SessionStore::new("rps", Duration::from_secs(300)),
            challenges: SessionStore::new("rps-challenge", Duration::from_secs(120)),
            cooldowns: RpsCooldowns::new(),
        }
    }
}

/// Tests a solo round followed by an immediate second one.
///
/// Expected: Reward credited for the result, then Err(Cooldown)
#[tokio::test]
async fn solo_round_pays_then_cools_down() -> Result<(), AppError> {
    let test = TestBuilder::new().with_casino_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let stores = Stores::new();
    let service = RpsService::new(db, &stores.solo, &stores.challenges, &stores.cooldowns);

    service.start_solo(ctx(1)).await?;
    let outcome = service.throw(ctx(1), RpsChoice::Rock).await?;

    let expected = match outcome.result {
        RpsResult::Win => 10,
        RpsResult::Tie => 5,
        RpsResult::Lose => 0,
    };
    assert_eq!(outcome.reward, expected);
    assert_eq!(coins(db, 1).await?, 1000 + expected);
    assert!(stores.solo.is_empty().await);

    let again = service.start_solo(ctx(1)).await;
    assert!(matches!(
        again,
        Err(AppError::GameErr(GameError::Cooldown { .. }))
    ));

    Ok(())
}

/// Tests throwing without an open solo round.
///
/// Expected: Err(SessionExpired)
#[tokio::test]
async fn throw_without_round_is_expired() -> Result<(), AppError> {
    let test = TestBuilder::new().with_casino_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let stores = Stores::new();
    let service = RpsService::new(db, &stores.solo, &stores.challenges, &stores.cooldowns);

    let result = service.throw(ctx(1), RpsChoice::Paper).await;

    assert!(matches!(
        result,
        Err(AppError::GameErr(GameError::SessionExpired))
    ));

    Ok(())
}

/// Tests a challenge accepted by someone other than the challenged member.
///
/// Expected: Err(SessionNotOwned), challenge stays open for the real opponent
#[tokio::test]
async fn only_opponent_may_accept() -> Result<(), AppError> {
    let test = TestBuilder::new().with_casino_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let stores = Stores::new();
    let service = RpsService::new(db, &stores.solo, &stores.challenges, &stores.cooldowns);

    service.challenge(ctx(1), 2, RpsChoice::Rock).await?;
    let stranger = service.accept(ctx(3), 1, RpsChoice::Paper).await;

    assert!(matches!(
        stranger,
        Err(AppError::GameErr(GameError::SessionNotOwned))
    ));
    assert_eq!(stores.challenges.len().await, 1);

    let outcome = service.accept(ctx(2), 1, RpsChoice::Paper).await?;
    assert_eq!(outcome.winner, Some(2));
    assert_eq!(coins(db, 2).await?, 1000 + DUEL_WIN_REWARD);
    assert!(stores.challenges.is_empty().await);

    Ok(())
}

/// Tests a tied challenge.
///
/// Expected: Both members receive the tie reward
#[tokio::test]
async fn tied_duel_pays_both() -> Result<(), AppError> {
    let test = TestBuilder::new().with_casino_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let stores = Stores::new();
    let service = RpsService::new(db, &stores.solo, &stores.challenges, &stores.cooldowns);

    service.challenge(ctx(1), 2, RpsChoice::Scissors).await?;
    let outcome = service.accept(ctx(2), 1, RpsChoice::Scissors).await?;

    assert_eq!(outcome.winner, None);
    assert_eq!(coins(db, 1).await?, 1000 + DUEL_TIE_REWARD);
    assert_eq!(coins(db, 2).await?, 1000 + DUEL_TIE_REWARD);

    Ok(())
}

/// Tests challenging yourself.
///
/// Expected: Err(InvalidAction), nothing stored
#[tokio::test]
async fn cannot_challenge_self() -> Result<(), AppError> {
    let test = TestBuilder::new().with_casino_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let stores = Stores::new();
    let service = RpsService::new(db, &stores.solo, &stores.challenges, &stores.cooldowns);

    let result = service.challenge(ctx(1), 1, RpsChoice::Rock).await;

    assert!(matches!(
        result,
        Err(AppError::GameErr(GameError::InvalidAction(_)))
    ));
    assert!(stores.challenges.is_empty().await);

    Ok(())
}

/// Tests a solo throw whose reward cannot be credited.
///
/// Expected: Round stays open without a cooldown, the next throw pays the reward
#[tokio::test]
async fn failed_reward_keeps_round_open() -> Result<(), AppError> {
    let test = TestBuilder::new().with_casino_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let stores = Stores::new();
    let service = RpsService::new(db, &stores.solo, &stores.challenges, &stores.cooldowns);

    let bot_scissors = SoloRound::new(&mut SequenceRandom::new().with_ints([2]));
    stores.solo.create(1, GUILD, bot_scissors).await?;

    take_ledger_offline(db).await?;
    let failed = service.throw(ctx(1), RpsChoice::Rock).await;
    bring_ledger_online(db).await?;

    assert!(matches!(failed, Err(AppError::DbErr(_))));
    assert_eq!(stores.solo.len().await, 1);
    assert!(service.start_solo(ctx(1)).await.is_err());

    let outcome = service.throw(ctx(1), RpsChoice::Rock).await?;
    assert_eq!(outcome.result, RpsResult::Win);
    assert_eq!(coins(db, 1).await?, 1010);
    assert!(stores.solo.is_empty().await);

    Ok(())
}
