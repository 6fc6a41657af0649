use std::time::Duration;

use test_utils::{builder::TestBuilder, factory};

use super::*;
use crate::{
    engine::{
        blackjack::{BlackjackGame, BlackjackPhase, HandOutcome},
        cards::{Card, Deck, Rank, Suit},
    },
    error::game::GameError,
    service::blackjack::BlackjackService,
    session::SessionStore,
};

fn store() -> SessionStore<BlackjackGame> {
    SessionStore::new("blackjack", Duration::from_secs(3600))
}

/// Player 16 against dealer 16, with a ten on top for the next hit.
fn sixteen_vs_sixteen() -> Deck {
    Deck::stacked(&[
        Card::new(Rank::Ten, Suit::Spades),
        Card::new(Rank::Nine, Suit::Diamonds),
        Card::new(Rank::Six, Suit::Spades),
        Card::new(Rank::Seven, Suit::Clubs),
        Card::new(Rank::King, Suit::Hearts),
    ])
}

/// Tests a natural blackjack on the deal.
///
/// Expected: Settled immediately at 2.5x, no session opened
#[tokio::test]
async fn natural_pays_on_the_deal() -> Result<(), AppError> {
    let test = TestBuilder::new().with_casino_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let sessions = store();
    let deck = Deck::stacked(&[
        Card::new(Rank::Ace, Suit::Spades),
        Card::new(Rank::Nine, Suit::Diamonds),
        Card::new(Rank::King, Suit::Spades),
        Card::new(Rank::Seven, Suit::Clubs),
    ]);

    let game = BlackjackService::new(db, &sessions)
        .start_with_deck(ctx(1), 100, deck)
        .await?;

    let settlement = game.settlement().unwrap();
    assert_eq!(settlement.hands[0].outcome, HandOutcome::Blackjack);
    assert_eq!(settlement.total_payout, 250);
    assert!(sessions.is_empty().await);
    assert_eq!(coins(db, 1).await?, 1150);

    Ok(())
}

/// Tests busting on a hit.
///
/// Expected: Bet lost, session removed, further actions report an expired session
#[tokio::test]
async fn bust_ends_the_session() -> Result<(), AppError> {
    let test = TestBuilder::new().with_casino_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let sessions = store();
    let service = BlackjackService::new(db, &sessions);

    let game = service
        .start_with_deck(ctx(1), 100, sixteen_vs_sixteen())
        .await?;
    assert_eq!(game.phase(), &BlackjackPhase::PlayerTurn);
    assert_eq!(sessions.len().await, 1);

    let game = service.hit(ctx(1)).await?;
    let settlement = game.settlement().unwrap();
    assert_eq!(settlement.hands[0].outcome, HandOutcome::Bust);
    assert_eq!(settlement.total_payout, 0);
    assert!(sessions.is_empty().await);
    assert_eq!(coins(db, 1).await?, 900);

    let again = service.hit(ctx(1)).await;
    assert!(matches!(
        again,
        Err(AppError::GameErr(GameError::SessionExpired))
    ));

    Ok(())
}

/// Tests starting a second round while one is in progress.
///
/// Expected: Err(ActiveSessionExists), the second bet never debited
#[tokio::test]
async fn one_round_per_player() -> Result<(), AppError> {
    let test = TestBuilder::new().with_casino_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let sessions = store();
    let service = BlackjackService::new(db, &sessions);

    service
        .start_with_deck(ctx(1), 100, sixteen_vs_sixteen())
        .await?;
    let second = service
        .start_with_deck(ctx(1), 100, sixteen_vs_sixteen())
        .await;

    assert!(matches!(
        second,
        Err(AppError::GameErr(GameError::ActiveSessionExists))
    ));
    assert_eq!(coins(db, 1).await?, 900);

    Ok(())
}

/// Tests doubling down without coins for the extra stake.
///
/// Expected: Err(InsufficientFunds), round still playable
#[tokio::test]
async fn double_down_needs_a_second_stake() -> Result<(), AppError> {
    let test = TestBuilder::new().with_casino_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    factory::create_balance_with_coins(db, 1, GUILD, 150).await?;
    let sessions = store();
    let service = BlackjackService::new(db, &sessions);

    service
        .start_with_deck(ctx(1), 100, sixteen_vs_sixteen())
        .await?;
    let doubled = service.double_down(ctx(1)).await;

    assert!(matches!(
        doubled,
        Err(AppError::GameErr(GameError::InsufficientFunds {
            required: 100,
            available: 50
        }))
    ));
    assert_eq!(sessions.len().await, 1);

    let game = service.stand(ctx(1)).await?;
    assert!(game.settlement().is_some());
    assert!(sessions.is_empty().await);

    Ok(())
}

/// Tests splitting a pair.
///
/// Expected: Second stake debited, play moves to the first split hand
#[tokio::test]
async fn split_takes_a_second_stake() -> Result<(), AppError> {
    let test = TestBuilder::new().with_casino_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let sessions = store();
    let service = BlackjackService::new(db, &sessions);
    let deck = Deck::stacked(&[
        Card::new(Rank::Eight, Suit::Spades),
        Card::new(Rank::Nine, Suit::Diamonds),
        Card::new(Rank::Eight, Suit::Hearts),
        Card::new(Rank::Seven, Suit::Clubs),
        Card::new(Rank::Three, Suit::Spades),
        Card::new(Rank::Two, Suit::Hearts),
    ]);

    service.start_with_deck(ctx(1), 100, deck).await?;
    let game = service.split(ctx(1)).await?;

    assert_eq!(game.phase(), &BlackjackPhase::SplitPlay { hand: 0 });
    assert_eq!(game.hands().len(), 2);
    assert_eq!(game.hands()[0].value(), 11);
    assert_eq!(game.hands()[1].value(), 10);
    assert_eq!(game.total_stake(), 200);
    assert_eq!(coins(db, 1).await?, 800);

    let again = service.split(ctx(1)).await;
    assert!(matches!(
        again,
        Err(AppError::GameErr(GameError::InvalidAction(_)))
    ));
    assert_eq!(coins(db, 1).await?, 800);

    Ok(())
}
