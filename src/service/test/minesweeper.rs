use std::{collections::BTreeSet, time::Duration};

use test_utils::builder::TestBuilder;

use super::*;
use crate::{
    engine::minesweeper::{MinesweeperGame, MinesweeperPhase, RevealOutcome},
    error::game::GameError,
    service::minesweeper::MinesweeperService,
    session::SessionStore,
};

fn store() -> SessionStore<MinesweeperGame> {
    SessionStore::new("minesweeper", Duration::from_secs(3600))
}

fn board(bet: i64, mines: &[usize]) -> MinesweeperGame {
    MinesweeperGame::with_mines(bet, mines.iter().copied().collect::<BTreeSet<_>>())
}

/// Tests five safe reveals on a three mine board followed by a cash out.
///
/// Expected: 153 paid on a 100 bet, session removed
#[tokio::test]
async fn cash_out_pays_current_multiplier() -> Result<(), AppError> {
    let test = TestBuilder::new().with_casino_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let sessions = store();
    let service = MinesweeperService::new(db, &sessions);

    service.start_with_board(ctx(1), board(100, &[0, 1, 2])).await?;
    assert_eq!(coins(db, 1).await?, 900);

    for cell in 3..8 {
        let result = service.reveal(ctx(1), cell).await?;
        assert!(matches!(result.outcome, RevealOutcome::Safe { .. }));
    }

    let board = service.cash_out(ctx(1)).await?;
    assert_eq!(board.phase(), MinesweeperPhase::Won { payout: 153 });
    assert!(sessions.is_empty().await);
    assert_eq!(coins(db, 1).await?, 1053);

    Ok(())
}

/// Tests revealing a mine.
///
/// Expected: Bet lost, mines revealed, session removed
#[tokio::test]
async fn mine_loses_the_bet() -> Result<(), AppError> {
    let test = TestBuilder::new().with_casino_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let sessions = store();
    let service = MinesweeperService::new(db, &sessions);

    service.start_with_board(ctx(1), board(100, &[5])).await?;
    let result = service.reveal(ctx(1), 5).await?;

    assert_eq!(result.outcome, RevealOutcome::Mine);
    assert!(result.board.mines().is_some());
    assert!(sessions.is_empty().await);
    assert_eq!(coins(db, 1).await?, 900);

    Ok(())
}

/// Tests revealing the same cell twice.
///
/// Expected: Err(InvalidAction), round continues
#[tokio::test]
async fn repeated_reveal_is_rejected() -> Result<(), AppError> {
    let test = TestBuilder::new().with_casino_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let sessions = store();
    let service = MinesweeperService::new(db, &sessions);

    service.start_with_board(ctx(1), board(100, &[5])).await?;
    service.reveal(ctx(1), 0).await?;
    let again = service.reveal(ctx(1), 0).await;

    assert!(matches!(
        again,
        Err(AppError::GameErr(GameError::InvalidAction(_)))
    ));
    assert_eq!(sessions.len().await, 1);

    Ok(())
}

/// Tests cashing out before revealing anything.
///
/// Expected: Err(InvalidAction), stake still on the board
#[tokio::test]
async fn cash_out_needs_a_reveal() -> Result<(), AppError> {
    let test = TestBuilder::new().with_casino_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let sessions = store();
    let service = MinesweeperService::new(db, &sessions);

    service.start_with_board(ctx(1), board(100, &[5])).await?;
    let result = service.cash_out(ctx(1)).await;

    assert!(matches!(
        result,
        Err(AppError::GameErr(GameError::InvalidAction(_)))
    ));
    assert_eq!(coins(db, 1).await?, 900);
    assert_eq!(sessions.len().await, 1);

    Ok(())
}

/// Tests a cash out whose credit fails, followed by another action on the game.
///
/// Expected: Session kept with the payout held, next action credits 153 once and reports it
#[tokio::test]
async fn failed_payout_is_collected_by_next_action() -> Result<(), AppError> {
    let test = TestBuilder::new().with_casino_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let sessions = store();
    let service = MinesweeperService::new(db, &sessions);

    service.start_with_board(ctx(1), board(100, &[0, 1, 2])).await?;
    for cell in 3..8 {
        service.reveal(ctx(1), cell).await?;
    }

    take_ledger_offline(db).await?;
    assert!(matches!(
        service.cash_out(ctx(1)).await,
        Err(AppError::DbErr(_))
    ));
    bring_ledger_online(db).await?;
    assert_eq!(sessions.len().await, 1);

    let retry = service.cash_out(ctx(1)).await;
    assert!(matches!(
        retry,
        Err(AppError::GameErr(GameError::PayoutCollected { payout: 153 }))
    ));
    assert!(sessions.is_empty().await);
    assert_eq!(coins(db, 1).await?, 1053);

    let after = service.cash_out(ctx(1)).await;
    assert!(matches!(after, Err(AppError::GameErr(GameError::SessionExpired))));
    assert_eq!(coins(db, 1).await?, 1053);

    Ok(())
}
