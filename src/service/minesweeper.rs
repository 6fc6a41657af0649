use sea_orm::DatabaseConnection;

use crate::{
    engine::{
        minesweeper::{MinesweeperGame, MinesweeperPhase, RevealOutcome},
        random::SystemRandom,
    },
    error::AppError,
    model::game::{GameKind, PlayContext},
    service::{
        conclude, economy::EconomyService, ensure_no_session, lock_session, open_session,
        restriction::RestrictionService,
    },
    session::SessionStore,
};

/// Board state after a reveal.
#[derive(Debug, Clone)]
pub struct RevealResult {
    pub outcome: RevealOutcome,
    pub board: MinesweeperGame,
}

pub struct MinesweeperService<'a> {
    db: &'a DatabaseConnection,
    sessions: &'a SessionStore<MinesweeperGame>,
}

impl<'a> MinesweeperService<'a> {
    pub fn new(db: &'a DatabaseConnection, sessions: &'a SessionStore<MinesweeperGame>) -> Self {
        Self { db, sessions }
    }

    /// Takes the bet and lays a board with `mines` randomly placed mines.
    pub async fn start(
        &self,
        ctx: PlayContext,
        bet: i64,
        mines: usize,
    ) -> Result<MinesweeperGame, AppError> {
        let board = MinesweeperGame::new(bet, mines, &mut SystemRandom)?;
        self.start_with_board(ctx, board).await
    }

    pub(crate) async fn start_with_board(
        &self,
        ctx: PlayContext,
        board: MinesweeperGame,
    ) -> Result<MinesweeperGame, AppError> {
        RestrictionService::new(self.db)
            .ensure_allowed(ctx, GameKind::Minesweeper)
            .await?;
        ensure_no_session(self.db, self.sessions, ctx).await?;

        let bet = board.bet();
        EconomyService::new(self.db).debit(ctx.wallet(), bet).await?;
        open_session(self.db, self.sessions, ctx, bet, board.clone()).await?;

        tracing::debug!(
            "User {} started minesweeper with {} mines for {}",
            ctx.user_id,
            board.mine_count(),
            bet
        );

        Ok(board)
    }

    /// Reveals a zero-based cell. A mine ends the round with nothing; clearing the
    /// last safe cell pays out automatically.
    pub async fn reveal(&self, ctx: PlayContext, cell: usize) -> Result<RevealResult, AppError> {
        let mut session = lock_session(self.db, self.sessions, ctx).await?;
        let outcome = session.game.reveal(cell)?;

        let payout = match session.game.phase() {
            MinesweeperPhase::Active => None,
            MinesweeperPhase::Lost { .. } => Some(0),
            MinesweeperPhase::Won { payout } => Some(payout),
        };
        conclude(self.db, self.sessions, &mut *session, payout).await?;

        Ok(RevealResult {
            outcome,
            board: session.game.clone(),
        })
    }

    /// Ends the round at the current multiplier. Needs at least one safe reveal.
    pub async fn cash_out(&self, ctx: PlayContext) -> Result<MinesweeperGame, AppError> {
        let mut session = lock_session(self.db, self.sessions, ctx).await?;
        let payout = session.game.cash_out()?;

        conclude(self.db, self.sessions, &mut *session, Some(payout)).await?;

        Ok(session.game.clone())
    }
}
