use sea_orm::DatabaseConnection;

use crate::{
    engine::{
        hilo::{Guess, GuessResult, HiLoGame, HiLoPhase},
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

pub struct HiLoService<'a> {
    db: &'a DatabaseConnection,
    sessions: &'a SessionStore<HiLoGame>,
}

impl<'a> HiLoService<'a> {
    pub fn new(db: &'a DatabaseConnection, sessions: &'a SessionStore<HiLoGame>) -> Self {
        Self { db, sessions }
    }

    /// Takes the bet and turns over the first card.
    pub async fn start(&self, ctx: PlayContext, bet: i64) -> Result<HiLoGame, AppError> {
        let game = HiLoGame::new(bet, &mut SystemRandom);
        self.start_with_game(ctx, game).await
    }

    pub(crate) async fn start_with_game(
        &self,
        ctx: PlayContext,
        game: HiLoGame,
    ) -> Result<HiLoGame, AppError> {
        RestrictionService::new(self.db)
            .ensure_allowed(ctx, GameKind::HiLo)
            .await?;
        ensure_no_session(self.db, self.sessions, ctx).await?;

        let bet = game.bet();
        EconomyService::new(self.db).debit(ctx.wallet(), bet).await?;
        open_session(self.db, self.sessions, ctx, bet, game.clone()).await?;

        Ok(game)
    }

    /// Draws the next card. A wrong guess ends the round and forfeits the bet.
    pub async fn guess(&self, ctx: PlayContext, guess: Guess) -> Result<GuessResult, AppError> {
        let mut session = lock_session(self.db, self.sessions, ctx).await?;
        let result = session.game.guess(guess, &mut SystemRandom)?;

        let payout = match session.game.phase() {
            HiLoPhase::Lost => Some(0),
            _ => None,
        };
        conclude(self.db, self.sessions, &mut *session, payout).await?;

        Ok(result)
    }

    /// Ends the round and pays the current winnings.
    pub async fn cash_out(&self, ctx: PlayContext) -> Result<HiLoGame, AppError> {
        let mut session = lock_session(self.db, self.sessions, ctx).await?;
        let payout = session.game.cash_out()?;

        conclude(self.db, self.sessions, &mut *session, Some(payout)).await?;

        Ok(session.game.clone())
    }
}
