//! Single-shot games: coinflip, dice, slots, roulette and the wheel.

use sea_orm::DatabaseConnection;

use crate::{
    engine::{
        casino::{CasinoBet, CasinoOutcome},
        random::{RandomSource, SystemRandom},
    },
    error::AppError,
    model::game::PlayContext,
    service::{economy::EconomyService, restriction::RestrictionService},
};

/// Result of one single-shot game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CasinoPlay {
    pub outcome: CasinoOutcome,
    pub bet: i64,
    /// Balance after the payout was credited.
    pub balance: i64,
}

impl CasinoPlay {
    /// Payout minus bet.
    pub fn net(&self) -> i64 {
        self.outcome.payout - self.bet
    }
}

pub struct CasinoService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> CasinoService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Debits `bet`, draws once and credits the payout.
    ///
    /// # Arguments
    /// - `ctx` - Invoking member and channel
    /// - `bet` - Coins wagered
    /// - `call` - Game and the player's call
    ///
    /// # Returns
    /// - `Ok(CasinoPlay)` - Draw, payout and resulting balance
    /// - `Err(GameErr(InvalidAction))` - Call no draw could match (e.g. dice guess 7)
    /// - `Err(GameErr(GameRestricted))` - Game not allowed in this channel
    /// - `Err(GameErr(InsufficientFunds))` - Balance below `bet`
    pub async fn play(
        &self,
        ctx: PlayContext,
        bet: i64,
        call: CasinoBet,
    ) -> Result<CasinoPlay, AppError> {
        self.play_with(ctx, bet, call, &mut SystemRandom).await
    }

    pub(crate) async fn play_with<R>(
        &self,
        ctx: PlayContext,
        bet: i64,
        call: CasinoBet,
        rng: &mut R,
    ) -> Result<CasinoPlay, AppError>
    where
        R: RandomSource + Send,
    {
        call.validate()?;
        RestrictionService::new(self.db)
            .ensure_allowed(ctx, call.game())
            .await?;

        let economy = EconomyService::new(self.db);
        economy.debit(ctx.wallet(), bet).await?;

        let outcome = call.resolve(bet, rng)?;
        economy.credit(ctx.wallet(), outcome.payout).await?;

        let balance = economy.balance(ctx.wallet()).await?.coins;
        tracing::debug!(
            "User {} played {} for {} and won {}",
            ctx.user_id,
            call.game(),
            bet,
            outcome.payout
        );

        Ok(CasinoPlay {
            outcome,
            bet,
            balance,
        })
    }
}
