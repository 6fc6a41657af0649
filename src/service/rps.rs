//! Rock-paper-scissors: free solo rounds against the bot and member-to-member challenges.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use sea_orm::DatabaseConnection;
use tokio::sync::RwLock;

use crate::{
    engine::{
        random::SystemRandom,
        rps::{Challenge, DuelOutcome, RpsChoice, SoloOutcome, SoloRound, SOLO_COOLDOWN_SECS},
    },
    error::{game::GameError, AppError},
    model::{
        balance::Wallet,
        game::{GameKind, PlayContext},
    },
    service::{
        economy::EconomyService, ensure_no_session, lock_session, restriction::RestrictionService,
    },
    session::SessionStore,
};

/// Per-member cooldown between solo rounds.
#[derive(Clone, Default)]
pub struct RpsCooldowns {
    until: Arc<RwLock<HashMap<(u64, u64), Instant>>>,
}

impl RpsCooldowns {
    pub fn new() -> Self {
        Self::default()
    }

    async fn remaining(&self, wallet: Wallet, now: Instant) -> Option<Duration> {
        let until = self.until.read().await;
        until
            .get(&(wallet.user_id, wallet.guild_id))
            .and_then(|until| until.checked_duration_since(now))
            .filter(|left| !left.is_zero())
    }

    async fn start(&self, wallet: Wallet, now: Instant) {
        let mut until = self.until.write().await;
        until.retain(|_, until| *until > now);
        until.insert(
            (wallet.user_id, wallet.guild_id),
            now + Duration::from_secs(SOLO_COOLDOWN_SECS),
        );
    }
}

pub struct RpsService<'a> {
    db: &'a DatabaseConnection,
    solo: &'a SessionStore<SoloRound>,
    challenges: &'a SessionStore<Challenge>,
    cooldowns: &'a RpsCooldowns,
}

impl<'a> RpsService<'a> {
    pub fn new(
        db: &'a DatabaseConnection,
        solo: &'a SessionStore<SoloRound>,
        challenges: &'a SessionStore<Challenge>,
        cooldowns: &'a RpsCooldowns,
    ) -> Self {
        Self {
            db,
            solo,
            challenges,
            cooldowns,
        }
    }

    /// Opens a solo round; the bot commits to its move now.
    ///
    /// # Returns
    /// - `Ok(())` - Round open, waiting for the player's throw
    /// - `Err(GameErr(Cooldown))` - The player finished a round less than a minute ago
    /// - `Err(GameErr(ActiveSessionExists))` - A solo round is already open
    pub async fn start_solo(&self, ctx: PlayContext) -> Result<(), AppError> {
        RestrictionService::new(self.db)
            .ensure_allowed(ctx, GameKind::Rps)
            .await?;

        if let Some(left) = self.cooldowns.remaining(ctx.wallet(), Instant::now()).await {
            return Err(GameError::Cooldown {
                remaining_secs: left.as_secs().max(1),
            }
            .into());
        }

        ensure_no_session(self.db, self.solo, ctx).await?;
        self.solo
            .create(ctx.user_id, ctx.guild_id, SoloRound::new(&mut SystemRandom))
            .await?;

        Ok(())
    }

    /// Resolves the open solo round and pays the reward.
    pub async fn throw(&self, ctx: PlayContext, choice: RpsChoice) -> Result<SoloOutcome, AppError> {
        let mut session = lock_session(self.db, self.solo, ctx).await?;
        let outcome = session.game.throw(choice);

        // The bot's move is fixed, so a failed credit leaves the round open to throw again
        EconomyService::new(self.db)
            .credit(ctx.wallet(), outcome.reward)
            .await?;

        if session.settle() {
            self.solo.remove(&session.id).await;
            self.cooldowns.start(ctx.wallet(), Instant::now()).await;
        }

        Ok(outcome)
    }

    /// Challenges `opponent`. The challenge waits for them to accept.
    pub async fn challenge(
        &self,
        ctx: PlayContext,
        opponent: u64,
        choice: RpsChoice,
    ) -> Result<(), AppError> {
        RestrictionService::new(self.db)
            .ensure_allowed(ctx, GameKind::Rps)
            .await?;

        let challenge = Challenge::new(ctx.user_id, opponent, choice)?;
        self.challenges
            .create(ctx.user_id, ctx.guild_id, challenge)
            .await?;

        tracing::debug!("User {} challenged {} to rps", ctx.user_id, opponent);

        Ok(())
    }

    /// Accepts `challenger`'s open challenge. Only the challenged member may accept.
    pub async fn accept(
        &self,
        ctx: PlayContext,
        challenger: u64,
        choice: RpsChoice,
    ) -> Result<DuelOutcome, AppError> {
        let handle = self
            .challenges
            .find_by_owner(challenger, ctx.guild_id)
            .await
            .ok_or(GameError::SessionExpired)?;

        let mut session = handle.lock().await;
        session.ensure_active()?;
        let outcome = session.game.accept(ctx.user_id, choice)?;

        if session.settle() {
            self.challenges.remove(&session.id).await;

            let economy = EconomyService::new(self.db);
            for &(user_id, reward) in &outcome.rewards {
                economy
                    .credit(Wallet::new(user_id, ctx.guild_id), reward)
                    .await?;
            }
        }

        Ok(outcome)
    }
}
