//! Crash rounds, one table per guild.
//!
//! The first join in a guild opens a table in the `Waiting` phase and arms a 30 second
//! auto-start timer. Once the round is running a ticker task advances the multiplier
//! every 100 ms until the crash point or until every player has cashed out. Both tasks
//! are aborted when the round ends early and on shutdown.
//!
//! Tables live in a `SessionStore` keyed by guild: the owner of a crash session is the
//! guild itself, so any member may act on it.

use std::time::{Duration, Instant};

use sea_orm::DatabaseConnection;
use tokio::{
    sync::{mpsc::UnboundedSender, OwnedMutexGuard},
    task::AbortHandle,
};

use crate::{
    engine::{
        crash::{CashOut, CrashPhase, CrashRound},
        random::SystemRandom,
        scale_float,
    },
    error::{game::GameError, internal::InternalError, AppError},
    model::{
        balance::Wallet,
        game::{GameKind, PlayContext},
    },
    service::{economy::EconomyService, restriction::RestrictionService},
    session::{Session, SessionHandle, SessionState, SessionStore},
};

/// Upper bound on a table's life. Rounds normally end well within a minute.
pub const TABLE_TTL: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone, Copy)]
pub struct CrashTiming {
    /// Waiting time before a round with players starts on its own.
    pub auto_start_after: Duration,
    /// Interval between multiplier ticks.
    pub tick_every: Duration,
}

impl Default for CrashTiming {
    fn default() -> Self {
        Self {
            auto_start_after: Duration::from_secs(30),
            tick_every: Duration::from_millis(100),
        }
    }
}

/// A guild's crash round plus the tasks driving it.
pub struct CrashTable {
    pub round: CrashRound,
    pub channel_id: u64,
    auto_start: Option<AbortHandle>,
    ticker: Option<AbortHandle>,
}

impl CrashTable {
    fn abort_tasks(&mut self) {
        if let Some(task) = self.auto_start.take() {
            task.abort();
        }
        if let Some(task) = self.ticker.take() {
            task.abort();
        }
    }
}

/// Round lifecycle announcements for the bot to post.
#[derive(Debug, Clone, PartialEq)]
pub enum CrashEvent {
    Started {
        guild_id: u64,
        channel_id: u64,
        players: usize,
    },
    Crashed {
        guild_id: u64,
        channel_id: u64,
        crash_point: f64,
        /// `(user_id, multiplier, payout)` for every player who cashed out.
        cashed_out: Vec<(u64, f64, i64)>,
        /// `(user_id, bet)` for every player who rode into the crash.
        losers: Vec<(u64, i64)>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CrashSnapshot {
    pub phase: CrashPhase,
    pub multiplier: f64,
    pub players: usize,
    pub pot: i64,
}

impl CrashSnapshot {
    fn of(round: &CrashRound) -> Self {
        Self {
            phase: round.phase(),
            multiplier: round.multiplier(),
            players: round.players().len(),
            pot: round.players().values().map(|p| p.bet).sum(),
        }
    }
}

#[derive(Clone)]
pub struct CrashService {
    db: DatabaseConnection,
    tables: SessionStore<CrashTable>,
    events: Option<UnboundedSender<CrashEvent>>,
    timing: CrashTiming,
}

impl CrashService {
    pub fn new(db: DatabaseConnection, events: Option<UnboundedSender<CrashEvent>>) -> Self {
        Self {
            db,
            tables: SessionStore::new(GameKind::Crash.as_str(), TABLE_TTL),
            events,
            timing: CrashTiming::default(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_timing(mut self, timing: CrashTiming) -> Self {
        self.timing = timing;
        self
    }

    async fn table(&self, guild_id: u64) -> Option<SessionHandle<CrashTable>> {
        self.tables.find_by_owner(guild_id, guild_id).await
    }

    async fn locked_table(
        &self,
        guild_id: u64,
    ) -> Result<OwnedMutexGuard<Session<CrashTable>>, GameError> {
        let handle = self
            .table(guild_id)
            .await
            .ok_or_else(|| GameError::invalid("There is no crash round in this server."))?;

        let session = handle.lock_owned().await;
        session
            .ensure_active()
            .map_err(|_| GameError::invalid("That round just ended."))?;

        Ok(session)
    }

    /// Opens a waiting table with `round` and arms its auto-start timer.
    async fn open_table(
        &self,
        ctx: PlayContext,
        round: CrashRound,
    ) -> Result<SessionHandle<CrashTable>, GameError> {
        let table = CrashTable {
            round,
            channel_id: ctx.channel_id,
            auto_start: None,
            ticker: None,
        };

        let handle = self.tables.create(ctx.guild_id, ctx.guild_id, table).await?;
        let timer = self.spawn_auto_start(handle.clone());
        handle.lock().await.game.auto_start = Some(timer);

        tracing::info!("Opened crash table in guild {}", ctx.guild_id);

        Ok(handle)
    }

    /// Joins the guild's waiting round, opening one if there is none.
    ///
    /// # Returns
    /// - `Ok(CrashSnapshot)` - Round state after joining
    /// - `Err(GameErr(InvalidAction))` - Round already running, or already joined
    /// - `Err(GameErr(InsufficientFunds))` - Balance below `bet`
    pub async fn join(&self, ctx: PlayContext, bet: i64) -> Result<CrashSnapshot, AppError> {
        RestrictionService::new(&self.db)
            .ensure_allowed(ctx, GameKind::Crash)
            .await?;

        let handle = match self.table(ctx.guild_id).await {
            Some(handle) => handle,
            None => match self.open_table(ctx, CrashRound::generate(&mut SystemRandom)).await {
                Ok(handle) => handle,
                // Another member opened the table first
                Err(GameError::ActiveSessionExists) => self
                    .table(ctx.guild_id)
                    .await
                    .ok_or(GameError::SessionExpired)?,
                Err(err) => return Err(err.into()),
            },
        };

        let mut session = handle.lock().await;
        session.ensure_active()?;
        session.game.round.check_join(ctx.user_id)?;

        EconomyService::new(&self.db)
            .debit(ctx.wallet(), bet)
            .await?;
        session.game.round.join(ctx.user_id, bet)?;
        self.tables.touch(&session.id).await;

        tracing::debug!(
            "User {} joined crash in guild {} for {}",
            ctx.user_id,
            ctx.guild_id,
            bet
        );

        Ok(CrashSnapshot::of(&session.game.round))
    }

    /// Leaves a waiting round with a full refund.
    ///
    /// The table closes when the last player leaves.
    pub async fn leave(&self, ctx: PlayContext) -> Result<i64, AppError> {
        let mut session = self.locked_table(ctx.guild_id).await?;
        let refund = session.game.round.check_leave(ctx.user_id)?;

        EconomyService::new(&self.db)
            .refund(ctx.wallet(), refund)
            .await?;
        session.game.round.leave(ctx.user_id)?;

        if session.game.round.players().is_empty() {
            self.close_table(&mut session).await;
        }

        Ok(refund)
    }

    /// Starts the waiting round now instead of waiting for the timer.
    pub async fn start(&self, ctx: PlayContext) -> Result<CrashSnapshot, AppError> {
        let handle = self
            .table(ctx.guild_id)
            .await
            .ok_or_else(|| GameError::invalid("There is no crash round in this server."))?;
        let mut session = handle.lock().await;
        session.ensure_active()?;

        if session.game.round.player(ctx.user_id).is_none() {
            return Err(GameError::invalid("Join the round before starting it.").into());
        }

        self.begin_round(&mut session, &handle).await?;

        Ok(CrashSnapshot::of(&session.game.round))
    }

    /// Cashes out at the current multiplier and credits the payout immediately.
    ///
    /// The table stays locked from quote to commit. A failed credit leaves the player in
    /// the round.
    pub async fn cash_out(&self, ctx: PlayContext) -> Result<CashOut, AppError> {
        let mut session = self.locked_table(ctx.guild_id).await?;
        let quote = session.game.round.check_cash_out(ctx.user_id)?;

        EconomyService::new(&self.db)
            .credit(ctx.wallet(), quote.payout)
            .await?;
        let cash_out = session.game.round.cash_out(ctx.user_id)?;

        tracing::debug!(
            "User {} cashed out of crash at {:.2}x for {}",
            ctx.user_id,
            cash_out.multiplier,
            cash_out.payout
        );

        if session.game.round.phase() == CrashPhase::Crashed {
            self.finish_round(&mut session).await;
        } else {
            self.tables.touch(&session.id).await;
        }

        Ok(cash_out)
    }

    pub async fn status(&self, guild_id: u64) -> Option<CrashSnapshot> {
        let handle = self.table(guild_id).await?;
        let session = handle.lock().await;
        Some(CrashSnapshot::of(&session.game.round))
    }

    fn spawn_auto_start(&self, handle: SessionHandle<CrashTable>) -> AbortHandle {
        let service = self.clone();
        let delay = self.timing.auto_start_after;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let mut session = handle.lock().await;
            if session.state() != SessionState::Active {
                return;
            }
            // This task is finishing on its own; it must not abort itself mid-await
            session.game.auto_start = None;

            if session.game.round.players().is_empty() {
                service.close_table(&mut session).await;
                return;
            }
            if let Err(err) = service.begin_round(&mut session, &handle).await {
                tracing::error!("Failed to auto-start crash round: {}", err);
            }
        })
        .abort_handle()
    }

    fn spawn_ticker(&self, handle: SessionHandle<CrashTable>) -> AbortHandle {
        let service = self.clone();
        let every = self.timing.tick_every;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.tick().await;

            loop {
                interval.tick().await;

                let mut session = handle.lock().await;
                if service.step(&mut session).await {
                    break;
                }
            }
        })
        .abort_handle()
    }

    /// Advances the round one tick. Returns `true` once the round is over.
    async fn step(&self, session: &mut Session<CrashTable>) -> bool {
        if session.state() != SessionState::Active {
            return true;
        }
        if session.game.round.tick() != CrashPhase::Crashed {
            return false;
        }

        // Called from the ticker itself, which must not abort its own task
        session.game.ticker = None;
        self.finish_round(session).await;
        true
    }

    async fn begin_round(
        &self,
        session: &mut Session<CrashTable>,
        handle: &SessionHandle<CrashTable>,
    ) -> Result<(), GameError> {
        let phase = session.game.round.begin()?;
        if let Some(timer) = session.game.auto_start.take() {
            timer.abort();
        }

        let guild_id = session.owner_id;
        tracing::info!("Crash round started in guild {}", guild_id);
        self.emit(CrashEvent::Started {
            guild_id,
            channel_id: session.game.channel_id,
            players: session.game.round.players().len(),
        });

        if phase == CrashPhase::Crashed {
            self.finish_round(session).await;
        } else {
            session.game.ticker = Some(self.spawn_ticker(handle.clone()));
            self.tables.touch(&session.id).await;
        }

        Ok(())
    }

    /// Settles and removes the table without an announcement.
    async fn close_table(&self, session: &mut Session<CrashTable>) -> bool {
        session.game.abort_tasks();
        if !session.settle() {
            return false;
        }
        self.tables.remove(&session.id).await;
        true
    }

    /// Ends a crashed round. Bets of players who never cashed out were taken on join,
    /// so losing needs no ledger write.
    async fn finish_round(&self, session: &mut Session<CrashTable>) {
        if !self.close_table(session).await {
            return;
        }

        let round = &session.game.round;
        let crash_point = round.revealed_crash_point().unwrap_or(round.multiplier());
        let cashed_out = round
            .players()
            .iter()
            .filter_map(|(&user_id, player)| {
                player.cashed_out_at.map(|multiplier| {
                    (user_id, multiplier, scale_float(player.bet, multiplier))
                })
            })
            .collect();

        tracing::info!(
            "Crash round in guild {} ended at {:.2}x",
            session.owner_id,
            crash_point
        );

        self.emit(CrashEvent::Crashed {
            guild_id: session.owner_id,
            channel_id: session.game.channel_id,
            crash_point,
            cashed_out,
            losers: round.losers(),
        });
    }

    fn emit(&self, event: CrashEvent) {
        if let Some(events) = &self.events {
            // The receiver only goes away during shutdown
            let _ = events.send(event);
        }
    }

    /// Closes tables past their TTL, aborting their tasks.
    ///
    /// With `refund` set, players still holding a stake in an unfinished round get it
    /// back.
    pub async fn expire_stale(&self, now: Instant, refund: bool) -> Result<usize, AppError> {
        let expired = self.tables.expire_due(now).await;
        let count = expired.len();

        let mut failed = 0;
        for table in expired {
            let mut session = table.handle.lock().await;
            tracing::info!("Crash table in guild {} expired", table.guild_id);
            failed += self.settle_abandoned(&mut session, refund).await;
        }

        if failed > 0 {
            return Err(InternalError::RefundsFailed(failed).into());
        }
        Ok(count)
    }

    /// Aborts every round and refunds stakes still in play.
    ///
    /// Every table is closed even when some refunds fail; the failures are logged and
    /// reported together.
    pub async fn shutdown(&self) -> Result<(), AppError> {
        let mut failed = 0;
        for handle in self.tables.drain().await {
            let mut session = handle.lock().await;
            failed += self.settle_abandoned(&mut session, true).await;
        }

        if failed > 0 {
            return Err(InternalError::RefundsFailed(failed).into());
        }
        Ok(())
    }

    /// Closes an abandoned table, returning how many refunds could not be written.
    async fn settle_abandoned(&self, session: &mut Session<CrashTable>, refund: bool) -> usize {
        session.game.abort_tasks();
        if !session.settle() || !refund {
            return 0;
        }
        if session.game.round.phase() == CrashPhase::Crashed {
            return 0;
        }

        let economy = EconomyService::new(&self.db);
        let mut failed = 0;
        for (user_id, bet) in session.game.round.losers() {
            if let Err(e) = economy
                .refund(Wallet::new(user_id, session.guild_id), bet)
                .await
            {
                tracing::error!(
                    "Failed to refund {} to user {} in guild {}: {}",
                    bet,
                    user_id,
                    session.guild_id,
                    e
                );
                failed += 1;
            }
        }
        failed
    }

    #[cfg(test)]
    pub(crate) async fn seed_round(
        &self,
        ctx: PlayContext,
        round: CrashRound,
    ) -> Result<(), GameError> {
        self.open_table(ctx, round).await.map(|_| ())
    }

    #[cfg(test)]
    pub(crate) async fn force_multiplier(&self, guild_id: u64, multiplier: f64) {
        if let Ok(mut session) = self.locked_table(guild_id).await {
            session.game.round.force_multiplier(multiplier);
        }
    }

    /// Runs one ticker step synchronously.
    #[cfg(test)]
    pub(crate) async fn tick_now(&self, guild_id: u64) -> bool {
        match self.locked_table(guild_id).await {
            Ok(mut session) => self.step(&mut session).await,
            Err(_) => true,
        }
    }
}
