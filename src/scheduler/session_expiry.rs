use std::time::Instant;

use sea_orm::DatabaseConnection;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::{
    engine::Wager,
    error::AppError,
    model::balance::Wallet,
    service::economy::EconomyService,
    session::{ExpiredSession, SessionState, SessionStore},
    state::AppState,
};

/// Starts the session expiry scheduler
///
/// Runs every 10 seconds and discards every game session whose inactivity window has
/// passed. When `REFUND_EXPIRED_BETS` is enabled the stake still at risk in each expired
/// session is returned to its owner; otherwise it is forfeited.
///
/// # Arguments
/// - `state`: Application state holding the session stores
pub async fn start_scheduler(state: AppState) -> Result<JobScheduler, AppError> {
    let scheduler = JobScheduler::new().await?;

    let job = Job::new_async("*/10 * * * * *", move |_uuid, _lock| {
        let state = state.clone();

        Box::pin(async move {
            if let Err(e) = sweep_expired_sessions(&state, Instant::now()).await {
                tracing::error!("Error sweeping expired sessions: {}", e);
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    tracing::info!("Session expiry scheduler started");

    Ok(scheduler)
}

/// Expires sessions in every store, returning how many were discarded.
pub async fn sweep_expired_sessions(state: &AppState, now: Instant) -> Result<usize, AppError> {
    let refund = state.refund_expired_bets;
    let db = &state.db;

    let expired = sweep_store(db, &state.blackjack, now, refund).await?
        + sweep_store(db, &state.minesweeper, now, refund).await?
        + sweep_store(db, &state.hilo, now, refund).await?
        + sweep_store(db, &state.rps_solo, now, refund).await?
        + sweep_store(db, &state.rps_challenges, now, refund).await?
        + state.crash.expire_stale(now, refund).await?;

    if expired > 0 {
        tracing::info!("Expired {} idle game sessions", expired);
    }

    Ok(expired)
}

async fn sweep_store<G: Wager>(
    db: &DatabaseConnection,
    store: &SessionStore<G>,
    now: Instant,
    refund: bool,
) -> Result<usize, AppError> {
    let expired = store.expire_due(now).await;
    let count = expired.len();

    for session in expired {
        let id = session.id.clone();
        match settle_expired(db, session, refund).await {
            Ok(0) => tracing::debug!("{} session {} expired", store.family(), id),
            Ok(returned) => tracing::info!(
                "{} session {} expired, returned {} to its owner",
                store.family(),
                id,
                returned
            ),
            Err(e) => tracing::error!(
                "Failed to settle expired {} session {}: {}",
                store.family(),
                id,
                e
            ),
        }
    }

    Ok(count)
}

/// Settles an expired session, refunding its stake at risk when `refund` is set.
///
/// Waits for any action still holding the session. If that action settled the game
/// first, nothing is refunded. A finished game whose payout never went through is paid
/// that payout regardless of `refund`.
///
/// # Returns
/// - `Ok(i64)` - Coins returned to the owner, 0 when refunds are off or nothing was owed
/// - `Err(AppError::DbErr)` - Refund or payout could not be written
pub async fn settle_expired<G: Wager>(
    db: &DatabaseConnection,
    expired: ExpiredSession<G>,
    refund: bool,
) -> Result<i64, AppError> {
    let mut session = expired.handle.lock().await;
    let wallet = Wallet::new(expired.owner_id, expired.guild_id);

    if let Some(payout) = session.unpaid() {
        if session.state() != SessionState::Active {
            return Ok(0);
        }
        EconomyService::new(db).credit(wallet, payout).await?;
        session.settle();
        return Ok(payout);
    }

    if !session.settle() {
        return Ok(0);
    }

    let stake = session.game.stake_at_risk();
    if !refund || stake <= 0 {
        return Ok(0);
    }

    EconomyService::new(db)
        .refund(wallet, stake)
        .await?;

    Ok(stake)
}
