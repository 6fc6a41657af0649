//! Game and ledger services.
//!
//! Every multi-step game action follows the same order: restriction gate, session lookup,
//! engine validation, ledger debit, engine transition, and finally a single settlement
//! credit with the session removed, or a TTL refresh when the game goes on. The helpers
//! here implement the session half of that sequence for all game families.

pub mod blackjack;
pub mod casino;
pub mod crash;
pub mod economy;
pub mod hilo;
pub mod minesweeper;
pub mod restriction;
pub mod rps;

#[cfg(test)]
mod test;

use sea_orm::DatabaseConnection;
use tokio::sync::OwnedMutexGuard;

use crate::{
    error::{game::GameError, AppError},
    model::{balance::Wallet, game::PlayContext},
    service::economy::EconomyService,
    session::{Session, SessionHandle, SessionState, SessionStore},
};

/// Refuses to start a game while the caller still has one running.
///
/// A finished game still holding an unpaid payout does not count: it is paid out here
/// and the new game may start. Checked before the stake is taken so a rejected start
/// moves no coins.
pub(crate) async fn ensure_no_session<G>(
    db: &DatabaseConnection,
    store: &SessionStore<G>,
    ctx: PlayContext,
) -> Result<(), AppError> {
    let Some(handle) = store.find_by_owner(ctx.user_id, ctx.guild_id).await else {
        return Ok(());
    };

    let mut session = handle.lock().await;
    if session.state() != SessionState::Active {
        return Ok(());
    }
    match session.unpaid() {
        Some(payout) => conclude(db, store, &mut *session, Some(payout)).await,
        None => Err(GameError::ActiveSessionExists.into()),
    }
}

/// Stores a freshly started game whose stake has already been debited.
///
/// If a concurrent start won the owner slot in the meantime the stake is refunded.
pub(crate) async fn open_session<G>(
    db: &DatabaseConnection,
    store: &SessionStore<G>,
    ctx: PlayContext,
    stake: i64,
    game: G,
) -> Result<SessionHandle<G>, AppError> {
    match store.create(ctx.user_id, ctx.guild_id, game).await {
        Ok(handle) => Ok(handle),
        Err(err) => {
            EconomyService::new(db).refund(ctx.wallet(), stake).await?;
            Err(err.into())
        }
    }
}

/// Finds the caller's live session and locks it for the duration of one action.
///
/// A finished game whose payout could not be credited earlier is paid out instead, and
/// the action is refused with `PayoutCollected`.
///
/// # Returns
/// - `Ok(OwnedMutexGuard)` - Exclusive access to an active session owned by the caller
/// - `Err(GameError::SessionExpired)` - No live session, or it settled while we waited
/// - `Err(GameError::SessionNotOwned)` - Session belongs to someone else
/// - `Err(GameError::PayoutCollected)` - The game was already over and is now paid
pub(crate) async fn lock_session<G>(
    db: &DatabaseConnection,
    store: &SessionStore<G>,
    ctx: PlayContext,
) -> Result<OwnedMutexGuard<Session<G>>, AppError> {
    let handle = store
        .find_by_owner(ctx.user_id, ctx.guild_id)
        .await
        .ok_or(GameError::SessionExpired)?;

    let mut session = handle.lock_owned().await;
    session.ensure_active()?;
    session.ensure_owner(ctx.user_id)?;

    if let Some(payout) = session.unpaid() {
        conclude(db, store, &mut *session, Some(payout)).await?;
        return Err(GameError::PayoutCollected { payout }.into());
    }

    Ok(session)
}

/// Completes an action on a locked session.
///
/// With `Some(payout)` the game is over: the payout is credited to the owner, then the
/// session is settled and removed. If the credit fails the session stays in the store
/// holding the payout, so the owner's next action or the expiry sweep can pay it. With
/// `None` the game continues and its expiry is pushed back.
pub(crate) async fn conclude<G>(
    db: &DatabaseConnection,
    store: &SessionStore<G>,
    session: &mut Session<G>,
    payout: Option<i64>,
) -> Result<(), AppError> {
    let Some(payout) = payout else {
        store.touch(&session.id).await;
        return Ok(());
    };

    if session.state() != SessionState::Active {
        return Ok(());
    }
    session.hold_payout(payout);

    let wallet = Wallet::new(session.owner_id, session.guild_id);
    if let Err(err) = EconomyService::new(db).credit(wallet, payout).await {
        store.touch(&session.id).await;
        return Err(err);
    }

    session.settle();
    store.remove(&session.id).await;
    tracing::debug!(
        "Settled {} for user {} with payout {}",
        session.id,
        session.owner_id,
        payout
    );

    Ok(())
}
