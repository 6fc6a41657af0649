use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashMap},
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};

use crate::error::game::GameError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Settled,
}

/// One in-progress game owned by a member within a guild.
#[derive(Debug)]
pub struct Session<G> {
    pub id: String,
    pub owner_id: u64,
    pub guild_id: u64,
    pub game: G,
    state: SessionState,
    /// Payout owed for a finished game whose credit has not gone through yet.
    unpaid: Option<i64>,
}

impl<G> Session<G> {
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Fails once the session has been settled or expired, even if a caller still holds
    /// its handle.
    pub fn ensure_active(&self) -> Result<(), GameError> {
        match self.state {
            SessionState::Active => Ok(()),
            SessionState::Settled => Err(GameError::SessionExpired),
        }
    }

    pub fn ensure_owner(&self, user_id: u64) -> Result<(), GameError> {
        if self.owner_id == user_id {
            Ok(())
        } else {
            Err(GameError::SessionNotOwned)
        }
    }

    pub fn unpaid(&self) -> Option<i64> {
        self.unpaid
    }

    /// Records the payout of a finished game ahead of crediting it.
    ///
    /// The session stays active until the credit succeeds, so a failed write can be
    /// retried by the next action or by expiry.
    pub fn hold_payout(&mut self, payout: i64) {
        self.unpaid = Some(payout);
    }

    /// Marks the session settled.
    ///
    /// # Returns
    /// - `true` - The session was active and is now settled; the caller owns settlement
    /// - `false` - Someone already settled it; the caller must not pay out
    pub fn settle(&mut self) -> bool {
        let was_active = self.state == SessionState::Active;
        self.state = SessionState::Settled;
        was_active
    }
}

pub type SessionHandle<G> = Arc<Mutex<Session<G>>>;

/// A session removed from the store because its deadline passed.
pub struct ExpiredSession<G> {
    pub id: String,
    pub owner_id: u64,
    pub guild_id: u64,
    pub handle: SessionHandle<G>,
}

struct Slot<G> {
    handle: SessionHandle<G>,
    owner_id: u64,
    guild_id: u64,
    generation: u64,
}

/// Heap entry. Entries whose generation no longer matches the slot are stale and skipped.
#[derive(PartialEq, Eq, PartialOrd, Ord)]
struct Deadline {
    at: Instant,
    generation: u64,
    id: String,
}

struct Inner<G> {
    sessions: HashMap<String, Slot<G>>,
    owners: HashMap<(u64, u64), String>,
    deadlines: BinaryHeap<Reverse<Deadline>>,
    next_seq: u64,
    next_generation: u64,
}

impl<G> Inner<G> {
    fn schedule(&mut self, id: &str, at: Instant) -> u64 {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.deadlines.push(Reverse(Deadline {
            at,
            generation,
            id: id.to_string(),
        }));
        generation
    }

    fn unlink(&mut self, id: &str) -> Option<Slot<G>> {
        let slot = self.sessions.remove(id)?;
        self.owners.remove(&(slot.owner_id, slot.guild_id));
        Some(slot)
    }
}

/// Session table for one game family.
///
/// At most one live session per owner per guild. Every session expires `ttl` after its
/// last [`touch`](Self::touch); expiry is driven externally by calling
/// [`expire_due`](Self::expire_due).
pub struct SessionStore<G> {
    family: &'static str,
    ttl: Duration,
    inner: Arc<RwLock<Inner<G>>>,
}

impl<G> Clone for SessionStore<G> {
    fn clone(&self) -> Self {
        Self {
            family: self.family,
            ttl: self.ttl,
            inner: self.inner.clone(),
        }
    }
}

impl<G> SessionStore<G> {
    pub fn new(family: &'static str, ttl: Duration) -> Self {
        Self {
            family,
            ttl,
            inner: Arc::new(RwLock::new(Inner {
                sessions: HashMap::new(),
                owners: HashMap::new(),
                deadlines: BinaryHeap::new(),
                next_seq: 0,
                next_generation: 0,
            })),
        }
    }

    pub fn family(&self) -> &'static str {
        self.family
    }

    /// Stores a new session for `owner_id`.
    ///
    /// # Returns
    /// - `Ok(SessionHandle)` - Handle to the new session
    /// - `Err(GameError::ActiveSessionExists)` - The owner already has a live session in
    ///   this guild; the game is dropped
    pub async fn create(
        &self,
        owner_id: u64,
        guild_id: u64,
        game: G,
    ) -> Result<SessionHandle<G>, GameError> {
        self.create_at(owner_id, guild_id, game, Instant::now()).await
    }

    async fn create_at(
        &self,
        owner_id: u64,
        guild_id: u64,
        game: G,
        now: Instant,
    ) -> Result<SessionHandle<G>, GameError> {
        let mut inner = self.inner.write().await;

        if inner.owners.contains_key(&(owner_id, guild_id)) {
            return Err(GameError::ActiveSessionExists);
        }

        inner.next_seq += 1;
        let id = format!(
            "{}-{}-{}-{}",
            self.family,
            owner_id,
            Utc::now().timestamp_millis(),
            inner.next_seq
        );

        let handle = Arc::new(Mutex::new(Session {
            id: id.clone(),
            owner_id,
            guild_id,
            game,
            state: SessionState::Active,
            unpaid: None,
        }));

        let generation = inner.schedule(&id, now + self.ttl);
        inner.owners.insert((owner_id, guild_id), id.clone());
        inner.sessions.insert(
            id,
            Slot {
                handle: handle.clone(),
                owner_id,
                guild_id,
                generation,
            },
        );

        Ok(handle)
    }

    pub async fn get(&self, id: &str) -> Option<SessionHandle<G>> {
        let inner = self.inner.read().await;
        inner.sessions.get(id).map(|slot| slot.handle.clone())
    }

    /// The owner's live session in `guild_id`, if any.
    pub async fn find_by_owner(&self, owner_id: u64, guild_id: u64) -> Option<SessionHandle<G>> {
        let inner = self.inner.read().await;
        let id = inner.owners.get(&(owner_id, guild_id))?;
        inner.sessions.get(id).map(|slot| slot.handle.clone())
    }

    /// Pushes the session's deadline back to a full TTL from now.
    ///
    /// Returns `false` if the session is no longer stored.
    pub async fn touch(&self, id: &str) -> bool {
        self.touch_at(id, Instant::now()).await
    }

    async fn touch_at(&self, id: &str, now: Instant) -> bool {
        let mut inner = self.inner.write().await;
        if !inner.sessions.contains_key(id) {
            return false;
        }

        let generation = inner.schedule(id, now + self.ttl);
        if let Some(slot) = inner.sessions.get_mut(id) {
            slot.generation = generation;
        }
        true
    }

    /// Drops the session. Its heap entry goes stale and is skipped on the next sweep.
    pub async fn remove(&self, id: &str) -> Option<SessionHandle<G>> {
        let mut inner = self.inner.write().await;
        inner.unlink(id).map(|slot| slot.handle)
    }

    /// Removes and returns every session whose deadline is at or before `now`.
    pub async fn expire_due(&self, now: Instant) -> Vec<ExpiredSession<G>> {
        let mut inner = self.inner.write().await;
        let mut expired = Vec::new();

        while let Some(Reverse(deadline)) = inner.deadlines.peek() {
            if deadline.at > now {
                break;
            }

            let Some(Reverse(deadline)) = inner.deadlines.pop() else {
                break;
            };

            let current = inner
                .sessions
                .get(&deadline.id)
                .is_some_and(|slot| slot.generation == deadline.generation);
            if !current {
                continue;
            }

            if let Some(slot) = inner.unlink(&deadline.id) {
                expired.push(ExpiredSession {
                    id: deadline.id,
                    owner_id: slot.owner_id,
                    guild_id: slot.guild_id,
                    handle: slot.handle,
                });
            }
        }

        expired
    }

    /// Removes every session, live or not, for shutdown.
    pub async fn drain(&self) -> Vec<SessionHandle<G>> {
        let mut inner = self.inner.write().await;
        inner.owners.clear();
        inner.deadlines.clear();
        inner.sessions.drain().map(|(_, slot)| slot.handle).collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.sessions.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    fn store() -> SessionStore<u32> {
        SessionStore::new("test", TTL)
    }

    #[tokio::test]
    async fn create_and_lookup() {
        let store = store();
        let handle = store.create(1, 10, 7).await.unwrap();
        let id = handle.lock().await.id.clone();

        assert!(id.starts_with("test-1-"));
        assert!(store.get(&id).await.is_some());
        assert!(store.find_by_owner(1, 10).await.is_some());
        assert!(store.find_by_owner(1, 11).await.is_none());
        assert!(store.find_by_owner(2, 10).await.is_none());
    }

    /// A second session for the same owner and guild is refused.
    #[tokio::test]
    async fn one_live_session_per_owner() {
        let store = store();
        store.create(1, 10, 7).await.unwrap();

        assert!(matches!(
            store.create(1, 10, 8).await,
            Err(GameError::ActiveSessionExists)
        ));
        assert!(store.create(1, 11, 8).await.is_ok());
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn ids_are_unique() {
        let store = store();
        let a = store.create(1, 10, 0).await.unwrap();
        let b = store.create(2, 10, 0).await.unwrap();

        assert_ne!(a.lock().await.id, b.lock().await.id);
    }

    #[tokio::test]
    async fn remove_frees_the_owner_slot() {
        let store = store();
        let handle = store.create(1, 10, 7).await.unwrap();
        let id = handle.lock().await.id.clone();

        assert!(store.remove(&id).await.is_some());
        assert!(store.remove(&id).await.is_none());
        assert!(store.find_by_owner(1, 10).await.is_none());
        assert!(store.create(1, 10, 8).await.is_ok());
    }

    #[tokio::test]
    async fn expires_after_ttl() {
        let store = store();
        let start = Instant::now();
        store.create_at(1, 10, 7, start).await.unwrap();

        assert!(store.expire_due(start + TTL / 2).await.is_empty());

        let expired = store.expire_due(start + TTL).await;
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].owner_id, 1);
        assert_eq!(expired[0].handle.lock().await.game, 7);
        assert!(store.is_empty().await);
    }

    /// Touching resets the deadline; the stale heap entry is ignored.
    #[tokio::test]
    async fn touch_extends_deadline() {
        let store = store();
        let start = Instant::now();
        let handle = store.create_at(1, 10, 7, start).await.unwrap();
        let id = handle.lock().await.id.clone();

        assert!(store.touch_at(&id, start + TTL / 2).await);

        assert!(store.expire_due(start + TTL).await.is_empty());
        assert_eq!(store.len().await, 1);

        let expired = store.expire_due(start + TTL + TTL / 2).await;
        assert_eq!(expired.len(), 1);
    }

    #[tokio::test]
    async fn removed_sessions_never_expire() {
        let store = store();
        let start = Instant::now();
        let handle = store.create_at(1, 10, 7, start).await.unwrap();
        let id = handle.lock().await.id.clone();
        store.remove(&id).await;

        assert!(store.expire_due(start + TTL * 2).await.is_empty());
        assert!(!store.touch(&id).await);
    }

    #[tokio::test]
    async fn expire_due_returns_sessions_in_deadline_order() {
        let store = store();
        let start = Instant::now();
        store.create_at(2, 10, 2, start + TTL / 4).await.unwrap();
        store.create_at(1, 10, 1, start).await.unwrap();

        let expired = store.expire_due(start + TTL * 2).await;
        let owners: Vec<u64> = expired.iter().map(|e| e.owner_id).collect();
        assert_eq!(owners, vec![1, 2]);
    }

    #[tokio::test]
    async fn drain_empties_the_store() {
        let store = store();
        store.create(1, 10, 1).await.unwrap();
        store.create(2, 10, 2).await.unwrap();

        assert_eq!(store.drain().await.len(), 2);
        assert!(store.is_empty().await);
        assert!(store.find_by_owner(1, 10).await.is_none());
        assert!(store.expire_due(Instant::now() + TTL * 2).await.is_empty());
    }

    #[tokio::test]
    async fn settle_happens_once() {
        let store = store();
        let handle = store.create(1, 10, 7).await.unwrap();
        let mut session = handle.lock().await;

        assert!(session.ensure_active().is_ok());
        assert!(session.ensure_owner(2).is_err());
        assert!(session.settle());
        assert!(!session.settle());
        assert_eq!(session.ensure_active(), Err(GameError::SessionExpired));
    }
}
