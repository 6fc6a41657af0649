//! Live game sessions.
//!
//! Every multi-step game keeps its in-progress state in a [`SessionStore`]: an in-process
//! table keyed by opaque session id with a per-owner index and a min-heap of expiry
//! deadlines. Services lock a session's mutex for the whole of an action, including the
//! awaited ledger writes, so a game is never mutated by two actions at once.

pub mod store;

pub use store::{ExpiredSession, Session, SessionHandle, SessionState, SessionStore};
