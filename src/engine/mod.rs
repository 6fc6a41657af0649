//! Game engines.
//!
//! Each engine is a synchronous finite-state simulation with no knowledge of the ledger,
//! the session store or Discord. Services drive them: they validate an action against the
//! engine, move coins, apply the transition and settle exactly once when the engine
//! reaches a terminal phase. Busts, crashes and mine hits are terminal phases, not errors.

pub mod blackjack;
pub mod cards;
pub mod casino;
pub mod crash;
pub mod hilo;
pub mod minesweeper;
pub mod random;
pub mod rps;

/// Coins still at risk in a live session.
///
/// Used when an abandoned session expires to decide what could be refunded.
pub trait Wager {
    fn stake_at_risk(&self) -> i64;
}

/// `floor(amount × tenths / 10)` for non-negative amounts, avoiding float rounding on
/// fractional multipliers such as 1.5×.
pub(crate) fn scale_tenths(amount: i64, tenths: i64) -> i64 {
    amount * tenths / 10
}

/// `floor(amount × multiplier)` for a floating multiplier curve value.
pub(crate) fn scale_float(amount: i64, multiplier: f64) -> i64 {
    (amount as f64 * multiplier).floor() as i64
}
