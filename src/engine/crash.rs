//! Crash: a shared multiplayer round whose multiplier climbs until a hidden crash point.
//!
//! `Waiting` accepts joins and leaves, `Running` accepts cash-outs while the ticker raises
//! the multiplier, and `Crashed` is terminal. Timing (auto-start, tick cadence) belongs to
//! the service; the round only knows how to advance one tick at a time.

use std::collections::BTreeMap;

use crate::{
    engine::{random::RandomSource, scale_float, Wager},
    error::game::GameError,
};

/// Lowest multiplier at which a player may cash out.
pub const CASHOUT_FLOOR: f64 = 1.20;

/// Multiplier every round starts from.
pub const STARTING_MULTIPLIER: f64 = 1.0;

fn floor_hundredths(value: f64) -> f64 {
    (value * 100.0).floor() / 100.0
}

/// Draws a crash point from the house distribution, floored to two decimals.
///
/// Half of all rounds end below 2.00×: within that half 10% crash instantly at 1.00×, 20%
/// land in [1.00, 1.25), 30% in [1.25, 1.60) and 40% in [1.60, 2.00). The other half is
/// spread over [2, 5) 50%, [5, 10) 30%, [10, 25) 14% and [25, 100) 6%.
pub fn generate_crash_point(rng: &mut impl RandomSource) -> f64 {
    let low_half = rng.uniform() < 0.5;
    let band = rng.uniform();

    let (low, high) = if low_half {
        if band < 0.1 {
            return 1.0;
        } else if band < 0.3 {
            (1.0, 1.25)
        } else if band < 0.6 {
            (1.25, 1.6)
        } else {
            (1.6, 2.0)
        }
    } else if band < 0.5 {
        (2.0, 5.0)
    } else if band < 0.8 {
        (5.0, 10.0)
    } else if band < 0.94 {
        (10.0, 25.0)
    } else {
        (25.0, 100.0)
    };

    floor_hundredths(low + rng.uniform() * (high - low))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CrashPhase {
    Waiting,
    Running,
    Crashed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrashPlayer {
    pub bet: i64,
    /// Multiplier locked in on cash-out.
    pub cashed_out_at: Option<f64>,
}

/// A cash-out that has been locked in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CashOut {
    pub multiplier: f64,
    pub payout: i64,
}

#[derive(Debug, Clone)]
pub struct CrashRound {
    crash_point: f64,
    multiplier: f64,
    phase: CrashPhase,
    players: BTreeMap<u64, CrashPlayer>,
}

impl CrashRound {
    pub fn new(crash_point: f64) -> Self {
        Self {
            crash_point,
            multiplier: STARTING_MULTIPLIER,
            phase: CrashPhase::Waiting,
            players: BTreeMap::new(),
        }
    }

    pub fn generate(rng: &mut impl RandomSource) -> Self {
        Self::new(generate_crash_point(rng))
    }

    pub fn phase(&self) -> CrashPhase {
        self.phase
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// The crash point, hidden until the round has crashed.
    pub fn revealed_crash_point(&self) -> Option<f64> {
        match self.phase {
            CrashPhase::Crashed => Some(self.crash_point),
            _ => None,
        }
    }

    pub fn players(&self) -> &BTreeMap<u64, CrashPlayer> {
        &self.players
    }

    pub fn player(&self, user_id: u64) -> Option<&CrashPlayer> {
        self.players.get(&user_id)
    }

    pub fn check_join(&self, user_id: u64) -> Result<(), GameError> {
        if self.phase != CrashPhase::Waiting {
            return Err(GameError::invalid(
                "This round has already started. Wait for the next one.",
            ));
        }
        if self.players.contains_key(&user_id) {
            return Err(GameError::invalid("You're already in this round."));
        }
        Ok(())
    }

    /// Adds a player. The bet must already have been taken from their balance.
    pub fn join(&mut self, user_id: u64, bet: i64) -> Result<(), GameError> {
        self.check_join(user_id)?;
        self.players.insert(
            user_id,
            CrashPlayer {
                bet,
                cashed_out_at: None,
            },
        );
        Ok(())
    }

    /// The bet `user_id` would get back by leaving now.
    pub fn check_leave(&self, user_id: u64) -> Result<i64, GameError> {
        if self.phase != CrashPhase::Waiting {
            return Err(GameError::invalid("You can't leave a round that has started."));
        }
        self.players
            .get(&user_id)
            .map(|player| player.bet)
            .ok_or_else(|| GameError::invalid("You aren't in this round."))
    }

    /// Removes a waiting player, returning the bet to refund in full.
    pub fn leave(&mut self, user_id: u64) -> Result<i64, GameError> {
        let bet = self.check_leave(user_id)?;
        self.players.remove(&user_id);
        Ok(bet)
    }

    /// Starts the round. A crash point at or below 1.00× crashes on the spot.
    pub fn begin(&mut self) -> Result<CrashPhase, GameError> {
        if self.phase != CrashPhase::Waiting {
            return Err(GameError::invalid("This round has already started."));
        }
        if self.players.is_empty() {
            return Err(GameError::invalid("Nobody has joined this round yet."));
        }

        if self.crash_point <= STARTING_MULTIPLIER {
            self.multiplier = self.crash_point;
            self.phase = CrashPhase::Crashed;
        } else {
            self.phase = CrashPhase::Running;
        }

        Ok(self.phase)
    }

    /// Advances one tick: `m += 0.01 + m / 100`, clamped to the crash point.
    ///
    /// No-op outside `Running`.
    pub fn tick(&mut self) -> CrashPhase {
        if self.phase != CrashPhase::Running {
            return self.phase;
        }

        self.multiplier += 0.01 + self.multiplier / 100.0;
        if self.multiplier >= self.crash_point {
            self.multiplier = self.crash_point;
            self.phase = CrashPhase::Crashed;
        }

        self.phase
    }

    /// The cash-out `user_id` would lock in right now, without locking it in.
    pub fn check_cash_out(&self, user_id: u64) -> Result<CashOut, GameError> {
        if self.phase != CrashPhase::Running {
            return Err(GameError::invalid("The round isn't running."));
        }
        if self.multiplier < CASHOUT_FLOOR {
            return Err(GameError::invalid(format!(
                "You can cash out from {CASHOUT_FLOOR:.2}x. Current multiplier is {:.2}x.",
                self.multiplier
            )));
        }

        let player = self
            .players
            .get(&user_id)
            .ok_or_else(|| GameError::invalid("You aren't in this round."))?;
        if player.cashed_out_at.is_some() {
            return Err(GameError::invalid("You already cashed out."));
        }

        Ok(CashOut {
            multiplier: self.multiplier,
            payout: scale_float(player.bet, self.multiplier),
        })
    }

    /// Locks in the current multiplier for `user_id` and returns the payout.
    ///
    /// Once every player has cashed out the round ends early.
    pub fn cash_out(&mut self, user_id: u64) -> Result<CashOut, GameError> {
        let cash_out = self.check_cash_out(user_id)?;
        if let Some(player) = self.players.get_mut(&user_id) {
            player.cashed_out_at = Some(cash_out.multiplier);
        }

        if self.players.values().all(|p| p.cashed_out_at.is_some()) {
            self.phase = CrashPhase::Crashed;
        }

        Ok(cash_out)
    }

    /// Players who never cashed out, with the bet each forfeits.
    pub fn losers(&self) -> Vec<(u64, i64)> {
        self.players
            .iter()
            .filter(|(_, player)| player.cashed_out_at.is_none())
            .map(|(&user_id, player)| (user_id, player.bet))
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn force_multiplier(&mut self, multiplier: f64) {
        self.multiplier = multiplier;
    }
}

impl Wager for CrashRound {
    fn stake_at_risk(&self) -> i64 {
        match self.phase {
            CrashPhase::Crashed => 0,
            _ => self.losers().iter().map(|(_, bet)| bet).sum(),
        }
    }
}
