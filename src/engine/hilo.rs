//! Hi-Lo: guess whether the next card is higher, lower or equal. All or nothing.
//!
//! Cards come from an infinite deck, Ace low. Each correct guess adds 20% of the bet to
//! the amount shown as winnings; one wrong guess ends the round with nothing.

use std::{fmt, str::FromStr};

use crate::{
    engine::{cards::Card, random::RandomSource, Wager},
    error::game::GameError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guess {
    Higher,
    Lower,
    Equal,
}

impl Guess {
    fn matches(&self, current: &Card, next: &Card) -> bool {
        let (current, next) = (current.hilo_value(), next.hilo_value());
        match self {
            Guess::Higher => next > current,
            Guess::Lower => next < current,
            Guess::Equal => next == current,
        }
    }
}

impl fmt::Display for Guess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Guess::Higher => "higher",
            Guess::Lower => "lower",
            Guess::Equal => "equal",
        })
    }
}

impl FromStr for Guess {
    type Err = GameError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "higher" => Ok(Guess::Higher),
            "lower" => Ok(Guess::Lower),
            "equal" => Ok(Guess::Equal),
            other => Err(GameError::invalid(format!("Unknown guess `{other}`."))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HiLoPhase {
    Active,
    Lost,
    CashedOut { payout: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuessResult {
    pub previous: Card,
    pub drawn: Card,
    pub correct: bool,
    pub streak: u32,
    pub winnings: i64,
}

#[derive(Debug, Clone)]
pub struct HiLoGame {
    bet: i64,
    current: Card,
    streak: u32,
    winnings: i64,
    phase: HiLoPhase,
}

/// `floor(bet × (1 + streak × 0.2))` in integer arithmetic.
pub fn winnings_for(bet: i64, streak: u32) -> i64 {
    bet * (5 + streak as i64) / 5
}

impl HiLoGame {
    pub fn new(bet: i64, rng: &mut impl RandomSource) -> Self {
        Self::starting_with(bet, Card::random(rng))
    }

    pub(crate) fn starting_with(bet: i64, current: Card) -> Self {
        Self {
            bet,
            current,
            streak: 0,
            winnings: winnings_for(bet, 0),
            phase: HiLoPhase::Active,
        }
    }

    pub fn bet(&self) -> i64 {
        self.bet
    }

    pub fn current(&self) -> Card {
        self.current
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    /// Total the player would take home by cashing out now.
    pub fn winnings(&self) -> i64 {
        self.winnings
    }

    pub fn phase(&self) -> HiLoPhase {
        self.phase
    }

    fn require_active(&self) -> Result<(), GameError> {
        match self.phase {
            HiLoPhase::Active => Ok(()),
            _ => Err(GameError::invalid("This round is already over.")),
        }
    }

    pub fn guess(
        &mut self,
        guess: Guess,
        rng: &mut impl RandomSource,
    ) -> Result<GuessResult, GameError> {
        self.require_active()?;

        let previous = self.current;
        let drawn = Card::random(rng);
        let correct = guess.matches(&previous, &drawn);
        self.current = drawn;

        if correct {
            self.streak += 1;
            self.winnings = winnings_for(self.bet, self.streak);
        } else {
            self.winnings = 0;
            self.phase = HiLoPhase::Lost;
        }

        Ok(GuessResult {
            previous,
            drawn,
            correct,
            streak: self.streak,
            winnings: self.winnings,
        })
    }

    pub fn cash_out(&mut self) -> Result<i64, GameError> {
        self.require_active()?;
        let payout = self.winnings;
        self.phase = HiLoPhase::CashedOut { payout };
        Ok(payout)
    }
}

impl Wager for HiLoGame {
    fn stake_at_risk(&self) -> i64 {
        match self.phase {
            HiLoPhase::Active => self.bet,
            _ => 0,
        }
    }
}
