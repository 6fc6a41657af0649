//! Rock-paper-scissors: a free game that hands out small coin rewards.

use std::{fmt, str::FromStr};

use crate::{
    engine::{random::RandomSource, Wager},
    error::game::GameError,
};

/// Seconds a player waits between solo rounds.
pub const SOLO_COOLDOWN_SECS: u64 = 60;

pub const SOLO_WIN_REWARD: i64 = 10;
pub const SOLO_TIE_REWARD: i64 = 5;
pub const DUEL_WIN_REWARD: i64 = 15;
pub const DUEL_TIE_REWARD: i64 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpsChoice {
    Rock,
    Paper,
    Scissors,
}

impl RpsChoice {
    pub const ALL: [RpsChoice; 3] = [RpsChoice::Rock, RpsChoice::Paper, RpsChoice::Scissors];

    fn beats(&self, other: RpsChoice) -> bool {
        matches!(
            (self, other),
            (RpsChoice::Rock, RpsChoice::Scissors)
                | (RpsChoice::Paper, RpsChoice::Rock)
                | (RpsChoice::Scissors, RpsChoice::Paper)
        )
    }

    pub fn random(rng: &mut impl RandomSource) -> Self {
        Self::ALL[rng.randint(0, 2) as usize]
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            RpsChoice::Rock => "🪨",
            RpsChoice::Paper => "📄",
            RpsChoice::Scissors => "✂️",
        }
    }
}

impl fmt::Display for RpsChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RpsChoice::Rock => "rock",
            RpsChoice::Paper => "paper",
            RpsChoice::Scissors => "scissors",
        })
    }
}

impl FromStr for RpsChoice {
    type Err = GameError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "rock" => Ok(RpsChoice::Rock),
            "paper" => Ok(RpsChoice::Paper),
            "scissors" => Ok(RpsChoice::Scissors),
            other => Err(GameError::invalid(format!("Unknown move `{other}`."))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpsResult {
    Win,
    Tie,
    Lose,
}

/// Result for the player who threw `mine`.
pub fn judge(mine: RpsChoice, theirs: RpsChoice) -> RpsResult {
    if mine == theirs {
        RpsResult::Tie
    } else if mine.beats(theirs) {
        RpsResult::Win
    } else {
        RpsResult::Lose
    }
}

/// A solo round against the bot. The bot's move is committed when the round opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoloRound {
    bot_choice: RpsChoice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoloOutcome {
    pub player: RpsChoice,
    pub bot: RpsChoice,
    pub result: RpsResult,
    pub reward: i64,
}

impl SoloRound {
    pub fn new(rng: &mut impl RandomSource) -> Self {
        Self {
            bot_choice: RpsChoice::random(rng),
        }
    }

    pub fn throw(&self, player: RpsChoice) -> SoloOutcome {
        let result = judge(player, self.bot_choice);
        let reward = match result {
            RpsResult::Win => SOLO_WIN_REWARD,
            RpsResult::Tie => SOLO_TIE_REWARD,
            RpsResult::Lose => 0,
        };

        SoloOutcome {
            player,
            bot: self.bot_choice,
            result,
            reward,
        }
    }
}

/// A pending challenge from one member to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Challenge {
    pub challenger: u64,
    pub opponent: u64,
    challenger_choice: RpsChoice,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuelOutcome {
    pub challenger_choice: RpsChoice,
    pub opponent_choice: RpsChoice,
    /// `None` on a tie.
    pub winner: Option<u64>,
    /// Coins each member receives.
    pub rewards: Vec<(u64, i64)>,
}

impl Challenge {
    pub fn new(challenger: u64, opponent: u64, choice: RpsChoice) -> Result<Self, GameError> {
        if challenger == opponent {
            return Err(GameError::invalid("You can't challenge yourself."));
        }
        Ok(Self {
            challenger,
            opponent,
            challenger_choice: choice,
        })
    }

    /// Resolves the challenge with the opponent's move. Only the named opponent may accept.
    pub fn accept(&self, user_id: u64, choice: RpsChoice) -> Result<DuelOutcome, GameError> {
        if user_id != self.opponent {
            return Err(GameError::SessionNotOwned);
        }

        let (winner, rewards) = match judge(self.challenger_choice, choice) {
            RpsResult::Win => (
                Some(self.challenger),
                vec![(self.challenger, DUEL_WIN_REWARD)],
            ),
            RpsResult::Lose => (Some(self.opponent), vec![(self.opponent, DUEL_WIN_REWARD)]),
            RpsResult::Tie => (
                None,
                vec![
                    (self.challenger, DUEL_TIE_REWARD),
                    (self.opponent, DUEL_TIE_REWARD),
                ],
            ),
        };

        Ok(DuelOutcome {
            challenger_choice: self.challenger_choice,
            opponent_choice: choice,
            winner,
            rewards,
        })
    }
}

impl Wager for SoloRound {
    fn stake_at_risk(&self) -> i64 {
        0
    }
}

impl Wager for Challenge {
    fn stake_at_risk(&self) -> i64 {
        0
    }
}
