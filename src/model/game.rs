//! Game identifiers shared by the restriction gate, session stores and bot commands.

use std::fmt;
use std::str::FromStr;

use crate::{error::internal::InternalError, model::balance::Wallet};

/// Every game the bot offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameKind {
    Blackjack,
    Crash,
    Minesweeper,
    HiLo,
    Coinflip,
    Dice,
    Slots,
    Roulette,
    Wheel,
    Rps,
}

impl GameKind {
    pub const ALL: [GameKind; 10] = [
        GameKind::Blackjack,
        GameKind::Crash,
        GameKind::Minesweeper,
        GameKind::HiLo,
        GameKind::Coinflip,
        GameKind::Dice,
        GameKind::Slots,
        GameKind::Roulette,
        GameKind::Wheel,
        GameKind::Rps,
    ];

    /// Stable identifier used in the database, session ids and command names.
    pub fn as_str(&self) -> &'static str {
        match self {
            GameKind::Blackjack => "blackjack",
            GameKind::Crash => "crash",
            GameKind::Minesweeper => "minesweeper",
            GameKind::HiLo => "hilo",
            GameKind::Coinflip => "coinflip",
            GameKind::Dice => "dice",
            GameKind::Slots => "slots",
            GameKind::Roulette => "roulette",
            GameKind::Wheel => "wheel",
            GameKind::Rps => "rps",
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameKind {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GameKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| InternalError::UnknownGame(s.to_string()))
    }
}

/// Where a game command was invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayContext {
    pub user_id: u64,
    pub guild_id: u64,
    pub channel_id: u64,
}

impl PlayContext {
    pub fn new(user_id: u64, guild_id: u64, channel_id: u64) -> Self {
        Self {
            user_id,
            guild_id,
            channel_id,
        }
    }

    /// Ledger row of the invoking member.
    pub fn wallet(&self) -> Wallet {
        Wallet::new(self.user_id, self.guild_id)
    }
}
