//! Economy ledger domain models.

use chrono::{DateTime, Utc};

use crate::{error::AppError, util::parse::parse_u64_from_string};

/// Coins a member starts with the first time the ledger sees them.
pub const STARTING_COINS: i64 = 1000;

/// Coin balance of one member within one guild.
#[derive(Debug, Clone, PartialEq)]
pub struct Balance {
    /// Discord ID of the member
    pub user_id: u64,
    /// Discord ID of the guild the balance belongs to
    pub guild_id: u64,
    /// Spendable coins, never negative.
    pub coins: i64,
    /// Lifetime sum of payouts and rewards credited.
    pub total_earned: i64,
    /// When the daily reward was last claimed.
    pub last_daily: Option<DateTime<Utc>>,
}

impl Balance {
    /// Converts an entity model to a balance domain model at the repository boundary.
    ///
    /// # Arguments
    /// - `entity` - The entity model from the database
    ///
    /// # Returns
    /// - `Ok(Balance)` - The converted balance
    /// - `Err(AppError::InternalErr(ParseStringId))` - Stored user or guild ID is not a u64
    pub fn from_entity(entity: entity::balance::Model) -> Result<Self, AppError> {
        Ok(Self {
            user_id: parse_u64_from_string(entity.user_id)?,
            guild_id: parse_u64_from_string(entity.guild_id)?,
            coins: entity.coins,
            total_earned: entity.total_earned,
            last_daily: entity.last_daily,
        })
    }
}

/// Identifies a ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Wallet {
    pub user_id: u64,
    pub guild_id: u64,
}

impl Wallet {
    pub fn new(user_id: u64, guild_id: u64) -> Self {
        Self { user_id, guild_id }
    }
}

/// Outcome of a daily reward claim.
#[derive(Debug, Clone, PartialEq)]
pub enum DailyClaim {
    /// Reward credited; carries the balance after the credit.
    Claimed { reward: i64, balance: Balance },
    /// Already claimed within the cooldown window.
    NotReady { next_claim_at: DateTime<Utc> },
}
