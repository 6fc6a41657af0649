//! Balance factory for creating test ledger rows.

use crate::factory::helpers::next_id;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Factory for creating test balances with customizable fields.
///
/// # Example
///
/// ```rust,ignore
/// use test_utils::factory::balance::BalanceFactory;
///
/// let balance = BalanceFactory::new(&db)
///     .user_id(123456789)
///     .guild_id(987654321)
///     .coins(250)
///     .build()
///     .await?;
/// ```
pub struct BalanceFactory<'a> {
    db: &'a DatabaseConnection,
    user_id: u64,
    guild_id: u64,
    coins: i64,
    total_earned: i64,
    last_daily: Option<DateTime<Utc>>,
}

impl<'a> BalanceFactory<'a> {
    /// Creates a new BalanceFactory with default values.
    ///
    /// Defaults:
    /// - user_id: auto-incremented
    /// - guild_id: auto-incremented
    /// - coins: `1000`
    /// - total_earned: `0`
    /// - last_daily: `None`
    ///
    /// # Arguments
    /// - `db` - Database connection for inserting the entity
    ///
    /// # Returns
    /// - `BalanceFactory` - New factory instance with defaults
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self {
            db,
            user_id: next_id(),
            guild_id: next_id(),
            coins: 1000,
            total_earned: 0,
            last_daily: None,
        }
    }

    pub fn user_id(mut self, user_id: u64) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn guild_id(mut self, guild_id: u64) -> Self {
        self.guild_id = guild_id;
        self
    }

    pub fn coins(mut self, coins: i64) -> Self {
        self.coins = coins;
        self
    }

    pub fn total_earned(mut self, total_earned: i64) -> Self {
        self.total_earned = total_earned;
        self
    }

    /// Sets when the member last claimed the daily reward.
    ///
    /// # Arguments
    /// - `last_daily` - Timestamp of the previous claim
    ///
    /// # Returns
    /// - `Self` - Factory instance for method chaining
    pub fn last_daily(mut self, last_daily: DateTime<Utc>) -> Self {
        self.last_daily = Some(last_daily);
        self
    }

    /// Builds and inserts the balance entity into the database.
    ///
    /// # Returns
    /// - `Ok(entity::balance::Model)` - Created balance entity
    /// - `Err(DbErr)` - Database error during insert
    pub async fn build(self) -> Result<entity::balance::Model, DbErr> {
        entity::balance::ActiveModel {
            user_id: ActiveValue::Set(self.user_id.to_string()),
            guild_id: ActiveValue::Set(self.guild_id.to_string()),
            coins: ActiveValue::Set(self.coins),
            total_earned: ActiveValue::Set(self.total_earned),
            last_daily: ActiveValue::Set(self.last_daily),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }
}

/// Creates a balance with default values.
///
/// Shorthand for `BalanceFactory::new(db).build().await`.
pub async fn create_balance(db: &DatabaseConnection) -> Result<entity::balance::Model, DbErr> {
    BalanceFactory::new(db).build().await
}

/// Creates a balance for a specific member holding `coins`.
///
/// # Arguments
/// - `db` - Database connection
/// - `user_id` - Discord user ID
/// - `guild_id` - Discord guild ID
/// - `coins` - Starting wallet
///
/// # Returns
/// - `Ok(entity::balance::Model)` - Created balance entity
/// - `Err(DbErr)` - Database error during insert
pub async fn create_balance_with_coins(
    db: &DatabaseConnection,
    user_id: u64,
    guild_id: u64,
    coins: i64,
) -> Result<entity::balance::Model, DbErr> {
    BalanceFactory::new(db)
        .user_id(user_id)
        .guild_id(guild_id)
        .coins(coins)
        .build()
        .await
}
