//! Economy ledger repository.
//!
//! This module provides the `BalanceRepository` for reading and adjusting member coin
//! balances. Every mutation is a single conditional `UPDATE` so concurrent interactions
//! for the same member cannot lose an update or drive a balance below zero.

use chrono::{DateTime, Utc};
use migration::OnConflict;
use sea_orm::{
    sea_query::{Expr, ExprTrait},
    ActiveValue, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

use crate::{
    error::AppError,
    model::balance::{Balance, Wallet, STARTING_COINS},
};

/// Repository providing database operations for the economy ledger.
pub struct BalanceRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> BalanceRepository<'a> {
    /// Creates a new BalanceRepository instance.
    ///
    /// # Arguments
    /// - `db` - Reference to the database connection
    ///
    /// # Returns
    /// - `BalanceRepository` - New repository instance
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    fn wallet_filter(wallet: Wallet) -> Condition {
        Condition::all()
            .add(entity::balance::Column::UserId.eq(wallet.user_id.to_string()))
            .add(entity::balance::Column::GuildId.eq(wallet.guild_id.to_string()))
    }

    /// Finds the balance for a member without creating it.
    ///
    /// # Arguments
    /// - `wallet` - Member and guild to look up
    ///
    /// # Returns
    /// - `Ok(Some(Balance))` - Ledger row exists
    /// - `Ok(None)` - Member has never been seen in this guild
    /// - `Err(AppError::DbErr)` - Database error during query
    pub async fn find(&self, wallet: Wallet) -> Result<Option<Balance>, AppError> {
        let entity = entity::prelude::Balance::find()
            .filter(Self::wallet_filter(wallet))
            .one(self.db)
            .await?;

        entity.map(Balance::from_entity).transpose()
    }

    /// Gets the balance for a member, creating it with starting coins on first read.
    ///
    /// Concurrent first reads for the same member race on the unique
    /// `(user_id, guild_id)` index; the losing insert is skipped and both read the same row.
    ///
    /// # Arguments
    /// - `wallet` - Member and guild to look up
    ///
    /// # Returns
    /// - `Ok(Balance)` - Existing or freshly created balance
    /// - `Err(AppError::DbErr)` - Database error during query or insert
    pub async fn get_or_create(&self, wallet: Wallet) -> Result<Balance, AppError> {
        if let Some(balance) = self.find(wallet).await? {
            return Ok(balance);
        }

        entity::prelude::Balance::insert(entity::balance::ActiveModel {
            user_id: ActiveValue::Set(wallet.user_id.to_string()),
            guild_id: ActiveValue::Set(wallet.guild_id.to_string()),
            coins: ActiveValue::Set(STARTING_COINS),
            total_earned: ActiveValue::Set(0),
            last_daily: ActiveValue::Set(None),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::columns([
                entity::balance::Column::UserId,
                entity::balance::Column::GuildId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(self.db)
        .await?;

        self.find(wallet)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("balance for {wallet:?}")).into())
    }

    /// Atomically adds `delta` coins and `earned` to the lifetime total.
    ///
    /// A negative `delta` only applies when the row holds at least `-delta` coins, so a
    /// balance is never written negative. The row must already exist.
    ///
    /// # Arguments
    /// - `wallet` - Member and guild to adjust
    /// - `delta` - Signed change to `coins`
    /// - `earned` - Amount to add to `total_earned`
    ///
    /// # Returns
    /// - `Ok(true)` - Adjustment applied
    /// - `Ok(false)` - Not enough coins (or no row), nothing changed
    /// - `Err(AppError::DbErr)` - Database error during update
    pub async fn adjust(&self, wallet: Wallet, delta: i64, earned: i64) -> Result<bool, AppError> {
        let mut condition = Self::wallet_filter(wallet);
        if delta < 0 {
            condition = condition.add(entity::balance::Column::Coins.gte(-delta));
        }

        let result = entity::prelude::Balance::update_many()
            .col_expr(
                entity::balance::Column::Coins,
                Expr::col(entity::balance::Column::Coins).add(delta),
            )
            .col_expr(
                entity::balance::Column::TotalEarned,
                Expr::col(entity::balance::Column::TotalEarned).add(earned),
            )
            .filter(condition)
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Credits `reward` and stamps `last_daily` if the previous claim is older than `cutoff`.
    ///
    /// # Arguments
    /// - `wallet` - Member and guild claiming
    /// - `reward` - Coins to credit
    /// - `now` - Claim time written to `last_daily`
    /// - `cutoff` - Latest previous claim time that still allows a new claim
    ///
    /// # Returns
    /// - `Ok(true)` - Reward credited
    /// - `Ok(false)` - Claimed too recently, nothing changed
    /// - `Err(AppError::DbErr)` - Database error during update
    pub async fn claim_daily(
        &self,
        wallet: Wallet,
        reward: i64,
        now: DateTime<Utc>,
        cutoff: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let result = entity::prelude::Balance::update_many()
            .col_expr(
                entity::balance::Column::Coins,
                Expr::col(entity::balance::Column::Coins).add(reward),
            )
            .col_expr(
                entity::balance::Column::TotalEarned,
                Expr::col(entity::balance::Column::TotalEarned).add(reward),
            )
            .col_expr(entity::balance::Column::LastDaily, Expr::value(now))
            .filter(Self::wallet_filter(wallet))
            .filter(
                Condition::any()
                    .add(entity::balance::Column::LastDaily.is_null())
                    .add(entity::balance::Column::LastDaily.lte(cutoff)),
            )
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Gets the richest members of a guild.
    ///
    /// # Arguments
    /// - `guild_id` - Discord guild ID
    /// - `limit` - Maximum number of rows
    ///
    /// # Returns
    /// - `Ok(Vec<Balance>)` - Balances ordered by coins, highest first
    /// - `Err(AppError::DbErr)` - Database error during query
    pub async fn top_by_coins(&self, guild_id: u64, limit: u64) -> Result<Vec<Balance>, AppError> {
        let entities = entity::prelude::Balance::find()
            .filter(entity::balance::Column::GuildId.eq(guild_id.to_string()))
            .order_by_desc(entity::balance::Column::Coins)
            .limit(limit)
            .all(self.db)
            .await?;

        entities.into_iter().map(Balance::from_entity).collect()
    }
}
