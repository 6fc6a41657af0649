//! Economy ledger service.
//!
//! Wraps `BalanceRepository` with the semantics games rely on: debits that fail with
//! `InsufficientFunds` instead of writing a negative balance, payouts that count toward
//! lifetime earnings, refunds that do not, and the daily reward cooldown.

use chrono::{DateTime, Duration, Utc};
use sea_orm::DatabaseConnection;

use crate::{
    data::balance::BalanceRepository,
    error::{game::GameError, AppError},
    model::balance::{Balance, DailyClaim, Wallet},
};

/// Time between daily reward claims.
pub const DAILY_COOLDOWN_HOURS: i64 = 24;

pub struct EconomyService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> EconomyService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Gets a member's balance, opening the account with the starting coins if needed.
    pub async fn balance(&self, wallet: Wallet) -> Result<Balance, AppError> {
        BalanceRepository::new(self.db).get_or_create(wallet).await
    }

    /// Takes `amount` coins from a member.
    ///
    /// The balance is checked and reduced in a single conditional update, so two
    /// concurrent debits can never overdraw the account.
    ///
    /// # Arguments
    /// - `wallet` - Ledger row to debit
    /// - `amount` - Non-negative number of coins to remove
    ///
    /// # Returns
    /// - `Ok(())` - Coins removed
    /// - `Err(AppError::GameErr(InsufficientFunds))` - Balance is below `amount`; nothing changed
    /// - `Err(AppError::DbErr)` - Database error
    pub async fn debit(&self, wallet: Wallet, amount: i64) -> Result<(), AppError> {
        let repo = BalanceRepository::new(self.db);
        let balance = repo.get_or_create(wallet).await?;

        if amount <= 0 {
            return Ok(());
        }

        if repo.adjust(wallet, -amount, 0).await? {
            return Ok(());
        }

        // Re-read for the message; the balance may have moved since the first read
        let available = repo
            .find(wallet)
            .await?
            .map(|b| b.coins)
            .unwrap_or(balance.coins);

        Err(GameError::InsufficientFunds {
            required: amount,
            available,
        }
        .into())
    }

    /// Pays out winnings or rewards. Counts toward `total_earned`.
    pub async fn credit(&self, wallet: Wallet, amount: i64) -> Result<(), AppError> {
        self.add(wallet, amount, amount).await
    }

    /// Returns a stake without counting it as earnings.
    pub async fn refund(&self, wallet: Wallet, amount: i64) -> Result<(), AppError> {
        self.add(wallet, amount, 0).await
    }

    async fn add(&self, wallet: Wallet, amount: i64, earned: i64) -> Result<(), AppError> {
        if amount <= 0 {
            return Ok(());
        }

        let repo = BalanceRepository::new(self.db);
        if !repo.adjust(wallet, amount, earned).await? {
            repo.get_or_create(wallet).await?;
            repo.adjust(wallet, amount, earned).await?;
        }

        Ok(())
    }

    /// Claims the daily reward if the cooldown has passed.
    ///
    /// # Arguments
    /// - `wallet` - Claiming member
    /// - `reward` - Coins to credit
    /// - `now` - Claim time
    ///
    /// # Returns
    /// - `Ok(DailyClaim::Claimed)` - Reward credited, with the updated balance
    /// - `Ok(DailyClaim::NotReady)` - Claimed within the last 24 hours
    /// - `Err(AppError::DbErr)` - Database error
    pub async fn claim_daily(
        &self,
        wallet: Wallet,
        reward: i64,
        now: DateTime<Utc>,
    ) -> Result<DailyClaim, AppError> {
        let repo = BalanceRepository::new(self.db);
        let cooldown = Duration::hours(DAILY_COOLDOWN_HOURS);
        let before = repo.get_or_create(wallet).await?;

        if repo.claim_daily(wallet, reward, now, now - cooldown).await? {
            let balance = repo.get_or_create(wallet).await?;
            return Ok(DailyClaim::Claimed { reward, balance });
        }

        let last = repo
            .find(wallet)
            .await?
            .and_then(|b| b.last_daily)
            .or(before.last_daily)
            .unwrap_or(now);

        Ok(DailyClaim::NotReady {
            next_claim_at: last + cooldown,
        })
    }

    /// Richest members of a guild, highest first.
    pub async fn leaderboard(&self, guild_id: u64, limit: u64) -> Result<Vec<Balance>, AppError> {
        BalanceRepository::new(self.db)
            .top_by_coins(guild_id, limit)
            .await
    }
}
