//! Error types for the casino bot.
//!
//! This module provides the application's error hierarchy. `GameError` carries the
//! rejections a player can trigger (insufficient funds, invalid actions, expired or
//! foreign sessions) and is shown back to the player verbatim. Every other `AppError`
//! variant is an infrastructure failure that is logged and answered with a generic
//! message by the bot adapter.

pub mod config;
pub mod game;
pub mod internal;

use thiserror::Error;

use crate::error::{config::ConfigError, game::GameError, internal::InternalError};

/// Top-level application error type.
///
/// Aggregates all possible error types that can occur in the application. Most variants
/// use `#[from]` for automatic error conversion so services can use `?` on repository
/// and engine results alike.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error during startup or environment variable loading.
    #[error(transparent)]
    ConfigErr(#[from] ConfigError),

    /// Player-facing game rejection.
    ///
    /// Displayed to the invoking user as-is. No state was mutated.
    #[error(transparent)]
    GameErr(#[from] GameError),

    /// Database operation error from SeaORM.
    ///
    /// Ledger failures are not retried; they end the current interaction.
    #[error(transparent)]
    DbErr(#[from] sea_orm::DbErr),

    /// Discord API error from Serenity.
    ///
    /// Boxed due to large size.
    #[error(transparent)]
    DiscordErr(#[from] Box<serenity::Error>),

    /// Cron scheduler error.
    #[error(transparent)]
    SchedulerErr(#[from] tokio_cron_scheduler::JobSchedulerError),

    /// Internal issue indicating unexpected state such as an unparsable stored ID.
    #[error(transparent)]
    InternalErr(#[from] InternalError),
}

/// Manual conversion from serenity::Error to AppError.
///
/// Boxes the error to reduce the size of the AppError enum, as serenity::Error
/// is very large and would make all AppError variants larger if not boxed.
impl From<serenity::Error> for AppError {
    fn from(err: serenity::Error) -> Self {
        AppError::DiscordErr(Box::new(err))
    }
}

impl AppError {
    /// Message suitable for showing to the player who triggered the error.
    ///
    /// Game rejections are passed through; infrastructure failures are logged here and
    /// replaced with a generic message to avoid leaking internals into the channel.
    ///
    /// # Returns
    /// - `String` - Text for the interaction reply
    pub fn user_message(&self) -> String {
        match self {
            Self::GameErr(err) => err.to_string(),
            err => {
                tracing::error!("Interaction failed: {}", err);
                "Something went wrong, please try again later.".to_string()
            }
        }
    }
}
