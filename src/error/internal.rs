use std::num::ParseIntError;
use thiserror::Error;

/// Internal issues with the codebase indicating unexpected behavior & possible bugs
#[derive(Error, Debug)]
pub enum InternalError {
    /// Failure to parse a stored Discord ID from String
    #[error("Failed to parse ID from String '{value}': {source}")]
    ParseStringId {
        /// The string value that failed to parse
        value: String,
        /// The underlying parse error
        #[source]
        source: ParseIntError,
    },

    /// A stored game identifier does not name a known game.
    #[error("Unknown game identifier '{0}'")]
    UnknownGame(String),

    /// Failure to install the Ctrl-C handler used for graceful shutdown.
    #[error("Failed to listen for shutdown signal: {0}")]
    SignalHandler(#[source] std::io::Error),

    /// Refunds owed to players of abandoned crash rounds that could not be written.
    #[error("{0} crash refunds could not be written")]
    RefundsFailed(usize),
}
