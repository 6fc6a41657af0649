use thiserror::Error;

/// Rejections returned by game engines and services.
///
/// All of these leave game and ledger state untouched, except `PayoutCollected`, which
/// reports a late credit for an already finished game. Expected game outcomes such as a
/// bust, a crash or a mine hit are terminal states, never errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Wager exceeds the player's current balance.
    #[error("You need {required} coins but only have {available}.")]
    InsufficientFunds { required: i64, available: i64 },

    /// Action is not legal in the current game state.
    #[error("{0}")]
    InvalidAction(String),

    /// No live session matches the request; the player has to start a new game.
    #[error("That game has expired or already finished. Start a new one.")]
    SessionExpired,

    /// Acting user does not own the session.
    #[error("This isn't your game.")]
    SessionNotOwned,

    /// Player already has a live session of this game family.
    #[error("You already have a game in progress. Finish it first.")]
    ActiveSessionExists,

    /// Restriction gate refused the game in this channel.
    #[error("This game can't be played in this channel.")]
    GameRestricted,

    /// The player's previous game had already ended; its payout was credited just now
    /// instead of running the requested action.
    #[error("Your last game was already over. Its payout of {payout} coins has now been credited.")]
    PayoutCollected { payout: i64 },

    /// Free game is still cooling down for this player.
    #[error("Slow down! Try again in {remaining_secs} seconds.")]
    Cooldown { remaining_secs: u64 },
}

impl GameError {
    /// Shorthand for building an `InvalidAction` from any string-like reason.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidAction(reason.into())
    }
}
