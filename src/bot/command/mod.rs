//! Slash command definitions and dispatch.
//!
//! Each submodule registers its commands and turns resolved options into a service call,
//! returning the plain-text reply. Bet limits live here rather than in the services.

pub mod blackjack;
pub mod casino;
pub mod crash;
pub mod economy;
pub mod gamechannel;
pub mod hilo;
pub mod minesweeper;
pub mod rps;

use serenity::all::{
    CommandOptionType, CreateCommand, CreateCommandOption, ResolvedOption, ResolvedValue,
};

use crate::{
    error::{game::GameError, AppError},
    model::game::PlayContext,
    state::AppState,
};

/// Every global command the bot registers on ready.
pub fn definitions() -> Vec<CreateCommand> {
    let mut commands = economy::register();
    commands.extend(casino::register());
    commands.extend([
        rps::register(),
        blackjack::register(),
        crash::register(),
        minesweeper::register(),
        hilo::register(),
        gamechannel::register(),
    ]);
    commands
}

/// Runs the command named `name` and returns the reply text.
pub async fn dispatch(
    state: &AppState,
    ctx: PlayContext,
    name: &str,
    options: Options<'_>,
) -> Result<String, AppError> {
    match name {
        "balance" => economy::balance(state, ctx).await,
        "daily" => economy::daily(state, ctx).await,
        "leaderboard" => economy::leaderboard(state, ctx).await,
        "coinflip" | "dice" | "slots" | "roulette" | "wheel" => {
            casino::run(state, ctx, name, options).await
        }
        "rps" => rps::run(state, ctx, options).await,
        "blackjack" => blackjack::run(state, ctx, options).await,
        "crash" => crash::run(state, ctx, options).await,
        "minesweeper" => minesweeper::run(state, ctx, options).await,
        "hilo" => hilo::run(state, ctx, options).await,
        "gamechannel" => gamechannel::run(state, ctx, options).await,
        other => {
            tracing::warn!("Received unknown command /{}", other);
            Err(GameError::invalid("Unknown command.").into())
        }
    }
}

/// Inclusive bet range for one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BetLimits {
    pub min: i64,
    pub max: i64,
}

impl BetLimits {
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub fn check(&self, bet: i64) -> Result<i64, GameError> {
        if (self.min..=self.max).contains(&bet) {
            Ok(bet)
        } else {
            Err(GameError::invalid(format!(
                "Bets must be between {} and {} coins.",
                self.min, self.max
            )))
        }
    }

    /// Option description shown in the Discord client.
    fn describe(&self) -> String {
        format!("Coins to bet ({}-{})", self.min, self.max)
    }
}

/// Required integer `bet` option.
pub fn bet_option(limits: BetLimits) -> CreateCommandOption {
    CreateCommandOption::new(CommandOptionType::Integer, "bet", limits.describe()).required(true)
}

pub fn subcommand(name: &str, description: &str) -> CreateCommandOption {
    CreateCommandOption::new(CommandOptionType::SubCommand, name, description)
}

/// Resolved options of one command or subcommand.
pub struct Options<'a> {
    options: Vec<ResolvedOption<'a>>,
}

impl<'a> Options<'a> {
    pub fn new(options: Vec<ResolvedOption<'a>>) -> Self {
        Self { options }
    }

    /// Splits off the invoked subcommand and its own options.
    pub fn subcommand(self) -> Result<(&'a str, Options<'a>), GameError> {
        for option in self.options {
            if let ResolvedValue::SubCommand(inner) = option.value {
                return Ok((option.name, Options::new(inner)));
            }
        }
        Err(GameError::invalid("Pick a subcommand."))
    }

    fn find(&self, name: &str) -> Result<&ResolvedValue<'a>, GameError> {
        self.options
            .iter()
            .find(|option| option.name == name)
            .map(|option| &option.value)
            .ok_or_else(|| GameError::invalid(format!("Missing option `{name}`.")))
    }

    pub fn integer(&self, name: &str) -> Result<i64, GameError> {
        match self.find(name)? {
            ResolvedValue::Integer(value) => Ok(*value),
            _ => Err(GameError::invalid(format!("`{name}` must be a whole number."))),
        }
    }

    pub fn string(&self, name: &str) -> Result<&'a str, GameError> {
        match self.find(name)? {
            ResolvedValue::String(value) => Ok(*value),
            _ => Err(GameError::invalid(format!("`{name}` must be text."))),
        }
    }

    pub fn user(&self, name: &str) -> Result<u64, GameError> {
        match self.find(name)? {
            ResolvedValue::User(user, _) => Ok(user.id.get()),
            _ => Err(GameError::invalid(format!("`{name}` must be a member."))),
        }
    }

    pub fn channel(&self, name: &str) -> Result<u64, GameError> {
        match self.find(name)? {
            ResolvedValue::Channel(channel) => Ok(channel.id.get()),
            _ => Err(GameError::invalid(format!("`{name}` must be a channel."))),
        }
    }

    /// The `bet` option, checked against `limits`.
    pub fn bet(&self, limits: BetLimits) -> Result<i64, GameError> {
        limits.check(self.integer("bet")?)
    }
}

/// Signed coin amount for replies, e.g. `+150` or `-50`.
pub fn signed(amount: i64) -> String {
    if amount >= 0 {
        format!("+{amount}")
    } else {
        amount.to_string()
    }
}
