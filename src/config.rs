use std::str::FromStr;

use crate::error::{config::ConfigError, AppError};

const DEFAULT_DAILY_REWARD: i64 = 100;

pub struct Config {
    pub database_url: String,
    pub discord_bot_token: String,

    /// Refund the stake still at risk when an abandoned game session expires.
    pub refund_expired_bets: bool,
    /// Coins paid by `/daily`.
    pub daily_reward: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let required = |name: &str| {
            lookup(name).ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            discord_bot_token: required("DISCORD_BOT_TOKEN")?,
            refund_expired_bets: parse_optional(&lookup, "REFUND_EXPIRED_BETS", false)?,
            daily_reward: parse_optional(&lookup, "DAILY_REWARD", DEFAULT_DAILY_REWARD)?,
        })
    }
}

fn parse_optional<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidEnvVar {
            name: name.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_for_optional_values() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("DISCORD_BOT_TOKEN", "token"),
        ]))
        .unwrap();

        assert!(!config.refund_expired_bets);
        assert_eq!(config.daily_reward, 100);
    }

    #[test]
    fn reads_optional_values() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("DISCORD_BOT_TOKEN", "token"),
            ("REFUND_EXPIRED_BETS", "true"),
            ("DAILY_REWARD", "250"),
        ]))
        .unwrap();

        assert!(config.refund_expired_bets);
        assert_eq!(config.daily_reward, 250);
    }

    #[test]
    fn missing_token_is_reported_by_name() {
        let err = Config::from_lookup(lookup(&[("DATABASE_URL", "sqlite::memory:")]))
            .err()
            .unwrap();

        assert!(matches!(
            err,
            AppError::ConfigErr(ConfigError::MissingEnvVar(name)) if name == "DISCORD_BOT_TOKEN"
        ));
    }

    #[test]
    fn rejects_unparseable_values() {
        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("DISCORD_BOT_TOKEN", "token"),
            ("DAILY_REWARD", "lots"),
        ]))
        .err()
        .unwrap();

        assert!(matches!(
            err,
            AppError::ConfigErr(ConfigError::InvalidEnvVar { .. })
        ));
    }
}
