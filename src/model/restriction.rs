//! Restriction gate domain model.

use crate::{error::AppError, model::game::GameKind, util::parse::parse_u64_from_string};

/// A channel a game has been limited to within a guild.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRestriction {
    pub guild_id: u64,
    pub game: GameKind,
    pub channel_id: u64,
}

impl GameRestriction {
    /// Converts an entity model to a restriction domain model.
    ///
    /// # Returns
    /// - `Ok(GameRestriction)` - The converted restriction
    /// - `Err(AppError::InternalErr)` - Stored ID or game identifier is malformed
    pub fn from_entity(entity: entity::game_restriction::Model) -> Result<Self, AppError> {
        Ok(Self {
            guild_id: parse_u64_from_string(entity.guild_id)?,
            game: entity.game.parse::<GameKind>()?,
            channel_id: parse_u64_from_string(entity.channel_id)?,
        })
    }
}
