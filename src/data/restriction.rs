//! Restriction gate repository.

use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};

use crate::{
    error::AppError,
    model::{game::GameKind, restriction::GameRestriction},
};

/// Repository for the channels each game is limited to.
pub struct GameRestrictionRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> GameRestrictionRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Gets every channel a game is limited to within a guild.
    ///
    /// # Returns
    /// - `Ok(Vec<GameRestriction>)` - Empty when the game is unrestricted
    /// - `Err(AppError::DbErr)` - Database error during query
    pub async fn get_by_game(
        &self,
        guild_id: u64,
        game: GameKind,
    ) -> Result<Vec<GameRestriction>, AppError> {
        let entities = entity::prelude::GameRestriction::find()
            .filter(entity::game_restriction::Column::GuildId.eq(guild_id.to_string()))
            .filter(entity::game_restriction::Column::Game.eq(game.as_str()))
            .all(self.db)
            .await?;

        entities
            .into_iter()
            .map(GameRestriction::from_entity)
            .collect()
    }

    /// Gets every restriction configured in a guild.
    pub async fn get_by_guild(&self, guild_id: u64) -> Result<Vec<GameRestriction>, AppError> {
        let entities = entity::prelude::GameRestriction::find()
            .filter(entity::game_restriction::Column::GuildId.eq(guild_id.to_string()))
            .all(self.db)
            .await?;

        entities
            .into_iter()
            .map(GameRestriction::from_entity)
            .collect()
    }

    /// Adds a channel to a game's allow list. Adding an existing channel is a no-op.
    ///
    /// # Returns
    /// - `Ok(true)` - Restriction created
    /// - `Ok(false)` - Channel was already allowed
    /// - `Err(AppError::DbErr)` - Database error during query or insert
    pub async fn create(
        &self,
        guild_id: u64,
        game: GameKind,
        channel_id: u64,
    ) -> Result<bool, AppError> {
        let existing = entity::prelude::GameRestriction::find()
            .filter(entity::game_restriction::Column::GuildId.eq(guild_id.to_string()))
            .filter(entity::game_restriction::Column::Game.eq(game.as_str()))
            .filter(entity::game_restriction::Column::ChannelId.eq(channel_id.to_string()))
            .one(self.db)
            .await?;

        if existing.is_some() {
            return Ok(false);
        }

        entity::game_restriction::ActiveModel {
            guild_id: ActiveValue::Set(guild_id.to_string()),
            game: ActiveValue::Set(game.as_str().to_string()),
            channel_id: ActiveValue::Set(channel_id.to_string()),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        Ok(true)
    }

    /// Removes a channel from a game's allow list.
    ///
    /// # Returns
    /// - `Ok(true)` - Restriction deleted
    /// - `Ok(false)` - No such restriction existed
    /// - `Err(AppError::DbErr)` - Database error during delete
    pub async fn delete(
        &self,
        guild_id: u64,
        game: GameKind,
        channel_id: u64,
    ) -> Result<bool, AppError> {
        let result = entity::prelude::GameRestriction::delete_many()
            .filter(entity::game_restriction::Column::GuildId.eq(guild_id.to_string()))
            .filter(entity::game_restriction::Column::Game.eq(game.as_str()))
            .filter(entity::game_restriction::Column::ChannelId.eq(channel_id.to_string()))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}
