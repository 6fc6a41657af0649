//! Restriction gate.
//!
//! A guild may pin a game to specific channels. A game with no restriction rows in a
//! guild may be played in any channel; once at least one channel is listed, only the
//! listed channels are allowed.

use sea_orm::DatabaseConnection;

use crate::{
    data::restriction::GameRestrictionRepository,
    error::{game::GameError, AppError},
    model::{
        game::{GameKind, PlayContext},
        restriction::GameRestriction,
    },
};

pub struct RestrictionService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> RestrictionService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn is_allowed(
        &self,
        guild_id: u64,
        channel_id: u64,
        game: GameKind,
    ) -> Result<bool, AppError> {
        let restrictions = GameRestrictionRepository::new(self.db)
            .get_by_game(guild_id, game)
            .await?;

        Ok(restrictions.is_empty() || restrictions.iter().any(|r| r.channel_id == channel_id))
    }

    /// Refuses with `GameRestricted` when `game` may not run where `ctx` was invoked.
    pub async fn ensure_allowed(&self, ctx: PlayContext, game: GameKind) -> Result<(), AppError> {
        if self.is_allowed(ctx.guild_id, ctx.channel_id, game).await? {
            Ok(())
        } else {
            Err(GameError::GameRestricted.into())
        }
    }

    /// Adds `channel_id` to the channels `game` is limited to.
    ///
    /// Returns `false` if the channel was already listed.
    pub async fn allow_channel(
        &self,
        guild_id: u64,
        game: GameKind,
        channel_id: u64,
    ) -> Result<bool, AppError> {
        GameRestrictionRepository::new(self.db)
            .create(guild_id, game, channel_id)
            .await
    }

    /// Removes `channel_id` from the list. Removing the last channel lifts the restriction.
    pub async fn remove_channel(
        &self,
        guild_id: u64,
        game: GameKind,
        channel_id: u64,
    ) -> Result<bool, AppError> {
        GameRestrictionRepository::new(self.db)
            .delete(guild_id, game, channel_id)
            .await
    }

    pub async fn list_channels(&self, guild_id: u64) -> Result<Vec<GameRestriction>, AppError> {
        GameRestrictionRepository::new(self.db)
            .get_by_guild(guild_id)
            .await
    }
}
