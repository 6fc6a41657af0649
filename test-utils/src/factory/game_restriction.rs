//! Restriction factory for limiting a game to a channel in tests.

use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Creates a restriction row allowing `game` only in `channel_id` of `guild_id`.
///
/// # Arguments
/// - `db` - Database connection
/// - `guild_id` - Discord guild ID
/// - `game` - Game identifier as stored (e.g. `"blackjack"`)
/// - `channel_id` - Discord channel ID the game is allowed in
///
/// # Returns
/// - `Ok(entity::game_restriction::Model)` - Created restriction entity
/// - `Err(DbErr)` - Database error during insert
pub async fn create_restriction(
    db: &DatabaseConnection,
    guild_id: u64,
    game: &str,
    channel_id: u64,
) -> Result<entity::game_restriction::Model, DbErr> {
    entity::game_restriction::ActiveModel {
        guild_id: ActiveValue::Set(guild_id.to_string()),
        game: ActiveValue::Set(game.to_string()),
        channel_id: ActiveValue::Set(channel_id.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
}
