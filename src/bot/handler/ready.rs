//! Ready event handler for bot initialization.
//!
//! Fired once the bot completes the gateway handshake. Global slash commands are
//! (re)registered here so a deploy picks up new or changed commands.

use serenity::all::{ActivityData, Command, Context, Ready};

use crate::bot::command;

/// Handles the ready event when the bot connects to Discord.
///
/// # Arguments
/// - `ctx` - Discord context for registering commands and setting activity status
/// - `ready` - Ready event data containing bot user information
pub async fn handle_ready(ctx: Context, ready: Ready) {
    tracing::info!("{} is connected to Discord", ready.user.name);

    ctx.set_activity(Some(ActivityData::playing("/blackjack")));

    match Command::set_global_commands(&ctx.http, command::definitions()).await {
        Ok(commands) => tracing::info!("Registered {} slash commands", commands.len()),
        Err(e) => tracing::error!("Failed to register slash commands: {:?}", e),
    }
}
