//! Slash command dispatch.
//!
//! Successful commands reply publicly so the table can follow the game. Errors reply
//! ephemerally with [`AppError::user_message`].

use serenity::all::{
    CommandInteraction, Context, CreateInteractionResponse, CreateInteractionResponseMessage,
    Interaction,
};

use crate::{
    bot::command::{dispatch, Options},
    error::{game::GameError, AppError},
    model::game::PlayContext,
    state::AppState,
};

/// Handles an interaction. Anything other than a slash command is ignored.
///
/// # Arguments
/// - `state` - Shared application state
/// - `ctx` - Discord context for replying
/// - `interaction` - The incoming interaction
pub async fn handle_interaction(state: &AppState, ctx: Context, interaction: Interaction) {
    let Interaction::Command(command) = interaction else {
        return;
    };

    tracing::debug!(
        "User {} ran /{} in channel {}",
        command.user.id,
        command.data.name,
        command.channel_id
    );

    let message = match run_command(state, &command).await {
        Ok(content) => CreateInteractionResponseMessage::new().content(content),
        Err(err) => CreateInteractionResponseMessage::new()
            .content(err.user_message())
            .ephemeral(true),
    };

    if let Err(e) = command
        .create_response(&ctx.http, CreateInteractionResponse::Message(message))
        .await
    {
        tracing::error!("Failed to respond to /{}: {:?}", command.data.name, e);
    }
}

async fn run_command(state: &AppState, command: &CommandInteraction) -> Result<String, AppError> {
    let Some(guild_id) = command.guild_id else {
        return Err(GameError::invalid("The casino is only open inside a server.").into());
    };

    if command.data.name == "gamechannel" && !can_manage_guild(command) {
        return Err(GameError::invalid("You need the Manage Server permission.").into());
    }

    let ctx = PlayContext::new(
        command.user.id.get(),
        guild_id.get(),
        command.channel_id.get(),
    );

    dispatch(
        state,
        ctx,
        &command.data.name,
        Options::new(command.data.options()),
    )
    .await
}

fn can_manage_guild(command: &CommandInteraction) -> bool {
    command
        .member
        .as_ref()
        .and_then(|member| member.permissions)
        .is_some_and(|permissions| permissions.manage_guild())
}
