use serenity::all::{Client, GatewayIntents};

use crate::{bot::handler::Handler, config::Config, error::AppError, state::AppState};

/// Builds the Discord client without connecting.
///
/// The caller can take `client.http` for tasks that post outside of interactions before
/// handing the client to [`start_bot`].
///
/// # Arguments
/// - `config` - Application configuration holding the bot token
/// - `state` - Shared state the event handler dispatches into
///
/// # Returns
/// - `Ok(Client)` - Client ready to start
/// - `Err(AppError::DiscordErr)` - Client could not be built
pub async fn init_bot(config: &Config, state: AppState) -> Result<Client, AppError> {
    let intents = GatewayIntents::GUILDS;

    let client = Client::builder(&config.discord_bot_token, intents)
        .event_handler(Handler::new(state))
        .await?;

    Ok(client)
}

/// Connects to the gateway and runs until the connection ends.
///
/// Should be called from within a `tokio::spawn` task.
pub async fn start_bot(mut client: Client) -> Result<(), AppError> {
    tracing::info!("Starting Discord bot...");

    client.start().await?;

    Ok(())
}
