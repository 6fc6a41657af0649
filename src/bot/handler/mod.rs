use serenity::all::{Context, EventHandler, Interaction, Ready};
use serenity::async_trait;

use crate::state::AppState;

pub mod interaction;
pub mod ready;

/// Discord bot event handler
pub struct Handler {
    pub state: AppState,
}

impl Handler {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl EventHandler for Handler {
    /// Called when the bot is ready and connected to Discord
    async fn ready(&self, ctx: Context, ready: Ready) {
        ready::handle_ready(ctx, ready).await;
    }

    /// Called for every slash command, button press or autocomplete request
    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        interaction::handle_interaction(&self.state, ctx, interaction).await;
    }
}
