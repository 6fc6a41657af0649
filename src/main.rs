mod bot;
mod config;
mod data;
mod engine;
mod error;
mod model;
mod scheduler;
mod service;
mod session;
mod startup;
mod state;
mod util;

use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use crate::{
    bot::{announce, start},
    config::Config,
    error::{internal::InternalError, AppError},
    scheduler::session_expiry,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    let db = startup::connect_to_database(&config).await?;

    let (crash_events, crash_announcements) = mpsc::unbounded_channel();
    let state = AppState::new(db, &config, Some(crash_events));

    let mut scheduler = session_expiry::start_scheduler(state.clone()).await?;

    // Initialize Discord bot and share its HTTP client with the crash announcer
    let client = start::init_bot(&config, state.clone()).await?;
    tokio::spawn(announce::announce_crash_events(
        client.http.clone(),
        crash_announcements,
    ));

    let bot = tokio::spawn(async move {
        if let Err(e) = start::start_bot(client).await {
            tracing::error!("Discord bot error: {}", e);
        }
    });

    tokio::signal::ctrl_c()
        .await
        .map_err(InternalError::SignalHandler)?;
    tracing::info!("Shutting down");

    bot.abort();
    scheduler.shutdown().await?;
    state.crash.shutdown().await?;

    Ok(())
}
