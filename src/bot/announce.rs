//! Posts crash round announcements to the channel each table was opened in.

use std::sync::Arc;

use serenity::all::{ChannelId, Http};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::service::crash::CrashEvent;

/// Forwards crash events to Discord until the sending side is dropped.
pub async fn announce_crash_events(http: Arc<Http>, mut events: UnboundedReceiver<CrashEvent>) {
    while let Some(event) = events.recv().await {
        let channel_id = match &event {
            CrashEvent::Started { channel_id, .. } | CrashEvent::Crashed { channel_id, .. } => {
                *channel_id
            }
        };

        if let Err(e) = ChannelId::new(channel_id).say(&http, describe(&event)).await {
            tracing::error!("Failed to post crash announcement: {:?}", e);
        }
    }
}

fn describe(event: &CrashEvent) -> String {
    match event {
        CrashEvent::Started { players, .. } => format!(
            "🚀 Crash round started with {players} player(s)! Use `/crash cashout` before it crashes."
        ),
        CrashEvent::Crashed {
            crash_point,
            cashed_out,
            losers,
            ..
        } => {
            let mut lines = vec![format!("💥 Crashed at **{crash_point:.2}x**!")];
            for (user_id, multiplier, payout) in cashed_out {
                lines.push(format!("<@{user_id}> cashed out at {multiplier:.2}x for {payout}"));
            }
            for (user_id, bet) in losers {
                lines.push(format!("<@{user_id}> lost {bet}"));
            }
            lines.join("\n")
        }
    }
}
