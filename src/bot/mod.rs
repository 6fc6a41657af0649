//! Discord adapter.
//!
//! A thin serenity layer over the services: it registers slash commands, turns each
//! command interaction into a service call and replies with plain text. Crash round
//! announcements arrive on a channel from `CrashService` and are posted by
//! [`announce::announce_crash_events`].
//!
//! # Gateway Intents
//!
//! Only `GUILDS` is needed. Slash commands arrive as interactions, which are delivered
//! regardless of intents.

pub mod announce;
pub mod command;
pub mod handler;
pub mod start;
