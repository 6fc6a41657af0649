//! Cron jobs.

pub mod session_expiry;
