//! Shared application state.
//!
//! `AppState` is built once in `main` and cloned into the bot handler and the scheduler.
//! Every field is cheap to clone: the database handle is a pool and the session stores
//! and crash service share their tables through `Arc`.

use std::time::Duration;

use sea_orm::DatabaseConnection;
use tokio::sync::mpsc::UnboundedSender;

use crate::{
    config::Config,
    engine::{
        blackjack::BlackjackGame,
        hilo::HiLoGame,
        minesweeper::MinesweeperGame,
        rps::{Challenge, SoloRound},
    },
    model::game::GameKind,
    service::{
        crash::{CrashEvent, CrashService},
        rps::RpsCooldowns,
    },
    session::SessionStore,
};

/// Inactivity window for blackjack, minesweeper and hi-lo.
pub const TURN_BASED_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const RPS_SOLO_TTL: Duration = Duration::from_secs(5 * 60);
pub const RPS_CHALLENGE_TTL: Duration = Duration::from_secs(2 * 60);

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,

    pub daily_reward: i64,
    pub refund_expired_bets: bool,

    pub blackjack: SessionStore<BlackjackGame>,
    pub minesweeper: SessionStore<MinesweeperGame>,
    pub hilo: SessionStore<HiLoGame>,
    pub rps_solo: SessionStore<SoloRound>,
    pub rps_challenges: SessionStore<Challenge>,
    pub rps_cooldowns: RpsCooldowns,

    pub crash: CrashService,
}

impl AppState {
    /// Creates empty session stores and the crash service.
    ///
    /// # Arguments
    /// - `db` - Database connection pool
    /// - `config` - Economy settings
    /// - `crash_events` - Where crash round announcements are sent, if anywhere
    pub fn new(
        db: DatabaseConnection,
        config: &Config,
        crash_events: Option<UnboundedSender<CrashEvent>>,
    ) -> Self {
        Self {
            crash: CrashService::new(db.clone(), crash_events),
            db,
            daily_reward: config.daily_reward,
            refund_expired_bets: config.refund_expired_bets,
            blackjack: SessionStore::new(GameKind::Blackjack.as_str(), TURN_BASED_TTL),
            minesweeper: SessionStore::new(GameKind::Minesweeper.as_str(), TURN_BASED_TTL),
            hilo: SessionStore::new(GameKind::HiLo.as_str(), TURN_BASED_TTL),
            rps_solo: SessionStore::new(GameKind::Rps.as_str(), RPS_SOLO_TTL),
            rps_challenges: SessionStore::new("rps-challenge", RPS_CHALLENGE_TTL),
            rps_cooldowns: RpsCooldowns::new(),
        }
    }
}
