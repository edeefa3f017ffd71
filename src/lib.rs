//! Brick Run - a seeded roguelite Breakout engine
//!
//! Core modules:
//! - `sim`: Deterministic simulation (level generation, physics, entities)
//! - `progression`: Permanent meta-state and per-run records
//! - `persistence`: Key-value storage backends for the JSON records
//! - `session`: Run/level state machine, the only surface hosts talk to
//! - `highscores`: Leaderboard of finished runs
//! - `settings`: Host preferences
//!
//! Rendering, input wiring and frame scheduling live outside this crate.
//! Hosts call [`Session::tick`] once per frame and draw from
//! [`Session::snapshot`].

pub mod autopilot;
pub mod error;
pub mod highscores;
pub mod persistence;
pub mod progression;
pub mod session;
pub mod settings;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use error::{PurchaseError, SessionError, StoreError};
pub use highscores::HighScores;
pub use progression::{MetaState, ProgressionStore, RunState, UpgradeKind};
pub use session::{RunPhase, Session, Snapshot};
pub use settings::Settings;
pub use sim::Difficulty;

/// Game configuration constants
pub mod consts {
    /// Playfield dimensions
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;

    /// Paddle defaults
    pub const PADDLE_Y: f32 = 520.0;
    pub const PADDLE_HEIGHT: f32 = 16.0;
    pub const PADDLE_BASE_WIDTH: f32 = 100.0;
    /// Extra width per `paddleWidth` upgrade level
    pub const PADDLE_WIDTH_PER_LEVEL: f32 = 20.0;
    /// Horizontal movement per tick
    pub const PADDLE_SPEED: f32 = 8.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 8.0;
    /// Gap between a glued ball and the paddle top
    pub const BALL_GLUE_GAP: f32 = 2.0;
    /// Launch speed, also the horizontal scale of paddle deflection
    pub const BALL_BASE_SPEED: f32 = 5.0;
    /// Hard cap on ball speed (units per tick)
    pub const BALL_MAX_SPEED: f32 = 9.0;

    /// Brick grid
    pub const BRICK_COLUMNS: usize = 10;
    pub const BRICK_PADDING: f32 = 4.0;
    pub const BRICK_HEIGHT: f32 = 20.0;
    pub const BRICK_TOP_OFFSET: f32 = 60.0;

    /// Score awarded per point of max hp on a destroyed brick
    pub const SCORE_PER_BRICK_HP: u64 = 10;
    /// Currency credited per level index on level clear
    pub const CURRENCY_PER_LEVEL: u64 = 10;

    /// Lives at run start before upgrades
    pub const BASE_LIVES: u32 = 3;
}
