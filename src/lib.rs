//! Rally Pong - A two-phase paddle rally game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (ball/paddle physics, round outcomes)
//! - `controller`: Maps UI signals and simulation events to driver commands
//! - `ranking`: Online leaderboard client with offline fallback
//! - `confetti`: Celebration particle effect
//! - `renderer`: 2D drawing surface abstraction
//! - `platform`: Frame loop scheduling
//! - `persistence`: Key-value score store
//! - `settings`: Data-driven game tuning

pub mod confetti;
pub mod controller;
pub mod error;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod ranking;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use controller::{Command, GameController};
pub use error::{RankingError, StartError, StoreError, TransportError};
pub use highscores::RecordEntry;
pub use settings::{ConfettiConfig, GameConfig, Tuning};

/// Game configuration constants
pub mod consts {
    /// Default play field dimensions (pixels)
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 500.0;

    /// Paddle geometry
    pub const PADDLE_WIDTH: f32 = 40.0;
    pub const PADDLE_HEIGHT: f32 = 100.0;
    /// Extra reach in front of the player paddle that still counts as contact
    pub const PADDLE_CONTACT_SLACK: f32 = 2.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 20.0;
    /// Horizontal serve speed and base of every return speed (pixels/frame)
    pub const BALL_BASE_SPEED: f32 = 5.0;
    /// Vertical serve speed (pixels/frame)
    pub const BALL_SERVE_VERTICAL_SPEED: f32 = 3.0;

    /// Player returns grazing a wall closer than this are ignored
    pub const WALL_CONTACT_MARGIN: f32 = 5.0;
    /// Maximum bounce angle at the paddle edges (radians)
    pub const MAX_BOUNCE_ANGLE: f32 = std::f32::consts::FRAC_PI_4;

    /// Phase 1 rally target
    pub const PHASE1_GOAL_RALLIES: u32 = 10;
    /// Phase 1 AI smoothing factor per frame
    pub const AI_SMOOTHING: f32 = 0.1;
    /// Phase 2 rally counter ceiling
    pub const PHASE2_RALLY_CAP: u32 = 9999;
    /// Phase 2 speed growth per frame
    pub const PHASE2_GROWTH_PER_FRAME: f32 = 0.05;
    /// Phase 2 speed growth per player return
    pub const PHASE2_GROWTH_PER_HIT: f32 = 1.0;

    /// Number of leaderboard rows shown
    pub const LEADERBOARD_SIZE: usize = 10;
    /// Number of cached leaderboard entries used for placement checks
    pub const PODIUM_SIZE: usize = 3;
}

/// Clamp a paddle's top edge so the paddle stays inside the field
#[inline]
pub fn clamp_paddle_y(y: f32, field_height: f32, paddle_height: f32) -> f32 {
    y.clamp(0.0, (field_height - paddle_height).max(0.0))
}
