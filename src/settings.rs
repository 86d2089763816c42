//! Game configuration and tuning
//!
//! Persisted separately from the record in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Simulation tuning (geometry, speeds, AI behaviour)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Play field width in pixels
    pub field_width: f32,
    /// Play field height in pixels
    pub field_height: f32,
    pub paddle_width: f32,
    pub paddle_height: f32,
    pub ball_radius: f32,
    /// Serve speed and base of the return speed formula (pixels/frame)
    pub base_speed: f32,
    /// Vertical speed at serve (pixels/frame)
    pub serve_vertical_speed: f32,
    /// Phase 1 AI smoothing factor (0 = frozen, 1 = perfect)
    pub ai_smoothing: f32,
    /// Rallies needed to clear phase 1
    pub goal_rallies: u32,
    /// Phase 2 speed added every frame
    pub growth_per_frame: f32,
    /// Phase 2 speed added on every player return
    pub growth_per_hit: f32,
    /// Phase 2 rally counter ceiling
    pub rally_cap: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,
            paddle_width: PADDLE_WIDTH,
            paddle_height: PADDLE_HEIGHT,
            ball_radius: BALL_RADIUS,
            base_speed: BALL_BASE_SPEED,
            serve_vertical_speed: BALL_SERVE_VERTICAL_SPEED,
            ai_smoothing: AI_SMOOTHING,
            goal_rallies: PHASE1_GOAL_RALLIES,
            growth_per_frame: PHASE2_GROWTH_PER_FRAME,
            growth_per_hit: PHASE2_GROWTH_PER_HIT,
            rally_cap: PHASE2_RALLY_CAP,
        }
    }
}

impl Tuning {
    /// Paddle top edge that centers a paddle vertically
    pub fn paddle_center_y(&self) -> f32 {
        self.field_height / 2.0 - self.paddle_height / 2.0
    }
}

/// Confetti timing and population limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfettiConfig {
    /// Milliseconds between two emitted particles
    pub interval_ms: f64,
    /// Length of the emission window in milliseconds
    pub duration_ms: f64,
    /// Maximum live particles (oldest dropped first)
    pub max_particles: usize,
}

impl Default for ConfettiConfig {
    fn default() -> Self {
        Self {
            interval_ms: 100.0,
            duration_ms: 3000.0,
            max_particles: 200,
        }
    }
}

/// Game configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub tuning: Tuning,
    pub confetti: ConfettiConfig,
    /// Leaderboard endpoint (read and write)
    pub leaderboard_url: String,
    /// Coupon revealed after clearing phase 1
    pub coupon_code: String,
    /// Rows shown on the leaderboard
    pub leaderboard_size: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tuning: Tuning::default(),
            confetti: ConfettiConfig::default(),
            leaderboard_url: "https://script.google.com/macros/s/AKfycbw5t4hzA-66vvYPHDzklvbrNO7nOYAbGx9uYrguoVjKll6wclU3DBo3TEZxSm5lpeJp/exec".to_string(),
            coupon_code: "RALLY10".to_string(),
            leaderboard_size: LEADERBOARD_SIZE,
        }
    }
}

impl GameConfig {
    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "rally_pong_config";

    /// Parse a (possibly partial) JSON override; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load config from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(config) => {
                        log::info!("Loaded config from LocalStorage");
                        return config;
                    }
                    Err(e) => log::warn!("Ignoring stored config: {}", e),
                }
            }
        }

        log::info!("Using default config");
        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
