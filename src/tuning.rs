//! Game tuning and balance
//!
//! Loaded from a JSON file; every missing field falls back to the arcade
//! defaults, so a partial file only overrides what it names.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Hitbox size of a sprite (width, height in world units)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hitbox {
    pub width: f32,
    pub height: f32,
}

impl Hitbox {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Gameplay tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Player ===
    /// Horizontal ship speed (units/sec)
    pub player_speed: f32,
    /// Upward player bullet speed (units/sec)
    pub player_bullet_speed: f32,
    /// Minimum time between player shots (ms)
    pub player_fire_delay_ms: u64,

    // === Enemies ===
    /// Enemy bullet speed toward the player (units/sec)
    pub enemy_bullet_speed: f32,
    /// Base time between enemy shots (ms), divided by the difficulty multiplier
    pub enemy_fire_delay_ms: u64,

    // === Effects ===
    /// Kill-effect animation length (16 frames at 30 fps)
    pub kill_effect_ms: u64,
    /// Background scroll per tick, applied even while paused
    pub background_scroll: f32,

    // === Hitboxes ===
    pub player_hitbox: Hitbox,
    pub enemy_hitbox: Hitbox,
    pub player_bullet_hitbox: Hitbox,
    pub enemy_bullet_hitbox: Hitbox,

    // === Rules ===
    /// Reset score and difficulty when the run ends. Off by default: a run
    /// started after game over keeps both.
    pub reset_progress_on_game_over: bool,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player_speed: 200.0,
            player_bullet_speed: 500.0,
            player_fire_delay_ms: 100,

            enemy_bullet_speed: 100.0,
            enemy_fire_delay_ms: 2000,

            kill_effect_ms: 533,
            background_scroll: 3.0,

            player_hitbox: Hitbox::new(28.0, 21.0),
            enemy_hitbox: Hitbox::new(16.0, 16.0),
            player_bullet_hitbox: Hitbox::new(6.0, 14.0),
            enemy_bullet_hitbox: Hitbox::new(6.0, 14.0),

            reset_progress_on_game_over: false,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load tuning from a file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning from {}", path.display());
                    tuning
                }
                Err(e) => {
                    log::warn!("Invalid tuning file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read tuning file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}
