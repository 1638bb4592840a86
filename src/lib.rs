//! Invaders - rules engine for a single-screen arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic rules engine (waves, combat, progression)
//! - `tuning`: Data-driven game balance

pub mod sim;
pub mod tuning;

pub use sim::{RenderCommand, RulesEngine, TickInput};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// World (canvas) dimensions
    pub const WORLD_WIDTH: f32 = 600.0;
    pub const WORLD_HEIGHT: f32 = 800.0;

    /// Reference frame length used to scale per-frame motion (60 Hz)
    pub const FRAME_MS: f32 = 1000.0 / 60.0;

    /// Player spawn point (center of the ship)
    pub const PLAYER_SPAWN_X: f32 = WORLD_WIDTH / 2.0;
    pub const PLAYER_SPAWN_Y: f32 = WORLD_HEIGHT - 100.0;

    /// Enemy grid layout
    pub const GRID_COLS: u8 = 20;
    pub const GRID_ROWS: u8 = 10;
    pub const GRID_SPACING: f32 = 20.0;
    pub const WAVE_SIZE: usize = GRID_COLS as usize * GRID_ROWS as usize;

    /// Formation origin at wave spawn
    pub const FORMATION_START_X: f32 = 10.0;
    pub const FORMATION_START_Y: f32 = 10.0;
    /// Downward shift per frame at multiplier 1.0
    pub const FORMATION_DESCENT_PER_FRAME: f32 = 0.2;
    /// Formation y offset beyond which the wave is considered to have breached
    pub const BREACH_Y: f32 = 800.0;

    /// Horizontal sweep: origin x travels to this value and back
    pub const SWEEP_TARGET_X: f32 = 200.0;
    /// One sweep leg at multiplier 1.0
    pub const SWEEP_LEG_MS: f32 = 2000.0;
    /// Yoyo repeats after the first cycle
    pub const SWEEP_REPEATS: u32 = 1000;

    /// Difficulty
    pub const DIFFICULTY_STEP: f32 = 0.2;

    /// Scoring (multiplied by the difficulty multiplier)
    pub const KILL_SCORE: u32 = 20;
    pub const WAVE_CLEAR_BONUS: u32 = 1000;

    /// Pool sizes
    pub const BULLET_POOL_SIZE: usize = 30;
    pub const KILL_EFFECT_POOL_SIZE: usize = 30;
    pub const STARTING_LIVES: usize = 3;

    /// Life marker HUD layout
    pub const LIFE_MARKER_X: f32 = 25.0;
    pub const LIFE_MARKER_SPACING: f32 = 35.0;
    pub const LIFE_MARKER_Y: f32 = 80.0;
}

/// Position of the i-th life marker in the HUD
#[inline]
pub fn life_marker_position(index: usize) -> Vec2 {
    Vec2::new(
        consts::LIFE_MARKER_X + index as f32 * consts::LIFE_MARKER_SPACING,
        consts::LIFE_MARKER_Y,
    )
}

/// True if `pos` lies inside the world rectangle
#[inline]
pub fn in_world(pos: Vec2) -> bool {
    pos.x >= 0.0 && pos.x <= consts::WORLD_WIDTH && pos.y >= 0.0 && pos.y <= consts::WORLD_HEIGHT
}
