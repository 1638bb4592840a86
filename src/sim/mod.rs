//! Rules engine
//!
//! All gameplay logic lives here. This module must stay free of rendering
//! and platform code:
//! - Seeded RNG only
//! - Stable iteration order (by slot index)
//! - Pools are allocated once and never grow

pub mod collision;
pub mod combat;
pub mod pool;
pub mod progression;
pub mod state;
pub mod tick;
pub mod wave;

pub use collision::{Aabb, AabbOverlap, Body, BodyKind, Overlap};
pub use pool::{Pool, SlotId};
pub use state::{
    Bullet, Difficulty, Enemy, Formation, GamePhase, GameState, KillEffect, LifeMarker, Millis,
    PauseReason, Player, RenderCommand,
};
pub use tick::{RulesEngine, TickInput, autopilot, tick};
