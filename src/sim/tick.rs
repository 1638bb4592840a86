//! Per-frame simulation tick
//!
//! The host calls [`RulesEngine::tick`] once per display frame. All rules run
//! synchronously in a fixed order:
//! background scroll → pause handling → bullet motion → player movement →
//! formation descent → player fire → enemy fire → boundary breach →
//! player bullets × enemies → enemy bullets × player → enemies × player.

use super::collision::{AabbOverlap, Body, BodyKind, Overlap};
use super::combat::{
    expire_kill_effects, fire_enemy_bullet, fire_player_bullet, resolve_enemy_bullet_vs_player,
    resolve_enemy_vs_player, resolve_player_bullet_vs_enemy,
};
use super::pool::SlotId;
use super::progression::{self, TITLE_BANNER};
use super::state::{GamePhase, GameState, Millis, PauseReason, RenderCommand};
use super::wave::{advance_wave, check_boundary_breach};
use crate::consts::*;
use crate::in_world;
use crate::tuning::Tuning;

/// Longest physics step taken in one tick (host stalls)
const MAX_STEP_SECS: f32 = 0.1;

/// Pause control labels
pub const PAUSE_LABEL: &str = "Pause";
pub const RESUME_LABEL: &str = "Resume";

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Left arrow held
    pub left: bool,
    /// Right arrow held
    pub right: bool,
    /// Fire button held
    pub fire: bool,
    /// Start/unpause signal (edge-triggered: click/tap)
    pub start: bool,
    /// Pause control pressed (edge-triggered)
    pub pause: bool,
    /// Idle/demo mode - autopilot steers and fires
    pub idle_mode: bool,
}

/// Rules engine owned by the host loop
#[derive(Debug, Clone)]
pub struct RulesEngine {
    state: GameState,
    tuning: Tuning,
    overlap: AabbOverlap,
    last_now: Option<Millis>,
}

impl RulesEngine {
    /// Allocate all pools and the first wave. The run starts paused on the
    /// title banner.
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        let overlap = AabbOverlap::from_tuning(&tuning);
        Self {
            state: GameState::new(seed),
            tuning,
            overlap,
            last_now: None,
        }
    }

    /// Anchor the clock and return the initial HUD/banner commands
    pub fn init(&mut self, now: Millis) -> Vec<RenderCommand> {
        self.last_now = Some(now);
        self.queue_intro();
        self.state.drain_commands()
    }

    /// Throw the run away and start over from a fresh state
    pub fn restart(&mut self, seed: u64) -> Vec<RenderCommand> {
        log::info!("Restarting with seed {}", seed);
        self.state = GameState::new(seed);
        self.queue_intro();
        self.state.drain_commands()
    }

    fn queue_intro(&mut self) {
        let state = &mut self.state;
        state.emit(RenderCommand::Score(state.score));
        state.emit(RenderCommand::Lives(state.lives_remaining()));
        state.emit(RenderCommand::PauseLabel(PAUSE_LABEL));
        state.emit(RenderCommand::Banner {
            text: TITLE_BANNER.to_string(),
            visible: true,
        });
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Advance one frame using the built-in hitbox overlap test
    pub fn tick(&mut self, now: Millis, input: &TickInput) -> Vec<RenderCommand> {
        let elapsed = self.elapsed_since_last(now);
        tick(&mut self.state, &self.tuning, input, elapsed, &self.overlap);
        self.state.drain_commands()
    }

    /// Advance one frame using a host-supplied overlap test
    pub fn tick_with(
        &mut self,
        now: Millis,
        input: &TickInput,
        overlap: &impl Overlap,
    ) -> Vec<RenderCommand> {
        let elapsed = self.elapsed_since_last(now);
        tick(&mut self.state, &self.tuning, input, elapsed, overlap);
        self.state.drain_commands()
    }

    fn elapsed_since_last(&mut self, now: Millis) -> Millis {
        let elapsed = match self.last_now {
            Some(last) => now.saturating_sub(last),
            None => {
                self.queue_intro();
                0
            }
        };
        self.last_now = Some(now);
        elapsed
    }

    /// Restore lives, bullets, wave and ship. Score and difficulty stay.
    pub fn reset_run(&mut self) -> Vec<RenderCommand> {
        progression::reset_run(&mut self.state);
        self.state.drain_commands()
    }

    // Pair handlers for hosts running their own collision detection

    pub fn resolve_player_bullet_vs_enemy(&mut self, bullet: SlotId, enemy: SlotId) -> bool {
        resolve_player_bullet_vs_enemy(&mut self.state, &self.tuning, bullet, enemy)
    }

    pub fn resolve_enemy_bullet_vs_player(&mut self, bullet: SlotId) -> bool {
        resolve_enemy_bullet_vs_player(&mut self.state, &self.tuning, bullet)
    }

    pub fn resolve_enemy_vs_player(&mut self, enemy: SlotId) -> bool {
        resolve_enemy_vs_player(&mut self.state, &self.tuning, enemy)
    }

    /// Commands produced by pair handlers since the last tick
    pub fn take_commands(&mut self) -> Vec<RenderCommand> {
        self.state.drain_commands()
    }
}

/// Advance the game state by one frame. `elapsed_ms` is host time since the
/// previous tick; it only reaches the play clock while playing.
pub fn tick(
    state: &mut GameState,
    tuning: &Tuning,
    input: &TickInput,
    elapsed_ms: Millis,
    overlap: &impl Overlap,
) {
    // Background scrolls unconditionally
    state.background_offset += tuning.background_scroll;
    state.emit(RenderCommand::ScrollBackground {
        offset: state.background_offset,
    });

    match state.phase {
        GamePhase::Paused(reason) => {
            if input.start {
                resume(state, reason);
            }
            return;
        }
        GamePhase::Playing => {
            if input.pause {
                state.phase = GamePhase::Paused(PauseReason::Manual);
                state.emit(RenderCommand::PauseLabel(RESUME_LABEL));
                log::info!("Paused at clock {}", state.clock);
                return;
            }
        }
    }

    state.clock += elapsed_ms;
    let dt = (elapsed_ms as f32 / 1000.0).min(MAX_STEP_SECS);

    let input = if input.idle_mode {
        autopilot(state)
    } else {
        input.clone()
    };

    move_bullets(state, dt);

    if state.player.alive {
        move_player(state, tuning, &input, dt);
        advance_wave(state, dt * 1000.0 / FRAME_MS);

        if input.fire {
            fire_player_bullet(state, tuning);
        }
        fire_enemy_bullet(state, tuning);
    }

    check_boundary_breach(state);
    resolve_collisions(state, tuning, overlap);
    expire_kill_effects(state);
}

fn resume(state: &mut GameState, reason: PauseReason) {
    state.phase = GamePhase::Playing;
    state.emit(RenderCommand::Banner {
        text: String::new(),
        visible: false,
    });
    state.emit(RenderCommand::PauseLabel(PAUSE_LABEL));
    log::info!("Playing ({:?} -> Playing)", reason);
}

fn move_player(state: &mut GameState, tuning: &Tuning, input: &TickInput, dt: f32) {
    let vx = if input.left {
        -tuning.player_speed
    } else if input.right {
        tuning.player_speed
    } else {
        0.0
    };
    let half_width = tuning.player_hitbox.width / 2.0;

    let player = &mut state.player;
    player.vel.x = vx;
    player.vel.y = 0.0;
    player.pos.x = (player.pos.x + vx * dt).clamp(half_width, WORLD_WIDTH - half_width);
}

/// Integrate both bullet pools and drop bullets that left the world
fn move_bullets(state: &mut GameState, dt: f32) {
    for pool in [&mut state.player_bullets, &mut state.enemy_bullets] {
        for (_, bullet) in pool.iter_active_mut() {
            bullet.step(dt);
        }
        pool.retain_active(|b| in_world(b.pos));
    }
}

/// Run the three overlap passes, each pair at most once
fn resolve_collisions(state: &mut GameState, tuning: &Tuning, overlap: &impl Overlap) {
    // Player bullets × enemies
    for bullet in state.player_bullets.active_ids() {
        if !state.phase.is_playing() {
            return;
        }
        let Some(bullet_pos) = state.player_bullets.get(bullet).map(|b| b.pos) else {
            continue;
        };
        let bullet_body = Body::new(BodyKind::PlayerBullet, bullet_pos);

        for enemy in state.enemies.active_ids() {
            let Some(enemy_pos) = state
                .enemies
                .get(enemy)
                .map(|e| e.position(&state.formation))
            else {
                continue;
            };
            if overlap.overlaps(&bullet_body, &Body::new(BodyKind::Enemy, enemy_pos)) {
                resolve_player_bullet_vs_enemy(state, tuning, bullet, enemy);
                break;
            }
        }
    }

    // Enemy bullets × player
    for bullet in state.enemy_bullets.active_ids() {
        if !state.phase.is_playing() || !state.player.alive {
            return;
        }
        let player_body = Body::new(BodyKind::Player, state.player.pos);
        let Some(bullet_pos) = state.enemy_bullets.get(bullet).map(|b| b.pos) else {
            continue;
        };
        if overlap.overlaps(&player_body, &Body::new(BodyKind::EnemyBullet, bullet_pos)) {
            resolve_enemy_bullet_vs_player(state, tuning, bullet);
        }
    }

    // Enemies × player
    for enemy in state.enemies.active_ids() {
        if !state.phase.is_playing() || !state.player.alive {
            return;
        }
        let player_body = Body::new(BodyKind::Player, state.player.pos);
        let Some(enemy_pos) = state
            .enemies
            .get(enemy)
            .map(|e| e.position(&state.formation))
        else {
            continue;
        };
        if overlap.overlaps(&player_body, &Body::new(BodyKind::Enemy, enemy_pos)) {
            resolve_enemy_vs_player(state, tuning, enemy);
        }
    }
}

/// Demo-mode input: chase the lowest enemy nearest the ship and keep firing
pub fn autopilot(state: &GameState) -> TickInput {
    let ship_x = state.player.pos.x;
    let target = state.enemy_positions().max_by(|a, b| {
        a.y.total_cmp(&b.y)
            .then_with(|| (b.x - ship_x).abs().total_cmp(&(a.x - ship_x).abs()))
    });

    let mut input = TickInput {
        fire: true,
        ..Default::default()
    };
    if let Some(target) = target {
        // Small dead zone so the ship doesn't jitter under the target
        if target.x < ship_x - 4.0 {
            input.left = true;
        } else if target.x > ship_x + 4.0 {
            input.right = true;
        }
    }
    input
}
