//! Wave manager
//!
//! Spawns the enemy grid, moves the formation, and replaces the wave when it
//! is cleared or breaches the bottom of the world.

use glam::Vec2;

use super::pool::SlotId;
use super::progression::award;
use super::state::{Enemy, Formation, GameState, Millis, RenderCommand};
use crate::consts::*;

/// (Re)populate every enemy slot with a full grid at the starting offset
pub fn spawn_wave(state: &mut GameState) {
    state.enemies.deactivate_all();

    let mut slot = 0u32;
    for col in 0..GRID_COLS {
        for row in 0..GRID_ROWS {
            state.enemies.activate(SlotId(slot), Enemy { col, row });
            slot += 1;
        }
    }

    // Sweep speed is fixed for the lifetime of the wave
    state.formation = Formation {
        origin: Vec2::new(FORMATION_START_X, FORMATION_START_Y),
        spawned_at: state.clock,
        sweep_leg_ms: SWEEP_LEG_MS / state.multiplier(),
    };

    state.waves_spawned += 1;
    log::info!(
        "Wave {} spawned (multiplier {:.1}, {} enemies)",
        state.waves_spawned,
        state.multiplier(),
        state.enemies.count_active()
    );
    state.emit(RenderCommand::WaveSpawned {
        wave: state.waves_spawned,
    });
}

/// Move the formation for one step. `dt_scale` is the elapsed time in
/// 60 Hz frames.
pub fn advance_wave(state: &mut GameState, dt_scale: f32) {
    state.formation.origin.y += FORMATION_DESCENT_PER_FRAME * state.multiplier() * dt_scale;
    state.formation.origin.x = sweep_x(&state.formation, state.clock);
}

/// Horizontal origin of the formation at clock `now`.
///
/// Linear back-and-forth between the start x and [`SWEEP_TARGET_X`],
/// repeating [`SWEEP_REPEATS`] times, then resting at the start.
pub fn sweep_x(formation: &Formation, now: Millis) -> f32 {
    let elapsed = now.saturating_sub(formation.spawned_at) as f32;
    let legs = elapsed / formation.sweep_leg_ms.max(1.0);
    let total_legs = 2.0 * (SWEEP_REPEATS as f32 + 1.0);
    if legs >= total_legs {
        return FORMATION_START_X;
    }

    let leg = legs.floor();
    let t = legs - leg;
    let span = SWEEP_TARGET_X - FORMATION_START_X;
    if (leg as u32) % 2 == 0 {
        FORMATION_START_X + span * t
    } else {
        SWEEP_TARGET_X - span * t
    }
}

/// Replace the wave if it has descended past [`BREACH_Y`].
/// Returns true if a new wave was spawned.
pub fn check_boundary_breach(state: &mut GameState) -> bool {
    if state.formation.origin.y <= BREACH_Y {
        return false;
    }

    log::info!(
        "Wave {} breached the boundary with {} enemies left",
        state.waves_spawned,
        state.active_enemies()
    );
    state.enemies.deactivate_all();
    state.difficulty.raise();
    spawn_wave(state);
    true
}

/// Award the clear bonus and replace the wave once no enemy is left.
/// Returns true if a new wave was spawned.
pub fn check_wave_cleared(state: &mut GameState) -> bool {
    if state.active_enemies() > 0 {
        return false;
    }

    award(state, WAVE_CLEAR_BONUS);
    log::info!(
        "Wave {} cleared, score {}",
        state.waves_spawned,
        state.score
    );
    state.difficulty.raise();
    state.enemy_bullets.deactivate_all();
    spawn_wave(state);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Bullet;

    #[test]
    fn test_spawn_fills_grid() {
        let mut state = GameState::new(3);
        state.enemies.deactivate_all();
        state.formation.origin = Vec2::new(123.0, 456.0);

        spawn_wave(&mut state);
        assert_eq!(state.active_enemies(), WAVE_SIZE);
        assert_eq!(state.formation.origin, Vec2::new(10.0, 10.0));

        let positions: Vec<Vec2> = state.enemy_positions().collect();
        assert_eq!(positions[0], Vec2::new(10.0, 10.0));
        assert_eq!(positions[WAVE_SIZE - 1], Vec2::new(10.0 + 19.0 * 20.0, 10.0 + 9.0 * 20.0));
    }

    #[test]
    fn test_descent_scales_with_difficulty() {
        let mut state = GameState::new(3);
        advance_wave(&mut state, 1.0);
        assert!((state.formation.origin.y - 10.2).abs() < 1e-4);

        state.difficulty.raise();
        advance_wave(&mut state, 2.0);
        assert!((state.formation.origin.y - (10.2 + 0.48)).abs() < 1e-4);
    }

    #[test]
    fn test_sweep_goes_out_and_back() {
        let formation = Formation::default();
        assert_eq!(sweep_x(&formation, 0), 10.0);
        assert!((sweep_x(&formation, 1000) - 105.0).abs() < 1e-3);
        assert!((sweep_x(&formation, 2000) - 200.0).abs() < 1e-3);
        assert!((sweep_x(&formation, 3000) - 105.0).abs() < 1e-3);
        assert!((sweep_x(&formation, 4000) - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_sweep_is_faster_on_later_waves() {
        let mut state = GameState::new(3);
        state.difficulty.steps = 5;
        spawn_wave(&mut state);
        assert!((state.formation.sweep_leg_ms - 1000.0).abs() < 1e-3);
        assert!((sweep_x(&state.formation, 1000) - 200.0).abs() < 1e-3);
    }

    #[test]
    fn test_sweep_stops_after_last_repeat() {
        let formation = Formation::default();
        let end = (2 * (SWEEP_REPEATS as u64 + 1)) * 2000;
        assert_eq!(sweep_x(&formation, end + 500), FORMATION_START_X);
    }

    #[test]
    fn test_breach_respawns_without_score() {
        let mut state = GameState::new(3);
        state.score = 140;
        state.enemies.deactivate(SlotId(0));
        state.formation.origin.y = 800.0;
        assert!(!check_boundary_breach(&mut state));

        state.formation.origin.y = 800.5;
        assert!(check_boundary_breach(&mut state));
        assert_eq!(state.score, 140);
        assert_eq!(state.difficulty.steps, 1);
        assert_eq!(state.active_enemies(), WAVE_SIZE);
        assert_eq!(state.formation.origin.y, FORMATION_START_Y);
        assert_eq!(state.waves_spawned, 2);
    }

    #[test]
    fn test_clear_awards_bonus_and_clears_enemy_bullets() {
        let mut state = GameState::new(3);
        assert!(!check_wave_cleared(&mut state));

        state.enemy_bullets.spawn(Bullet::default());
        state.enemy_bullets.spawn(Bullet::default());
        state.enemies.deactivate_all();

        assert!(check_wave_cleared(&mut state));
        assert_eq!(state.score, 1000);
        assert_eq!(state.difficulty.steps, 1);
        assert_eq!(state.enemy_bullets.count_active(), 0);
        assert_eq!(state.active_enemies(), WAVE_SIZE);
    }
}
