//! Combat resolution: firing cadence and collision outcomes
//!
//! Every handler is a silent no-op when its entities are inactive or the run
//! is not playing, so a host may report stale pairs without harm.

use glam::Vec2;
use rand::Rng;

use super::pool::SlotId;
use super::progression::{award, game_over};
use super::state::{Bullet, GameState, KillEffect, RenderCommand};
use super::wave::check_wave_cleared;
use crate::consts::KILL_SCORE;
use crate::tuning::Tuning;

/// Fire from the ship if the cooldown has elapsed (inclusive) and a bullet
/// slot is free
pub fn fire_player_bullet(state: &mut GameState, tuning: &Tuning) -> Option<SlotId> {
    let now = state.clock;
    if now < state.player_fire_at {
        return None;
    }

    let Some(id) = state.player_bullets.acquire_inactive() else {
        log::trace!("Player bullet pool exhausted");
        return None;
    };
    state.player_bullets.activate(
        id,
        Bullet {
            pos: state.player.pos,
            vel: Vec2::new(0.0, -tuning.player_bullet_speed),
        },
    );
    state.player_fire_at = now + tuning.player_fire_delay_ms;
    Some(id)
}

/// Enemy cooldown check. The delay is divided by the current multiplier, so
/// higher difficulty fires sooner.
pub fn enemy_fire_ready(state: &GameState, tuning: &Tuning) -> bool {
    match state.enemy_fired_at {
        None => true,
        Some(last) => {
            let delay = tuning.enemy_fire_delay_ms as f64 / state.multiplier() as f64;
            state.clock as f64 >= last as f64 + delay
        }
    }
}

/// Fire from a random living enemy toward the player
pub fn fire_enemy_bullet(state: &mut GameState, tuning: &Tuning) -> Option<SlotId> {
    if !enemy_fire_ready(state, tuning) {
        return None;
    }

    let Some(id) = state.enemy_bullets.acquire_inactive() else {
        log::trace!("Enemy bullet pool exhausted");
        return None;
    };
    let living = state.enemies.active_ids();
    if living.is_empty() {
        return None;
    }

    let pick = state.rng.random_range(0..living.len());
    let shooter = state.enemies.get(living[pick])?.position(&state.formation);
    let aim = (state.player.pos - shooter).normalize_or_zero();
    state.enemy_bullets.activate(
        id,
        Bullet {
            pos: shooter,
            vel: aim * tuning.enemy_bullet_speed,
        },
    );
    state.enemy_fired_at = Some(state.clock);
    Some(id)
}

/// Player bullet hit an enemy: both die, points are scored, and the wave is
/// replaced if that was the last enemy
pub fn resolve_player_bullet_vs_enemy(
    state: &mut GameState,
    tuning: &Tuning,
    bullet: SlotId,
    enemy: SlotId,
) -> bool {
    if !state.phase.is_playing() || !state.player_bullets.is_active(bullet) {
        return false;
    }
    let Some(pos) = state
        .enemies
        .get(enemy)
        .map(|e| e.position(&state.formation))
    else {
        return false;
    };

    state.player_bullets.deactivate(bullet);
    state.enemies.deactivate(enemy);
    spawn_kill_effect(state, tuning, pos);
    award(state, KILL_SCORE);
    check_wave_cleared(state);
    true
}

/// Enemy bullet hit the ship
pub fn resolve_enemy_bullet_vs_player(state: &mut GameState, tuning: &Tuning, bullet: SlotId) -> bool {
    if !can_hit_player(state) || !state.enemy_bullets.deactivate(bullet) {
        return false;
    }
    player_got_hit(state, tuning);
    true
}

/// Enemy rammed the ship. Does not count toward clearing the wave.
pub fn resolve_enemy_vs_player(state: &mut GameState, tuning: &Tuning, enemy: SlotId) -> bool {
    if !can_hit_player(state) || !state.enemies.deactivate(enemy) {
        return false;
    }
    player_got_hit(state, tuning);
    true
}

fn can_hit_player(state: &GameState) -> bool {
    state.phase.is_playing() && state.player.alive
}

/// Take one life marker; the last one ends the run
pub fn player_got_hit(state: &mut GameState, tuning: &Tuning) {
    if !can_hit_player(state) {
        return;
    }

    if let Some(marker) = state.lives.first_active() {
        state.lives.deactivate(marker);
        state.emit(RenderCommand::Lives(state.lives_remaining()));
    }

    let pos = state.player.pos;
    if state.lives.count_active() == 0 {
        state.player.alive = false;
        state.player.vel = Vec2::ZERO;
        state.player_bullets.deactivate_all();
        state.enemy_bullets.deactivate_all();
        game_over(state, tuning);
    }

    spawn_kill_effect(state, tuning, pos);
}

/// Start a kill animation; skipped when every effect slot is busy
pub fn spawn_kill_effect(state: &mut GameState, tuning: &Tuning, pos: Vec2) {
    let effect = KillEffect {
        pos,
        expires_at: state.clock + tuning.kill_effect_ms,
    };
    if state.kill_effects.spawn(effect).is_some() {
        state.emit(RenderCommand::KillEffect { pos });
    } else {
        log::debug!("No free kill effect at {:?}", pos);
    }
}

/// Free kill effects whose animation has finished
pub fn expire_kill_effects(state: &mut GameState) {
    let now = state.clock;
    state.kill_effects.retain_active(|e| e.expires_at > now);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::state::{GamePhase, PauseReason};

    fn playing_state() -> GameState {
        let mut state = GameState::new(4242);
        state.phase = GamePhase::Playing;
        state.drain_commands();
        state
    }

    fn loaded_bullet(state: &mut GameState) -> SlotId {
        state.player_bullets.spawn(Bullet::default()).unwrap()
    }

    #[test]
    fn test_player_cooldown_is_inclusive() {
        let tuning = Tuning::default();
        let mut state = playing_state();

        assert!(fire_player_bullet(&mut state, &tuning).is_some());
        assert_eq!(state.player_fire_at, 100);

        state.clock = 99;
        assert!(fire_player_bullet(&mut state, &tuning).is_none());

        state.clock = 100;
        assert!(fire_player_bullet(&mut state, &tuning).is_some());
        assert_eq!(state.player_bullets.count_active(), 2);
        assert_eq!(state.player_fire_at, 200);
    }

    #[test]
    fn test_player_bullet_leaves_ship_upward() {
        let tuning = Tuning::default();
        let mut state = playing_state();
        state.player.pos.x = 123.0;

        let id = fire_player_bullet(&mut state, &tuning).unwrap();
        let bullet = state.player_bullets.get(id).unwrap();
        assert_eq!(bullet.pos, Vec2::new(123.0, PLAYER_SPAWN_Y));
        assert_eq!(bullet.vel, Vec2::new(0.0, -500.0));
    }

    #[test]
    fn test_exhausted_pool_keeps_cooldown() {
        let tuning = Tuning::default();
        let mut state = playing_state();
        for _ in 0..BULLET_POOL_SIZE {
            loaded_bullet(&mut state);
        }
        state.clock = 500;

        assert!(fire_player_bullet(&mut state, &tuning).is_none());
        assert_eq!(state.player_fire_at, 0);
    }

    #[test]
    fn test_enemy_cooldown_scales_with_difficulty() {
        let tuning = Tuning::default();
        let mut state = playing_state();

        assert!(fire_enemy_bullet(&mut state, &tuning).is_some());
        assert_eq!(state.enemy_fired_at, Some(0));

        state.clock = 1999;
        assert!(fire_enemy_bullet(&mut state, &tuning).is_none());

        // 2000 / 1.2 ≈ 1666.7
        state.difficulty.raise();
        state.clock = 1666;
        assert!(!enemy_fire_ready(&state, &tuning));
        state.clock = 1667;
        assert!(fire_enemy_bullet(&mut state, &tuning).is_some());
        assert_eq!(state.enemy_fired_at, Some(1667));
    }

    #[test]
    fn test_enemy_cadence_holds_late_in_a_run() {
        let tuning = Tuning::default();
        let mut state = playing_state();
        state.difficulty.raise();
        state.clock = 60_000;

        assert!(fire_enemy_bullet(&mut state, &tuning).is_some());
        let mut shots = 0;
        for _ in 0..62 {
            state.clock += 16;
            if fire_enemy_bullet(&mut state, &tuning).is_some() {
                shots += 1;
            }
        }
        assert_eq!(shots, 0);
        assert_eq!(state.enemy_bullets.count_active(), 1);

        state.clock = 60_000 + 1667;
        assert!(fire_enemy_bullet(&mut state, &tuning).is_some());
    }

    #[test]
    fn test_enemy_bullet_aims_at_player() {
        let tuning = Tuning::default();
        let mut state = playing_state();

        let id = fire_enemy_bullet(&mut state, &tuning).unwrap();
        let bullet = state.enemy_bullets.get(id).unwrap().clone();
        assert!(state.enemy_positions().any(|p| p == bullet.pos));
        assert!((bullet.vel.length() - 100.0).abs() < 1e-3);

        let expected = (state.player.pos - bullet.pos).normalize() * 100.0;
        assert!((bullet.vel - expected).length() < 1e-3);
    }

    #[test]
    fn test_enemy_fire_needs_a_shooter() {
        let tuning = Tuning::default();
        let mut state = playing_state();
        state.enemies.deactivate_all();

        assert!(fire_enemy_bullet(&mut state, &tuning).is_none());
        assert_eq!(state.enemy_bullets.count_active(), 0);
        assert_eq!(state.enemy_fired_at, None);
    }

    #[test]
    fn test_kill_scores_and_spawns_effect() {
        let tuning = Tuning::default();
        let mut state = playing_state();
        let bullet = loaded_bullet(&mut state);
        let enemy = SlotId(5);
        let enemy_pos = state.enemies.get(enemy).unwrap().position(&state.formation);

        assert!(resolve_player_bullet_vs_enemy(&mut state, &tuning, bullet, enemy));
        assert_eq!(state.score, 20);
        assert!(!state.player_bullets.is_active(bullet));
        assert!(!state.enemies.is_active(enemy));
        assert_eq!(state.active_enemies(), WAVE_SIZE - 1);

        let commands = state.drain_commands();
        assert!(commands.contains(&RenderCommand::KillEffect { pos: enemy_pos }));
        assert!(commands.contains(&RenderCommand::Score(20)));

        // Stale pair is ignored
        assert!(!resolve_player_bullet_vs_enemy(&mut state, &tuning, bullet, enemy));
        assert_eq!(state.score, 20);
    }

    #[test]
    fn test_kill_uses_multiplier_at_time_of_kill() {
        let tuning = Tuning::default();
        let mut state = playing_state();
        state.difficulty.steps = 2;
        let bullet = loaded_bullet(&mut state);

        resolve_player_bullet_vs_enemy(&mut state, &tuning, bullet, SlotId(0));
        assert_eq!(state.score, 28);
    }

    #[test]
    fn test_clearing_full_wave_scores_5000() {
        let tuning = Tuning::default();
        let mut state = playing_state();
        state.enemy_bullets.spawn(Bullet::default());

        for slot in 0..WAVE_SIZE as u32 {
            let bullet = loaded_bullet(&mut state);
            assert!(resolve_player_bullet_vs_enemy(&mut state, &tuning, bullet, SlotId(slot)));
        }

        assert_eq!(state.score, 200 * 20 + 1000);
        assert!((state.multiplier() - 1.2).abs() < 1e-6);
        assert_eq!(state.enemy_bullets.count_active(), 0);
        assert_eq!(state.active_enemies(), WAVE_SIZE);
        assert_eq!(state.waves_spawned, 2);
        assert_eq!(state.lives_remaining(), 3);
    }

    #[test]
    fn test_three_hits_end_the_run_once() {
        let tuning = Tuning::default();
        let mut state = playing_state();

        for expected in [2u8, 1] {
            let bullet = state.enemy_bullets.spawn(Bullet::default()).unwrap();
            assert!(resolve_enemy_bullet_vs_player(&mut state, &tuning, bullet));
            assert_eq!(state.lives_remaining(), expected);
            assert!(state.phase.is_playing());
        }

        state.player_bullets.spawn(Bullet::default());
        let spare = state.enemy_bullets.spawn(Bullet::default()).unwrap();
        assert!(resolve_enemy_vs_player(&mut state, &tuning, SlotId(0)));

        assert_eq!(state.phase, GamePhase::Paused(PauseReason::GameOver));
        assert_eq!(state.game_overs, 1);
        assert_eq!(state.score, 0);
        assert_eq!(state.player_bullets.count_active(), 0);
        assert_eq!(state.enemy_bullets.count_active(), 0);
        let commands = state.drain_commands();
        let game_overs = commands
            .iter()
            .filter(|c| matches!(c, RenderCommand::GameOver { .. }))
            .count();
        assert_eq!(game_overs, 1);
        assert!(commands.contains(&RenderCommand::Lives(0)));

        // A late hit in the same frame changes nothing
        state.enemy_bullets.activate(spare, Bullet::default());
        assert!(!resolve_enemy_bullet_vs_player(&mut state, &tuning, spare));
        player_got_hit(&mut state, &tuning);
        assert_eq!(state.lives_remaining(), 3);
        assert_eq!(state.game_overs, 1);
    }

    #[test]
    fn test_ram_does_not_clear_wave() {
        let tuning = Tuning::default();
        let mut state = playing_state();
        for slot in 1..WAVE_SIZE as u32 {
            state.enemies.deactivate(SlotId(slot));
        }

        assert!(resolve_enemy_vs_player(&mut state, &tuning, SlotId(0)));
        assert_eq!(state.active_enemies(), 0);
        assert_eq!(state.score, 0);
        assert_eq!(state.waves_spawned, 1);
    }

    #[test]
    fn test_handlers_idle_while_paused() {
        let tuning = Tuning::default();
        let mut state = GameState::new(7);
        let bullet = loaded_bullet(&mut state);
        assert!(!resolve_player_bullet_vs_enemy(&mut state, &tuning, bullet, SlotId(0)));
        assert!(!resolve_enemy_vs_player(&mut state, &tuning, SlotId(0)));
        assert_eq!(state.active_enemies(), WAVE_SIZE);
        assert_eq!(state.lives_remaining(), 3);
    }

    #[test]
    fn test_kill_effects_expire_and_pool_is_bounded() {
        let tuning = Tuning::default();
        let mut state = playing_state();
        for _ in 0..KILL_EFFECT_POOL_SIZE + 5 {
            spawn_kill_effect(&mut state, &tuning, Vec2::ZERO);
        }
        assert_eq!(state.kill_effects.count_active(), KILL_EFFECT_POOL_SIZE);
        let shown = state
            .drain_commands()
            .iter()
            .filter(|c| matches!(c, RenderCommand::KillEffect { .. }))
            .count();
        assert_eq!(shown, KILL_EFFECT_POOL_SIZE);

        state.clock = tuning.kill_effect_ms - 1;
        expire_kill_effects(&mut state);
        assert_eq!(state.kill_effects.count_active(), KILL_EFFECT_POOL_SIZE);

        state.clock = tuning.kill_effect_ms;
        expire_kill_effects(&mut state);
        assert_eq!(state.kill_effects.count_active(), 0);
    }
}
