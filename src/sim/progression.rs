//! Progression tracking: score, difficulty, lives, game over and reset

use super::state::{Difficulty, GamePhase, GameState, PauseReason, RenderCommand};
use super::wave::spawn_wave;
use crate::tuning::Tuning;

/// Banner shown before the first start
pub const TITLE_BANNER: &str = "Space Invader\nInstructions:\n1.Arrow keys to move\n2.Space bar to shoot\n\nClick anywhere to start";

/// Banner shown after the last life is lost
pub fn game_over_banner(score: u64) -> String {
    format!("Game Over!\nYour score: {score}\n\nClick anywhere to restart")
}

/// Add `base` points scaled by the current multiplier
pub fn award(state: &mut GameState, base: u32) -> u64 {
    let points = state.difficulty.scale_points(base);
    state.score += points;
    state.emit(RenderCommand::Score(state.score));
    points
}

/// Restore lives and positions and put a fresh wave in place.
///
/// Score and difficulty are left alone.
pub fn reset_run(state: &mut GameState) {
    state.lives.revive_all();
    state.enemies.deactivate_all();
    state.player_bullets.deactivate_all();
    state.enemy_bullets.deactivate_all();
    spawn_wave(state);
    state.player.revive();
    state.emit(RenderCommand::Lives(state.lives_remaining()));
}

/// End the run: show the score banner, pause, and reset for the next start
pub fn game_over(state: &mut GameState, tuning: &Tuning) {
    state.game_overs += 1;
    state.phase = GamePhase::Paused(PauseReason::GameOver);
    log::info!(
        "Game over #{} - score {}, multiplier {:.1}",
        state.game_overs,
        state.score,
        state.multiplier()
    );

    state.emit(RenderCommand::GameOver { score: state.score });
    state.emit(RenderCommand::Banner {
        text: game_over_banner(state.score),
        visible: true,
    });

    if tuning.reset_progress_on_game_over {
        state.score = 0;
        state.difficulty = Difficulty::default();
        state.emit(RenderCommand::Score(0));
    }

    reset_run(state);
}
