//! Invaders headless host
//!
//! Runs the rules engine at 60 Hz with the autopilot at the controls and
//! logs what a renderer would draw. Usage:
//!
//! ```text
//! invaders [tuning.json] [frames]
//! ```
//!
//! `INVADERS_SEED` picks the RNG seed.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::path::PathBuf;

    use invaders::{RenderCommand, RulesEngine, TickInput, Tuning};

    const FRAME_MS: u64 = 16;
    const DEFAULT_FRAMES: u64 = 60 * 60;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Invaders (headless) starting...");

    let mut args = std::env::args().skip(1);
    let tuning = args
        .next()
        .map(PathBuf::from)
        .map(|path| Tuning::load(&path))
        .unwrap_or_default();
    let frames = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_FRAMES);
    let seed = std::env::var("INVADERS_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    log::info!("Seed {}, {} frames", seed, frames);

    let mut engine = RulesEngine::new(tuning, seed);
    let mut waiting_for_start = true;
    let mut game_overs = 0u32;

    let mut report = |commands: &[RenderCommand], waiting: &mut bool| {
        for command in commands {
            match command {
                RenderCommand::Banner { text, visible: true } => {
                    log::info!("Banner: {}", text.replace('\n', " | "));
                    *waiting = true;
                }
                RenderCommand::GameOver { score } => {
                    game_overs += 1;
                    log::info!("Game over with score {}", score);
                }
                RenderCommand::Lives(lives) => log::info!("Lives: {}", lives),
                RenderCommand::WaveSpawned { wave } => log::debug!("Wave {}", wave),
                RenderCommand::Score(score) => log::trace!("Score: {}", score),
                RenderCommand::KillEffect { pos } => log::trace!("Kill effect at {:?}", pos),
                _ => {}
            }
        }
    };

    report(&engine.init(0), &mut waiting_for_start);

    let mut now = 0;
    for _ in 0..frames {
        now += FRAME_MS;
        let input = TickInput {
            start: waiting_for_start,
            idle_mode: true,
            ..Default::default()
        };
        waiting_for_start = false;
        report(&engine.tick(now, &input), &mut waiting_for_start);
    }

    let state = engine.state();
    let summary = serde_json::json!({
        "seed": seed,
        "frames": frames,
        "score": state.score,
        "multiplier": state.multiplier(),
        "lives": state.lives_remaining(),
        "waves_spawned": state.waves_spawned,
        "game_overs": game_overs,
        "enemies_left": state.active_enemies(),
    });
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Could not encode summary: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The rules engine is driven by the host page on wasm
}
