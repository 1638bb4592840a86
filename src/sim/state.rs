//! Game state and core simulation types
//!
//! Everything the rules read or write lives in [`GameState`]. Entities are
//! plain data stored in fixed pools; rendering reads them back through the
//! engine.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::pool::Pool;
use crate::consts::*;
use crate::life_marker_position;

/// Engine clock value in milliseconds
pub type Millis = u64;

/// Why the run is paused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PauseReason {
    /// Instructions banner before the first start
    Title,
    /// Pause control pressed
    Manual,
    /// Lives ran out; waiting for restart
    GameOver,
}

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Paused(PauseReason),
    Playing,
}

impl GamePhase {
    pub fn is_playing(self) -> bool {
        self == GamePhase::Playing
    }
}

/// Difficulty, stored as the number of 0.2 steps taken so the multiplier
/// never accumulates float drift
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Difficulty {
    pub steps: u32,
}

impl Difficulty {
    /// Scalar >= 1 scaling descent speed, enemy fire rate and score
    #[inline]
    pub fn multiplier(self) -> f32 {
        1.0 + DIFFICULTY_STEP * self.steps as f32
    }

    pub fn raise(&mut self) {
        self.steps += 1;
    }

    /// `base` scaled by the multiplier, rounded to whole points
    pub fn scale_points(self, base: u32) -> u64 {
        (base as f32 * self.multiplier()).round() as u64
    }
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub alive: bool,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec2::new(PLAYER_SPAWN_X, PLAYER_SPAWN_Y),
            vel: Vec2::ZERO,
            alive: true,
        }
    }
}

impl Player {
    /// Alive again at the spawn point, at rest
    pub fn revive(&mut self) {
        *self = Self::default();
    }
}

/// A bullet (player or enemy pool)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    pub vel: Vec2,
}

impl Bullet {
    pub fn step(&mut self, dt: f32) {
        self.pos += self.vel * dt;
    }
}

/// An enemy, identified by its cell in the formation grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enemy {
    pub col: u8,
    pub row: u8,
}

impl Enemy {
    /// Offset of this cell from the formation origin
    #[inline]
    pub fn cell_offset(self) -> Vec2 {
        Vec2::new(
            self.col as f32 * GRID_SPACING,
            self.row as f32 * GRID_SPACING,
        )
    }

    /// World position given the current formation
    #[inline]
    pub fn position(self, formation: &Formation) -> Vec2 {
        formation.origin + self.cell_offset()
    }
}

/// A life marker in the HUD
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LifeMarker {
    pub pos: Vec2,
}

/// A one-shot kill animation
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct KillEffect {
    pub pos: Vec2,
    /// Clock value at which the animation has finished
    pub expires_at: Millis,
}

/// Placement of the enemy grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Formation {
    /// World position of cell (0, 0)
    pub origin: Vec2,
    /// Clock value when the wave spawned (sweep start)
    pub spawned_at: Millis,
    /// Length of one sweep leg, fixed at spawn
    pub sweep_leg_ms: f32,
}

impl Default for Formation {
    fn default() -> Self {
        Self {
            origin: Vec2::new(FORMATION_START_X, FORMATION_START_Y),
            spawned_at: 0,
            sweep_leg_ms: SWEEP_LEG_MS,
        }
    }
}

/// Signals to the host: what to draw, animate or display this frame
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Background tile offset
    ScrollBackground { offset: f32 },
    /// Play the kill animation at a position
    KillEffect { pos: Vec2 },
    /// Score text changed
    Score(u64),
    /// Remaining life markers changed
    Lives(u8),
    /// Center banner text and visibility
    Banner { text: String, visible: bool },
    /// Label of the pause control
    PauseLabel(&'static str),
    /// Lives ran out (emitted once per game over)
    GameOver { score: u64 },
    /// A fresh wave was spawned
    WaveSpawned { wave: u32 },
}

/// Complete game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// RNG used for shooter selection
    pub rng: Pcg32,
    /// Current phase
    pub phase: GamePhase,
    /// Score
    pub score: u64,
    /// Difficulty steps taken
    pub difficulty: Difficulty,
    /// Play clock: only advances while playing
    pub clock: Millis,
    /// Earliest clock value for the next player shot
    pub player_fire_at: Millis,
    /// Clock value of the last enemy shot
    pub enemy_fired_at: Option<Millis>,
    /// Background scroll offset
    pub background_offset: f32,
    /// Waves spawned so far this run
    pub waves_spawned: u32,
    /// Game-over transitions so far
    pub game_overs: u32,
    /// Player ship
    pub player: Player,
    /// Enemy grid slots
    pub enemies: Pool<Enemy>,
    /// Enemy grid placement
    pub formation: Formation,
    pub player_bullets: Pool<Bullet>,
    pub enemy_bullets: Pool<Bullet>,
    pub lives: Pool<LifeMarker>,
    pub kill_effects: Pool<KillEffect>,
    /// Commands produced since the last drain
    #[serde(skip)]
    pub(crate) commands: Vec<RenderCommand>,
}

impl GameState {
    /// Create a new game state with all pools allocated and the first wave
    /// in place, paused on the title banner
    pub fn new(seed: u64) -> Self {
        let mut lives = Pool::with_capacity(STARTING_LIVES);
        for i in 0..STARTING_LIVES {
            lives.spawn(LifeMarker {
                pos: life_marker_position(i),
            });
        }

        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Paused(PauseReason::Title),
            score: 0,
            difficulty: Difficulty::default(),
            clock: 0,
            player_fire_at: 0,
            enemy_fired_at: None,
            background_offset: 0.0,
            waves_spawned: 0,
            game_overs: 0,
            player: Player::default(),
            enemies: Pool::with_capacity(WAVE_SIZE),
            formation: Formation::default(),
            player_bullets: Pool::with_capacity(BULLET_POOL_SIZE),
            enemy_bullets: Pool::with_capacity(BULLET_POOL_SIZE),
            lives,
            kill_effects: Pool::with_capacity(KILL_EFFECT_POOL_SIZE),
            commands: Vec::new(),
        };

        super::wave::spawn_wave(&mut state);
        state
    }

    #[inline]
    pub fn multiplier(&self) -> f32 {
        self.difficulty.multiplier()
    }

    pub fn lives_remaining(&self) -> u8 {
        self.lives.count_active() as u8
    }

    pub fn active_enemies(&self) -> usize {
        self.enemies.count_active()
    }

    /// World positions of all active enemies
    pub fn enemy_positions(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.enemies
            .iter_active()
            .map(|(_, e)| e.position(&self.formation))
    }

    /// Queue a command for the host
    pub(crate) fn emit(&mut self, command: RenderCommand) {
        self.commands.push(command);
    }

    /// Take all queued commands
    pub(crate) fn drain_commands(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_paused_on_title() {
        let state = GameState::new(1);
        assert_eq!(state.phase, GamePhase::Paused(PauseReason::Title));
        assert_eq!(state.score, 0);
        assert_eq!(state.lives_remaining(), 3);
        assert_eq!(state.active_enemies(), WAVE_SIZE);
        assert_eq!(state.player_bullets.capacity(), BULLET_POOL_SIZE);
        assert_eq!(state.enemy_bullets.count_active(), 0);
        assert!(state.player.alive);
    }

    #[test]
    fn test_difficulty_steps_are_exact() {
        let mut d = Difficulty::default();
        assert_eq!(d.multiplier(), 1.0);
        assert_eq!(d.scale_points(KILL_SCORE), 20);

        d.raise();
        assert!((d.multiplier() - 1.2).abs() < 1e-6);
        assert_eq!(d.scale_points(KILL_SCORE), 24);
        assert_eq!(d.scale_points(WAVE_CLEAR_BONUS), 1200);

        for _ in 0..4 {
            d.raise();
        }
        assert_eq!(d.scale_points(KILL_SCORE), 40);
    }

    #[test]
    fn test_enemy_position_follows_formation() {
        let mut formation = Formation::default();
        let enemy = Enemy { col: 3, row: 2 };
        assert_eq!(enemy.position(&formation), Vec2::new(70.0, 50.0));

        formation.origin.y += 100.0;
        assert_eq!(enemy.position(&formation), Vec2::new(70.0, 150.0));
    }
}
