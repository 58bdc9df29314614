//! Game state and core simulation types
//!
//! `GameState` is the single mutable root of a session. Every subsystem
//! receives it explicitly; there is no global state.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::bricks::{BrickField, DestroyCause};
use super::collision::{Rect, Wall};
use super::hazard::DescentHazard;
use super::powerup::{ActiveEffects, EffectTable, PowerUp, PowerUpKind};
use super::timer::Countdown;
use crate::config::{GameConfig, LevelConfig};
use crate::consts::*;
use crate::error::ConfigError;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Frozen by the player
    Paused,
    /// All bricks destroyed; waiting to start the next level
    LevelCleared,
    /// Run ended
    GameOver,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    /// Last ball lost with no lives left
    OutOfLives,
    /// The descending field reached the paddle
    BricksReachedPaddle,
}

/// Discrete events for audio and other presentation collaborators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    BrickDestroyed {
        column: usize,
        row: usize,
        cause: DestroyCause,
    },
    WallBounce(Wall),
    PaddleBounce,
    PowerUpCollected(PowerUpKind),
    PowerUpExpired(PowerUpKind),
    BallLost { lives_left: u8 },
    BricksDescended { vertical_offset: f32 },
    /// A level was (re)loaded: new game, level change or level advance
    LevelStarted { level: u32 },
    LevelCleared { level: u32 },
    GameOver(GameOverReason),
}

/// Maximum number of trail points to store
pub const TRAIL_LENGTH: usize = 10;

/// A ball entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Piercing mode (destroys bricks without bouncing)
    pub enlarged: bool,
    /// Destroys neighbouring bricks on impact
    pub incendiary: bool,
    /// Recent positions for rendering (newest first)
    #[serde(skip)]
    pub trail: Vec<Vec2>,
}

impl Ball {
    pub fn new(id: u32, pos: Vec2, vel: Vec2) -> Self {
        Self {
            id,
            pos,
            vel,
            radius: BALL_RADIUS,
            enlarged: false,
            incendiary: false,
            trail: Vec::with_capacity(TRAIL_LENGTH),
        }
    }

    /// Record current position to trail (call each frame before moving)
    pub fn record_trail(&mut self) {
        self.trail.insert(0, self.pos);
        if self.trail.len() > TRAIL_LENGTH {
            self.trail.pop();
        }
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Set the enlarged flag and the matching radius
    pub(crate) fn set_enlarged(&mut self, enlarged: bool) {
        self.enlarged = enlarged;
        self.radius = if enlarged {
            BALL_RADIUS * ENLARGED_RADIUS_FACTOR
        } else {
            BALL_RADIUS
        };
    }

    pub(crate) fn set_incendiary(&mut self, incendiary: bool) {
        self.incendiary = incendiary;
    }
}

/// The player's paddle, riding the bottom edge of the field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    /// Left edge
    pub x: f32,
    pub width: f32,
}

impl Paddle {
    /// A centered paddle of the given width
    pub fn new(width: f32) -> Self {
        let width = width.clamp(1.0, FIELD_WIDTH);
        Self {
            x: (FIELD_WIDTH - width) / 2.0,
            width,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, FIELD_HEIGHT - PADDLE_HEIGHT, self.width, PADDLE_HEIGHT)
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Largest legal left edge
    #[inline]
    pub fn max_x(&self) -> f32 {
        (FIELD_WIDTH - self.width).max(0.0)
    }

    /// Move the left edge, clamped into the field
    pub fn set_x(&mut self, x: f32) {
        let x = if x.is_finite() { x } else { self.x };
        self.x = x.clamp(0.0, self.max_x());
    }

    /// Center the paddle on `target_x`, clamped into the field
    pub fn center_on(&mut self, target_x: f32) {
        self.set_x(target_x - self.width / 2.0);
    }

    /// Resize around the current center, then clamp
    pub fn set_width(&mut self, width: f32) {
        let center = self.center_x();
        self.width = width.clamp(1.0, FIELD_WIDTH);
        self.center_on(center);
    }

    pub fn recenter(&mut self) {
        self.set_x((FIELD_WIDTH - self.width) / 2.0);
    }

    pub fn in_bounds(&self) -> bool {
        self.x >= 0.0 && self.x <= self.max_x()
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Level table and tuning (immutable for the session)
    config: GameConfig,
    /// Power-up kind -> apply/revert/duration
    effect_table: EffectTable,
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    /// Current level (1-based index into the level table)
    pub level: u32,
    /// Levels started this run, counting wraparounds
    pub stage: u32,
    /// Paddle width ratio of the current level
    pub paddle_width_ratio: f32,
    /// Ball speed ratio of the current level
    pub speed_ratio: f32,
    pub lives: u8,
    pub score: u64,
    /// Simulation frame counter
    pub time_ticks: u64,
    pub phase: GamePhase,
    pub paddle: Paddle,
    pub balls: Vec<Ball>,
    pub bricks: BrickField,
    /// Falling pickups
    pub pickups: Vec<PowerUp>,
    /// Per-kind effect timers
    pub effects: ActiveEffects,
    pub hazard: DescentHazard,
    /// Delay between LevelCleared and the next level
    pub transition: Countdown,
    events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Validate `config` and start a game on level 1
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let first = config.level(1)?.clone();
        let effect_table = EffectTable::new(&config.tuning);
        let effects = ActiveEffects::new(&effect_table);

        let mut state = Self {
            effect_table,
            effects,
            hazard: DescentHazard::new(config.tuning.descent_interval_ms),
            seed,
            rng: Pcg32::seed_from_u64(seed),
            level: 1,
            stage: 1,
            paddle_width_ratio: first.paddle_width_ratio,
            speed_ratio: first.speed_ratio,
            lives: config.tuning.initial_lives,
            score: 0,
            time_ticks: 0,
            phase: GamePhase::Playing,
            paddle: Paddle::new(PADDLE_WIDTH_BASE * first.paddle_width_ratio),
            balls: Vec::new(),
            bricks: BrickField::from_pattern(&first.pattern),
            pickups: Vec::new(),
            transition: Countdown::Cancelled,
            events: Vec::new(),
            next_id: 1,
            config,
        };
        state.load_level(1, &first);
        Ok(state)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn effect_table(&self) -> &EffectTable {
        &self.effect_table
    }

    /// Restart the run on `level`.
    ///
    /// The only full re-initialization: lives, score, balls, paddle, bricks,
    /// pickups and every timer. All timers are cancelled before new ones
    /// are armed, so calling this twice (or mid-frame) is harmless. An
    /// unknown level is rejected and nothing changes.
    pub fn reset_game(&mut self, level: u32) -> Result<(), ConfigError> {
        let level_config = match self.config.level(level) {
            Ok(cfg) => cfg.clone(),
            Err(err) => {
                log::warn!("Rejected reset: {}", err);
                return Err(err);
            }
        };

        self.cancel_timers();
        self.lives = self.config.tuning.initial_lives;
        self.score = 0;
        self.stage = 1;
        self.time_ticks = 0;
        self.next_id = 1;
        self.load_level(level, &level_config);
        Ok(())
    }

    /// Switch difficulty: restart the run on another level
    pub fn change_level(&mut self, level: u32) -> Result<(), ConfigError> {
        self.reset_game(level)?;
        log::info!("Changed to {}", self.level_name());
        Ok(())
    }

    /// Display name of the current level
    pub fn level_name(&self) -> &str {
        self.config
            .level(self.level)
            .map(|cfg| cfg.name.as_str())
            .unwrap_or("unknown")
    }

    /// Build the per-level entities. Score and lives are untouched.
    fn load_level(&mut self, level: u32, level_config: &LevelConfig) {
        self.cancel_timers();

        self.level = level;
        self.paddle_width_ratio = level_config.paddle_width_ratio;
        self.speed_ratio = level_config.speed_ratio;

        self.paddle = Paddle::new(self.base_paddle_width());
        self.bricks = BrickField::from_pattern(&level_config.pattern);
        self.pickups.clear();
        self.balls.clear();
        self.spawn_ball();

        self.hazard.restart();
        self.phase = GamePhase::Playing;
        self.push_event(GameEvent::LevelStarted { level });

        log::info!(
            "Level {} ({}): {} bricks, stage {}",
            level,
            level_config.name,
            self.bricks.alive_count(),
            self.stage
        );
    }

    /// Cancel every effect, descent and transition timer
    fn cancel_timers(&mut self) {
        self.effects.cancel_all();
        self.hazard.cancel();
        self.transition.cancel();
    }

    /// Paddle width for the current level without effects
    pub fn base_paddle_width(&self) -> f32 {
        PADDLE_WIDTH_BASE * self.paddle_width_ratio
    }

    /// Per-axis ball speed for the current level
    pub fn base_speed(&self) -> f32 {
        BALL_SPEED_BASE * self.speed_ratio
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub(crate) fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    /// Spawn a fresh ball at the serve position with the level's velocity
    pub fn spawn_ball(&mut self) {
        let id = self.next_entity_id();
        let speed = self.base_speed();
        let pos = Vec2::new(FIELD_WIDTH / 2.0, FIELD_HEIGHT - BALL_SPAWN_LIFT);
        self.balls.push(Ball::new(id, pos, Vec2::new(speed, -speed)));
    }

    /// Called when the last ball has left the field
    pub(crate) fn handle_ball_loss(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        self.push_event(GameEvent::BallLost {
            lives_left: self.lives,
        });

        if self.lives == 0 {
            self.game_over(GameOverReason::OutOfLives);
            return;
        }

        log::debug!("Ball lost, {} lives left", self.lives);
        self.spawn_ball();
        self.paddle.recenter();
    }

    /// All bricks are gone: freeze and schedule the next level
    pub(crate) fn enter_level_cleared(&mut self) {
        self.phase = GamePhase::LevelCleared;
        self.effects.cancel_all();
        self.pickups.clear();
        self.hazard.pause();
        self.transition = Countdown::start(self.config.tuning.level_transition_ms);
        self.push_event(GameEvent::LevelCleared { level: self.level });
        log::info!("Level {} cleared, score {}", self.level, self.score);
    }

    /// Load the level after the current one, keeping score and lives
    pub(crate) fn advance_level(&mut self) {
        let next = self.config.next_level(self.level);
        match self.config.level(next) {
            Ok(cfg) => {
                let cfg = cfg.clone();
                self.stage += 1;
                self.load_level(next, &cfg);
            }
            Err(err) => log::warn!("Cannot advance level: {}", err),
        }
    }

    /// Enter the terminal state and stop every timer
    pub(crate) fn game_over(&mut self, reason: GameOverReason) {
        self.phase = GamePhase::GameOver;
        self.cancel_timers();
        self.push_event(GameEvent::GameOver(reason));
        log::info!("Game over ({:?}), final score {}", reason, self.score);
    }

    /// Toggle between Playing and Paused; other phases ignore it
    pub fn toggle_pause(&mut self) {
        match self.phase {
            GamePhase::Playing => {
                self.phase = GamePhase::Paused;
                self.hazard.pause();
            }
            GamePhase::Paused => {
                self.phase = GamePhase::Playing;
                self.hazard.resume();
            }
            GamePhase::LevelCleared | GamePhase::GameOver => {}
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub(crate) fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Events emitted during the current frame
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Clamp anything that slipped out of its legal range
    pub(crate) fn enforce_invariants(&mut self) {
        if !self.paddle.in_bounds() {
            log::warn!("Paddle out of bounds at x={}, clamping", self.paddle.x);
            let x = self.paddle.x;
            self.paddle.set_x(x);
        }
        if self.bricks.repair_alive_count() {
            log::warn!(
                "Alive brick count drifted, recounted to {}",
                self.bricks.alive_count()
            );
        }
    }

    /// Whether any effect timer is still pending
    pub fn has_pending_effects(&self) -> bool {
        PowerUpKind::ALL
            .iter()
            .any(|&kind| self.effects.is_active(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_state() -> GameState {
        GameState::new(GameConfig::default(), 12345).unwrap()
    }

    #[test]
    fn test_new_game() {
        let state = new_state();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.level, 1);
        assert_eq!(state.lives, 3);
        assert_eq!(state.balls.len(), 1);
        assert_eq!(state.bricks.alive_count(), 40);
        assert_eq!(state.paddle.width, 150.0);
        assert_eq!(state.paddle.x, 165.0);
        assert_eq!(state.balls[0].pos, Vec2::new(240.0, 738.0));
        assert_eq!(state.balls[0].vel, Vec2::new(4.0, -4.0));
        assert!(state.hazard.is_running());
        assert_eq!(state.events(), &[GameEvent::LevelStarted { level: 1 }]);
    }

    #[test]
    fn test_rejects_invalid_level_without_change() {
        let mut state = new_state();
        state.score = 120;
        state.balls[0].pos = Vec2::new(10.0, 10.0);

        assert!(state.reset_game(0).is_err());
        assert!(state.reset_game(4).is_err());
        assert_eq!(state.score, 120);
        assert_eq!(state.balls[0].pos, Vec2::new(10.0, 10.0));
        assert_eq!(state.level, 1);
    }

    #[test]
    fn test_change_level_applies_ratios() {
        let mut state = new_state();
        state.change_level(3).unwrap();
        assert_eq!(state.level, 3);
        assert_eq!(state.paddle.width, 60.0);
        assert_eq!(state.balls[0].vel, Vec2::new(8.0, -8.0));
        assert_eq!(state.bricks.alive_count(), 10);
        assert_eq!(state.level_name(), "Level 3 (Hard)");
        assert_eq!(
            state.events().last(),
            Some(&GameEvent::LevelStarted { level: 3 })
        );
    }

    #[test]
    fn test_paddle_clamps() {
        let mut paddle = Paddle::new(75.0);
        paddle.set_x(-20.0);
        assert_eq!(paddle.x, 0.0);
        paddle.set_x(1000.0);
        assert_eq!(paddle.x, 405.0);
        paddle.center_on(470.0);
        assert_eq!(paddle.x, 405.0);
        paddle.set_x(f32::NAN);
        assert!(paddle.in_bounds());
    }

    #[test]
    fn test_paddle_resize_keeps_center() {
        let mut paddle = Paddle::new(75.0);
        paddle.set_x(100.0);
        paddle.set_width(150.0);
        assert_eq!(paddle.center_x(), 137.5);
        // Widening against the wall clamps instead of overflowing
        paddle.set_x(405.0);
        paddle.set_width(150.0);
        assert_eq!(paddle.x, 330.0);
        assert!(paddle.in_bounds());
    }

    #[test]
    fn test_ball_loss_respawns() {
        let mut state = new_state();
        state.drain_events();
        state.balls.clear();
        state.paddle.set_x(0.0);
        state.handle_ball_loss();
        assert_eq!(state.lives, 2);
        assert_eq!(state.balls.len(), 1);
        assert_eq!(state.paddle.x, 165.0);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::BallLost { lives_left: 2 }]
        );
    }

    #[test]
    fn test_last_life_ends_game() {
        let mut state = new_state();
        state.lives = 1;
        state.balls.clear();
        state.handle_ball_loss();
        assert_eq!(state.lives, 0);
        assert!(state.is_game_over());
        assert!(state.balls.is_empty());
        assert!(!state.hazard.is_pending());
    }

    #[test]
    fn test_trail_is_bounded() {
        let mut ball = Ball::new(1, Vec2::ZERO, Vec2::ONE);
        for i in 0..25 {
            ball.pos = Vec2::splat(i as f32);
            ball.record_trail();
        }
        assert_eq!(ball.trail.len(), TRAIL_LENGTH);
        assert_eq!(ball.trail[0], Vec2::splat(24.0));
    }

    #[test]
    fn test_pause_toggle_holds_hazard() {
        let mut state = new_state();
        state.toggle_pause();
        assert_eq!(state.phase, GamePhase::Paused);
        assert!(!state.hazard.is_running());
        state.toggle_pause();
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.hazard.is_running());
    }
}
