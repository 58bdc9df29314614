//! Brickfall - A brick breaker with a descending brick field
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, power-ups, game state)
//! - `config`: Data-driven level table and gameplay tuning
//! - `audio`: Event-to-sound mapping for an optional audio backend
//! - `snapshot`: Read-only frame view for renderers

pub mod audio;
pub mod config;
pub mod error;
pub mod sim;
pub mod snapshot;

pub use config::{GameConfig, LevelConfig, Tuning};
pub use error::ConfigError;
pub use snapshot::FrameSnapshot;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Nominal frame duration (the simulation steps once per display refresh)
    pub const FRAME_DT_MS: f32 = 1000.0 / 60.0;

    /// Field dimensions
    pub const FIELD_WIDTH: f32 = 480.0;
    pub const FIELD_HEIGHT: f32 = 768.0;

    /// Paddle defaults - paddle sits on the bottom edge of the field
    pub const PADDLE_HEIGHT: f32 = 10.0;
    pub const PADDLE_WIDTH_BASE: f32 = 75.0;
    /// Horizontal speed for keyboard movement (pixels/frame)
    pub const PADDLE_KEY_SPEED: f32 = 7.0;
    /// dx added when the ball hits the very edge of the paddle
    pub const PADDLE_STEER: f32 = 3.0;
    /// Steered dx is clamped to this multiple of the level's base speed
    pub const MAX_DX_FACTOR: f32 = 2.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 8.0;
    /// Base ball speed per axis (pixels/frame), scaled by level speed ratio
    pub const BALL_SPEED_BASE: f32 = 4.0;
    /// Spawn height above the bottom edge
    pub const BALL_SPAWN_LIFT: f32 = 30.0;
    /// Radius multiplier while EnlargeBall is active
    pub const ENLARGED_RADIUS_FACTOR: f32 = 1.75;
    /// SplitBall launch angle from vertical (degrees)
    pub const SPLIT_ANGLE_DEG: f32 = 30.0;

    /// Brick grid
    pub const BRICK_ROWS: usize = 5;
    pub const BRICK_COLUMNS: usize = 8;
    pub const BRICK_WIDTH: f32 = 50.0;
    pub const BRICK_HEIGHT: f32 = 15.0;
    pub const BRICK_PADDING: f32 = 10.0;
    pub const BRICK_OFFSET_TOP: f32 = 30.0;
    /// Vertical distance one descent step moves the field
    pub const BRICK_ROW_HEIGHT: f32 = BRICK_HEIGHT + BRICK_PADDING;

    /// Score per brick hit directly
    pub const BRICK_SCORE: u64 = 10;
    /// Score per brick caught in an incendiary blast
    pub const SPLASH_SCORE: u64 = 5;

    /// Power-up pickups
    pub const POWERUP_RADIUS: f32 = 8.0;
    pub const POWERUP_FALL_SPEED: f32 = 1.5;
}

/// Left edge of the brick grid, centering the grid horizontally
#[inline]
pub fn brick_offset_left() -> f32 {
    use consts::*;
    let grid_width =
        BRICK_COLUMNS as f32 * BRICK_WIDTH + (BRICK_COLUMNS as f32 - 1.0) * BRICK_PADDING;
    (FIELD_WIDTH - grid_width) / 2.0
}

/// The paddle's top edge; bricks reaching this line end the game
#[inline]
pub fn defense_line() -> f32 {
    consts::FIELD_HEIGHT - consts::PADDLE_HEIGHT
}

/// Rotate a vector by `angle` radians (positive = clockwise on screen)
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}
