//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One step per frame, timers driven by the caller's `dt_ms`
//! - Seeded RNG only
//! - Stable iteration order
//! - No rendering or audio dependencies

pub mod bricks;
pub mod collision;
pub mod hazard;
pub mod powerup;
pub mod state;
pub mod tick;
pub mod timer;

pub use bricks::{Brick, BrickField, BrickStatus, DestroyCause, Destroyed};
pub use collision::{
    HitAxis, Rect, Wall, bounce_off_paddle, circle_rect_overlap, hit_axis, reflect_off_walls,
};
pub use hazard::{DescentHazard, DescentOutcome};
pub use powerup::{ActiveEffect, ActiveEffects, EffectEntry, EffectTable, PowerUp, PowerUpKind};
pub use state::{Ball, GameEvent, GameOverReason, GamePhase, GameState, Paddle, TRAIL_LENGTH};
pub use tick::{TickInput, tick};
pub use timer::Countdown;
