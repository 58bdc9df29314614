//! Power-up system
//!
//! Pickups drop from destroyed bricks, fall toward the paddle and grant an
//! effect when caught. Each kind maps to one entry of an [`EffectTable`]
//! holding its apply/revert callbacks and duration; the timers are plain
//! per-frame countdowns in [`ActiveEffects`].

use std::fmt;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::state::{Ball, GameEvent, GameState};
use super::timer::Countdown;
use crate::config::Tuning;
use crate::consts::*;
use crate::rotate;

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    WidenPaddle,
    SplitBall,
    EnlargeBall,
    IncendiaryBall,
    MagnetPaddle,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 5] = [
        PowerUpKind::WidenPaddle,
        PowerUpKind::SplitBall,
        PowerUpKind::EnlargeBall,
        PowerUpKind::IncendiaryBall,
        PowerUpKind::MagnetPaddle,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Pickup color for renderers (0xRRGGBB)
    pub fn color(self) -> u32 {
        match self {
            PowerUpKind::WidenPaddle => 0x00FF00,
            PowerUpKind::SplitBall => 0xFFFF00,
            PowerUpKind::EnlargeBall => 0x1E90FF,
            PowerUpKind::IncendiaryBall => 0xFF4500,
            PowerUpKind::MagnetPaddle => 0xC0C0C0,
        }
    }
}

/// A falling pickup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub fall_speed: f32,
    pub radius: f32,
    /// Visual tag (see [`PowerUpKind::color`])
    pub color: u32,
}

impl PowerUp {
    pub fn new(id: u32, kind: PowerUpKind, pos: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            fall_speed: POWERUP_FALL_SPEED,
            radius: POWERUP_RADIUS,
            color: kind.color(),
        }
    }

    /// Bounding box used for the paddle pickup test
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.pos.x - self.radius,
            self.pos.y - self.radius,
            self.radius * 2.0,
            self.radius * 2.0,
        )
    }

    pub fn is_below_field(&self) -> bool {
        self.pos.y - self.radius > FIELD_HEIGHT
    }
}

/// Timer bookkeeping for one power-up kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    timer: Countdown,
    duration_ms: f32,
}

impl ActiveEffect {
    fn dormant(duration_ms: f32) -> Self {
        Self {
            timer: Countdown::Cancelled,
            duration_ms,
        }
    }

    pub fn is_active(&self) -> bool {
        self.timer.is_pending()
    }

    /// Time left, 0 when dormant
    pub fn remaining_ms(&self) -> f32 {
        self.timer.remaining_ms().unwrap_or(0.0)
    }

    pub fn duration_ms(&self) -> f32 {
        self.duration_ms
    }

    /// Start, or restart from full duration if already running
    fn refresh(&mut self) {
        self.timer = Countdown::start(self.duration_ms);
    }

    fn cancel(&mut self) {
        self.timer.cancel();
    }

    /// Count down; returns true on the frame the effect runs out
    fn advance(&mut self, dt_ms: f32) -> bool {
        self.timer.advance(dt_ms)
    }
}

/// Effect timers for every kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffects {
    effects: [ActiveEffect; 5],
}

impl ActiveEffects {
    pub fn new(table: &EffectTable) -> Self {
        Self {
            effects: PowerUpKind::ALL
                .map(|kind| ActiveEffect::dormant(table.entry(kind).duration_ms)),
        }
    }

    pub fn get(&self, kind: PowerUpKind) -> &ActiveEffect {
        &self.effects[kind.index()]
    }

    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        self.get(kind).is_active()
    }

    /// Stop every timer without running revert callbacks
    pub fn cancel_all(&mut self) {
        for effect in &mut self.effects {
            effect.cancel();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (PowerUpKind, &ActiveEffect)> {
        PowerUpKind::ALL.into_iter().zip(self.effects.iter())
    }

    fn get_mut(&mut self, kind: PowerUpKind) -> &mut ActiveEffect {
        &mut self.effects[kind.index()]
    }
}

/// Callback run against the whole game state
pub type EffectFn = fn(&mut GameState);

/// What a power-up kind does
#[derive(Clone, Copy)]
pub struct EffectEntry {
    pub kind: PowerUpKind,
    /// 0 for instant effects that never expire
    pub duration_ms: f32,
    pub apply: EffectFn,
    pub revert: EffectFn,
}

impl fmt::Debug for EffectEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectEntry")
            .field("kind", &self.kind)
            .field("duration_ms", &self.duration_ms)
            .finish_non_exhaustive()
    }
}

/// Kind -> effect dispatch
#[derive(Debug, Clone, Copy)]
pub struct EffectTable {
    entries: [EffectEntry; 5],
}

impl EffectTable {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            entries: [
                EffectEntry {
                    kind: PowerUpKind::WidenPaddle,
                    duration_ms: tuning.widen_duration_ms,
                    apply: widen_paddle,
                    revert: restore_paddle,
                },
                EffectEntry {
                    kind: PowerUpKind::SplitBall,
                    duration_ms: 0.0,
                    apply: split_ball,
                    revert: no_op,
                },
                EffectEntry {
                    kind: PowerUpKind::EnlargeBall,
                    duration_ms: tuning.enlarge_duration_ms,
                    apply: |state| set_enlarged(state, true),
                    revert: |state| set_enlarged(state, false),
                },
                EffectEntry {
                    kind: PowerUpKind::IncendiaryBall,
                    duration_ms: tuning.incendiary_duration_ms,
                    apply: |state| set_incendiary(state, true),
                    revert: |state| set_incendiary(state, false),
                },
                EffectEntry {
                    kind: PowerUpKind::MagnetPaddle,
                    duration_ms: tuning.magnet_duration_ms,
                    // The pull runs every frame in `update` while active
                    apply: no_op,
                    revert: no_op,
                },
            ],
        }
    }

    pub fn entry(&self, kind: PowerUpKind) -> EffectEntry {
        self.entries[kind.index()]
    }
}

fn no_op(_state: &mut GameState) {}

fn widen_paddle(state: &mut GameState) {
    let width = state.base_paddle_width() * 2.0;
    state.paddle.set_width(width);
}

/// Reads the level ratio at expiry time, not at pickup time
fn restore_paddle(state: &mut GameState) {
    let width = state.base_paddle_width();
    state.paddle.set_width(width);
}

fn split_ball(state: &mut GameState) {
    let Some(source) = state.balls.first().cloned() else {
        return;
    };
    let speed = source.speed();
    let up = Vec2::new(0.0, -speed);

    for angle in [-SPLIT_ANGLE_DEG, SPLIT_ANGLE_DEG] {
        let id = state.next_entity_id();
        let mut ball = Ball::new(id, source.pos, rotate(up, angle.to_radians()));
        ball.set_enlarged(source.enlarged);
        ball.set_incendiary(source.incendiary);
        state.balls.push(ball);
    }
}

fn set_enlarged(state: &mut GameState, enlarged: bool) {
    for ball in &mut state.balls {
        ball.set_enlarged(enlarged);
    }
}

fn set_incendiary(state: &mut GameState, incendiary: bool) {
    for ball in &mut state.balls {
        ball.set_incendiary(incendiary);
    }
}

/// Roll for a pickup drop at a destroyed brick's center
pub fn maybe_spawn(state: &mut GameState, at: Vec2) {
    let probability = state.config().tuning.powerup_probability as f64;
    if !state.rng().random_bool(probability) {
        return;
    }
    let kind = PowerUpKind::ALL[state.rng().random_range(0..PowerUpKind::ALL.len())];
    let id = state.next_entity_id();
    state.pickups.push(PowerUp::new(id, kind, at));
}

/// Grant a power-up: run its apply callback and (re)start its timer
pub fn activate(state: &mut GameState, kind: PowerUpKind) {
    let entry = state.effect_table().entry(kind);
    (entry.apply)(state);
    if entry.duration_ms > 0.0 {
        let effect = state.effects.get_mut(kind);
        if effect.is_active() {
            log::debug!("{:?} refreshed", kind);
        }
        effect.refresh();
    }
    state.push_event(GameEvent::PowerUpCollected(kind));
    log::debug!("{:?} collected", kind);
}

/// Per-frame power-up step: expire effects, apply the magnet pull, move
/// pickups and hand caught ones to [`activate`].
pub fn update(state: &mut GameState, dt_ms: f32) {
    for kind in PowerUpKind::ALL {
        if state.effects.get_mut(kind).advance(dt_ms) {
            let entry = state.effect_table().entry(kind);
            (entry.revert)(state);
            state.push_event(GameEvent::PowerUpExpired(kind));
            log::debug!("{:?} expired", kind);
        }
    }

    if state.effects.is_active(PowerUpKind::MagnetPaddle) {
        apply_magnet(state);
    }

    let paddle = state.paddle.rect();
    let mut collected = Vec::new();
    state.pickups.retain_mut(|pickup| {
        pickup.pos.y += pickup.fall_speed;
        if pickup.rect().overlaps(&paddle) {
            collected.push(pickup.kind);
            false
        } else {
            !pickup.is_below_field()
        }
    });

    for kind in collected {
        activate(state, kind);
    }
}

/// Pull balls in the lower half of the field toward the paddle center
fn apply_magnet(state: &mut GameState) {
    let tuning = &state.config().tuning;
    let (range, strength) = (tuning.magnet_range, tuning.magnet_strength);
    let target = Vec2::new(state.paddle.center_x(), FIELD_HEIGHT - PADDLE_HEIGHT);

    for ball in &mut state.balls {
        if ball.pos.y <= FIELD_HEIGHT / 2.0 {
            continue;
        }
        let to_paddle = target - ball.pos;
        let distance = to_paddle.length();
        if distance <= 0.0 || distance >= range {
            continue;
        }
        ball.vel += to_paddle / distance * strength * (1.0 - distance / range);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::consts::FRAME_DT_MS;

    fn new_state() -> GameState {
        let mut state = GameState::new(GameConfig::default(), 7).unwrap();
        state.drain_events();
        state
    }

    fn pickup_on_paddle(state: &mut GameState, kind: PowerUpKind) {
        let id = state.next_entity_id();
        let pos = Vec2::new(state.paddle.center_x(), FIELD_HEIGHT - PADDLE_HEIGHT - 2.0);
        state.pickups.push(PowerUp::new(id, kind, pos));
    }

    #[test]
    fn test_widen_and_revert() {
        let mut state = new_state();
        activate(&mut state, PowerUpKind::WidenPaddle);
        assert_eq!(state.paddle.width, 300.0);
        assert!(state.effects.is_active(PowerUpKind::WidenPaddle));

        update(&mut state, 10_000.0);
        assert_eq!(state.paddle.width, 150.0);
        assert!(!state.effects.is_active(PowerUpKind::WidenPaddle));
        let expired = GameEvent::PowerUpExpired(PowerUpKind::WidenPaddle);
        assert!(state.events().contains(&expired));
    }

    #[test]
    fn test_widen_reverts_to_current_level_ratio() {
        let mut state = new_state();
        activate(&mut state, PowerUpKind::WidenPaddle);
        // Level ratio changes while the effect is pending
        state.paddle_width_ratio = 1.0;
        update(&mut state, 10_000.0);
        assert_eq!(state.paddle.width, 75.0);
    }

    #[test]
    fn test_refresh_resets_remaining_exactly() {
        let mut state = new_state();
        activate(&mut state, PowerUpKind::WidenPaddle);
        update(&mut state, 4_000.0);
        assert_eq!(state.effects.get(PowerUpKind::WidenPaddle).remaining_ms(), 6_000.0);

        activate(&mut state, PowerUpKind::WidenPaddle);
        let effect = state.effects.get(PowerUpKind::WidenPaddle);
        assert_eq!(effect.remaining_ms(), effect.duration_ms());
        assert_eq!(state.paddle.width, 300.0);
    }

    #[test]
    fn test_cancelled_effect_never_expires() {
        let mut effect = ActiveEffect::dormant(1_000.0);
        effect.refresh();
        assert!(effect.is_active());
        assert_eq!(effect.remaining_ms(), 1_000.0);

        effect.cancel();
        assert!(!effect.is_active());
        assert_eq!(effect.remaining_ms(), 0.0);
        assert!(!effect.advance(5_000.0));

        effect.refresh();
        assert!(!effect.advance(999.0));
        assert!(effect.advance(1.0));
        assert!(!effect.is_active());
        assert!(!effect.advance(1.0));
    }

    #[test]
    fn test_split_preserves_speed_and_flags() {
        let mut state = new_state();
        activate(&mut state, PowerUpKind::EnlargeBall);
        activate(&mut state, PowerUpKind::IncendiaryBall);
        let speed = state.balls[0].speed();

        activate(&mut state, PowerUpKind::SplitBall);
        assert_eq!(state.balls.len(), 3);
        for ball in &state.balls[1..] {
            assert!((ball.speed() - speed).abs() < 1e-4);
            assert!(ball.vel.y < 0.0);
            assert!(ball.enlarged && ball.incendiary);
            assert_eq!(ball.radius, state.balls[0].radius);
            assert_eq!(ball.pos, state.balls[0].pos);
        }
        // +/- 30 degrees from vertical
        let (a, b) = (state.balls[1].vel, state.balls[2].vel);
        assert!((a.x + b.x).abs() < 1e-4);
        assert!((a.x.abs() / speed - 0.5).abs() < 1e-4);
        // Instant effect: never pending
        assert!(!state.effects.is_active(PowerUpKind::SplitBall));
    }

    #[test]
    fn test_enlarge_toggles_all_balls() {
        let mut state = new_state();
        activate(&mut state, PowerUpKind::SplitBall);
        activate(&mut state, PowerUpKind::EnlargeBall);
        let enlarged = BALL_RADIUS * ENLARGED_RADIUS_FACTOR;
        assert!(state.balls.iter().all(|b| b.enlarged && b.radius == enlarged));

        // Picking it up twice still reverts in one expiry
        activate(&mut state, PowerUpKind::EnlargeBall);
        update(&mut state, 10_000.0);
        assert!(state.balls.iter().all(|b| !b.enlarged && b.radius == BALL_RADIUS));
    }

    #[test]
    fn test_magnet_pulls_lower_balls() {
        let mut state = new_state();
        activate(&mut state, PowerUpKind::MagnetPaddle);
        let center = state.paddle.center_x();
        state.balls[0].pos = Vec2::new(center - 60.0, FIELD_HEIGHT - PADDLE_HEIGHT);
        state.balls[0].vel = Vec2::new(0.0, 4.0);

        update(&mut state, FRAME_DT_MS);
        // Pulled right, toward the paddle center
        assert!(state.balls[0].vel.x > 0.0);
        let expected = state.config().tuning.magnet_strength * (1.0 - 60.0 / 150.0);
        assert!((state.balls[0].vel.x - expected).abs() < 1e-5);
    }

    #[test]
    fn test_magnet_ignores_upper_half_and_far_balls() {
        let mut state = new_state();
        activate(&mut state, PowerUpKind::MagnetPaddle);
        let center = state.paddle.center_x();
        state.balls[0].pos = Vec2::new(center, FIELD_HEIGHT / 2.0 - 10.0);
        state.balls[0].vel = Vec2::new(0.0, 4.0);
        update(&mut state, FRAME_DT_MS);
        assert_eq!(state.balls[0].vel, Vec2::new(0.0, 4.0));

        state.balls[0].pos = Vec2::new(center, FIELD_HEIGHT - 200.0);
        update(&mut state, FRAME_DT_MS);
        assert_eq!(state.balls[0].vel, Vec2::new(0.0, 4.0));
    }

    #[test]
    fn test_pickup_collected_on_paddle() {
        let mut state = new_state();
        pickup_on_paddle(&mut state, PowerUpKind::IncendiaryBall);
        update(&mut state, FRAME_DT_MS);
        assert!(state.pickups.is_empty());
        assert!(state.effects.is_active(PowerUpKind::IncendiaryBall));
        assert!(state.balls[0].incendiary);
        let collected = GameEvent::PowerUpCollected(PowerUpKind::IncendiaryBall);
        assert!(state.events().contains(&collected));
    }

    #[test]
    fn test_missed_pickup_is_discarded() {
        let mut state = new_state();
        let id = state.next_entity_id();
        // Far from the paddle, about to leave the field
        let pos = Vec2::new(10.0, FIELD_HEIGHT + 7.0);
        state.pickups.push(PowerUp::new(id, PowerUpKind::WidenPaddle, pos));
        state.paddle.set_x(300.0);
        update(&mut state, FRAME_DT_MS);
        assert!(state.pickups.is_empty());
        assert!(!state.effects.is_active(PowerUpKind::WidenPaddle));
        assert!(state.events().is_empty());
    }

    #[test]
    fn test_pickup_falls() {
        let mut state = new_state();
        let id = state.next_entity_id();
        let pos = Vec2::new(100.0, 100.0);
        state.pickups.push(PowerUp::new(id, PowerUpKind::SplitBall, pos));
        update(&mut state, FRAME_DT_MS);
        assert_eq!(state.pickups[0].pos.y, 100.0 + POWERUP_FALL_SPEED);
    }

    #[test]
    fn test_spawn_probability_bounds() {
        let mut config = GameConfig::default();
        config.tuning.powerup_probability = 1.0;
        let mut state = GameState::new(config, 1).unwrap();
        maybe_spawn(&mut state, Vec2::new(50.0, 50.0));
        assert_eq!(state.pickups.len(), 1);

        let mut config = GameConfig::default();
        config.tuning.powerup_probability = 0.0;
        let mut state = GameState::new(config, 1).unwrap();
        for _ in 0..100 {
            maybe_spawn(&mut state, Vec2::new(50.0, 50.0));
        }
        assert!(state.pickups.is_empty());
    }
}
