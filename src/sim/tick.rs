//! Per-frame simulation step
//!
//! Core game loop that advances the simulation one frame in a fixed order:
//! paddle input, balls (bricks, walls/paddle, movement), ball loss,
//! power-ups, descent hazard, level-clear check.

use super::bricks::Destroyed;
use super::collision::{bounce_off_paddle, hit_axis, reflect_off_walls};
use super::hazard::DescentOutcome;
use super::powerup;
use super::state::{GameEvent, GameOverReason, GamePhase, GameState};
use crate::consts::*;
use crate::defense_line;

/// Input commands for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Desired paddle center (from pointer/touch, already in field space)
    pub target_x: Option<f32>,
    /// Keyboard movement intents
    pub move_left: bool,
    pub move_right: bool,
    /// Pause toggle
    pub pause: bool,
    /// Idle/demo mode - AI moves the paddle
    pub autopilot: bool,
}

/// Advance the game state by one frame (`dt_ms` drives the timers).
///
/// Events left over from the previous frame are discarded first; hosts that
/// want them call `drain_events` between ticks.
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: f32) {
    // Events describe a single frame
    state.clear_events();

    if input.pause {
        state.toggle_pause();
    }

    // Don't tick if paused or game over
    match state.phase {
        GamePhase::Paused | GamePhase::GameOver => return,
        _ => {}
    }

    state.time_ticks += 1;

    match state.phase {
        GamePhase::Playing => step_playing(state, input, dt_ms),
        GamePhase::LevelCleared => {
            if state.transition.advance(dt_ms) {
                state.advance_level();
            }
        }
        GamePhase::Paused | GamePhase::GameOver => {}
    }

    state.enforce_invariants();
}

fn step_playing(state: &mut GameState, input: &TickInput, dt_ms: f32) {
    let input = if input.autopilot {
        autopilot(state, input)
    } else {
        input.clone()
    };
    apply_paddle_input(state, &input);

    update_balls(state);
    if state.balls.is_empty() {
        state.handle_ball_loss();
        if state.is_game_over() {
            return;
        }
    }

    powerup::update(state, dt_ms);

    match state.hazard.advance(dt_ms, &mut state.bricks, defense_line()) {
        DescentOutcome::Idle => {}
        DescentOutcome::Descended => {
            let vertical_offset = state.bricks.vertical_offset();
            log::debug!("Bricks descended to offset {}", vertical_offset);
            state.push_event(GameEvent::BricksDescended { vertical_offset });
        }
        DescentOutcome::Breached => {
            state.game_over(GameOverReason::BricksReachedPaddle);
            return;
        }
    }

    if state.bricks.is_cleared() {
        state.enter_level_cleared();
    }
}

fn apply_paddle_input(state: &mut GameState, input: &TickInput) {
    if let Some(target) = input.target_x {
        state.paddle.center_on(target);
    }
    if input.move_left {
        let x = state.paddle.x - PADDLE_KEY_SPEED;
        state.paddle.set_x(x);
    }
    if input.move_right {
        let x = state.paddle.x + PADDLE_KEY_SPEED;
        state.paddle.set_x(x);
    }
}

/// Bricks, walls/paddle, then movement for every ball.
///
/// Iterates in reverse so lost balls can be removed in place. Each ball
/// destroys at most one brick directly per frame.
fn update_balls(state: &mut GameState) {
    let paddle = state.paddle.rect();
    let max_dx = state.base_speed() * MAX_DX_FACTOR;
    let mut destroyed: Vec<Destroyed> = Vec::new();
    let mut events: Vec<GameEvent> = Vec::new();

    for i in (0..state.balls.len()).rev() {
        let ball = &mut state.balls[i];

        let hits = state
            .bricks
            .check_and_destroy(ball.pos, ball.radius, ball.incendiary);
        if let Some(first) = hits.first() {
            // Enlarged balls pierce instead of bouncing
            if !ball.enlarged {
                ball.vel = hit_axis(ball.pos, ball.vel, &first.rect).reflect(ball.vel);
            }
        }
        destroyed.extend(hits);

        let wall = reflect_off_walls(&mut ball.pos, &mut ball.vel, ball.radius, FIELD_WIDTH);
        if let Some(wall) = wall {
            events.push(GameEvent::WallBounce(wall));
        }
        if bounce_off_paddle(
            &mut ball.pos,
            &mut ball.vel,
            ball.radius,
            &paddle,
            PADDLE_STEER,
            max_dx,
        ) {
            events.push(GameEvent::PaddleBounce);
        }

        if ball.pos.y - ball.radius > FIELD_HEIGHT {
            state.balls.remove(i);
            continue;
        }

        ball.record_trail();
        ball.pos += ball.vel;
    }

    for event in events {
        state.push_event(event);
    }

    for brick in destroyed {
        state.score += brick.score();
        state.push_event(GameEvent::BrickDestroyed {
            column: brick.column,
            row: brick.row,
            cause: brick.cause,
        });
        powerup::maybe_spawn(state, brick.rect.center());
    }
}

/// Demo player: track the most dangerous ball, grab pickups when safe
fn autopilot(state: &GameState, input: &TickInput) -> TickInput {
    let mut input = input.clone();
    let half_width = state.paddle.width / 2.0;

    // Lowest descending ball
    let threat = state
        .balls
        .iter()
        .filter(|b| b.vel.y > 0.0)
        .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y));

    let safe = threat.is_none_or(|b| b.pos.y < FIELD_HEIGHT / 2.0);

    let target_pickup = if safe {
        state
            .pickups
            .iter()
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
            .map(|p| p.pos.x)
    } else {
        None
    };

    if let Some(x) = target_pickup {
        input.target_x = Some(x);
    } else if let Some(ball) = threat.or(state.balls.first()) {
        // Oscillating offset so the paddle doesn't settle into a perfect loop
        let time_factor = state.time_ticks as f32 * 0.01;
        let offset = (time_factor.sin() * 0.3 + (time_factor * 0.7).sin() * 0.15) * half_width;
        // Lead the ball slightly
        let lead = ball.pos + ball.vel * 4.0;
        input.target_x = Some(lead.x + offset);
    }

    input
}
