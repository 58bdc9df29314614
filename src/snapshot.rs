//! Read-only frame view for renderers
//!
//! Renderers never touch `GameState` directly; they draw from a snapshot
//! captured after each frame. Snapshots serialize to JSON for external
//! front ends.

use glam::Vec2;
use serde::Serialize;

use crate::sim::collision::Rect;
use crate::sim::powerup::PowerUpKind;
use crate::sim::state::{GamePhase, GameState};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BallView {
    pub pos: Vec2,
    pub radius: f32,
    pub enlarged: bool,
    pub incendiary: bool,
    /// Recent positions, newest first
    pub trail: Vec<Vec2>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrickView {
    pub column: usize,
    pub row: usize,
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerUpView {
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub radius: f32,
    pub color: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectView {
    pub kind: PowerUpKind,
    pub active: bool,
    pub remaining_ms: f32,
}

/// Everything a renderer or HUD needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSnapshot {
    pub phase: GamePhase,
    pub level: u32,
    pub level_name: String,
    pub stage: u32,
    pub score: u64,
    pub lives: u8,
    pub paddle: Rect,
    pub balls: Vec<BallView>,
    /// Alive bricks only
    pub bricks: Vec<BrickView>,
    pub bricks_remaining: usize,
    pub powerups: Vec<PowerUpView>,
    pub effects: Vec<EffectView>,
    /// Time until the next descent (None when the hazard is cancelled)
    pub next_descent_ms: Option<f32>,
}

impl FrameSnapshot {
    pub fn capture(state: &GameState) -> Self {
        Self {
            phase: state.phase,
            level: state.level,
            level_name: state.level_name().to_string(),
            stage: state.stage,
            score: state.score,
            lives: state.lives,
            paddle: state.paddle.rect(),
            balls: state
                .balls
                .iter()
                .map(|b| BallView {
                    pos: b.pos,
                    radius: b.radius,
                    enlarged: b.enlarged,
                    incendiary: b.incendiary,
                    trail: b.trail.clone(),
                })
                .collect(),
            bricks: state
                .bricks
                .alive()
                .map(|b| BrickView {
                    column: b.column,
                    row: b.row,
                    rect: state.bricks.rect(b.column, b.row),
                })
                .collect(),
            bricks_remaining: state.bricks.alive_count(),
            powerups: state
                .pickups
                .iter()
                .map(|p| PowerUpView {
                    kind: p.kind,
                    pos: p.pos,
                    radius: p.radius,
                    color: p.color,
                })
                .collect(),
            effects: state
                .effects
                .iter()
                .filter(|(kind, _)| *kind != PowerUpKind::SplitBall)
                .map(|(kind, effect)| EffectView {
                    kind,
                    active: effect.is_active(),
                    remaining_ms: effect.remaining_ms(),
                })
                .collect(),
            next_descent_ms: state.hazard.remaining_ms(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl GameState {
    /// Capture a read-only view of the current frame
    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot::capture(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::powerup::activate;

    #[test]
    fn test_snapshot_reflects_state() {
        let mut state = GameState::new(GameConfig::default(), 3).unwrap();
        activate(&mut state, PowerUpKind::MagnetPaddle);
        let snap = state.snapshot();

        assert_eq!(snap.level, 1);
        assert_eq!(snap.lives, 3);
        assert_eq!(snap.bricks.len(), 40);
        assert_eq!(snap.bricks_remaining, 40);
        assert_eq!(snap.balls.len(), 1);
        assert_eq!(snap.paddle, state.paddle.rect());
        assert_eq!(snap.effects.len(), 4);
        assert!(
            snap.effects
                .iter()
                .any(|e| e.kind == PowerUpKind::MagnetPaddle && e.active)
        );
        assert!(snap.next_descent_ms.is_some());
    }

    #[test]
    fn test_snapshot_serializes() {
        let state = GameState::new(GameConfig::default(), 3).unwrap();
        let json = state.snapshot().to_json().unwrap();
        assert!(json.contains("\"level_name\":\"Level 1 (Easy)\""));
        assert!(json.contains("\"phase\":\"Playing\""));
    }
}
