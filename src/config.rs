//! Level table and gameplay tuning
//!
//! Loaded from JSON (any missing field falls back to the defaults below).
//! The simulation treats a loaded config as immutable input.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{BRICK_COLUMNS, BRICK_ROWS};
use crate::error::ConfigError;

/// Number of cells in a brick pattern (row-major, `row * columns + column`)
pub const PATTERN_CELLS: usize = BRICK_ROWS * BRICK_COLUMNS;

/// One entry of the level table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Display name
    pub name: String,
    /// Paddle width multiplier applied to the base width
    pub paddle_width_ratio: f32,
    /// Ball speed multiplier applied to the base speed
    pub speed_ratio: f32,
    /// Brick layout: non-zero cells start alive
    pub pattern: Vec<u8>,
}

impl LevelConfig {
    /// Number of bricks this level starts with
    pub fn brick_count(&self) -> usize {
        self.pattern.iter().filter(|&&cell| cell != 0).count()
    }

    fn validate(&self, level: u32) -> Result<(), ConfigError> {
        if self.pattern.len() != PATTERN_CELLS {
            return Err(ConfigError::PatternSize {
                level,
                expected: PATTERN_CELLS,
                actual: self.pattern.len(),
            });
        }
        if self.brick_count() == 0 {
            return Err(ConfigError::EmptyPattern { level });
        }
        if !(self.paddle_width_ratio > 0.0) {
            return Err(ConfigError::NonPositive {
                level,
                field: "paddle_width_ratio",
                value: self.paddle_width_ratio,
            });
        }
        if !(self.speed_ratio > 0.0) {
            return Err(ConfigError::NonPositive {
                level,
                field: "speed_ratio",
                value: self.speed_ratio,
            });
        }
        Ok(())
    }
}

/// Gameplay balance values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Lives at the start of a game
    pub initial_lives: u8,
    /// Chance that a destroyed brick drops a power-up (0.0 - 1.0)
    pub powerup_probability: f32,
    pub widen_duration_ms: f32,
    pub enlarge_duration_ms: f32,
    pub incendiary_duration_ms: f32,
    pub magnet_duration_ms: f32,
    /// Magnet pull radius around the paddle center (pixels)
    pub magnet_range: f32,
    /// Velocity nudge at zero distance (pixels/frame per frame). A ball
    /// leaving the paddle at speed `v` escapes the pull only while
    /// `strength * range / 2 < v * v / 2`.
    pub magnet_strength: f32,
    /// Interval between brick field descents
    pub descent_interval_ms: f32,
    /// Delay between clearing a level and starting the next one
    pub level_transition_ms: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            initial_lives: 3,
            powerup_probability: 0.15,

            widen_duration_ms: 10_000.0,
            enlarge_duration_ms: 10_000.0,
            incendiary_duration_ms: 10_000.0,
            magnet_duration_ms: 10_000.0,

            magnet_range: 150.0,
            magnet_strength: 0.05,

            descent_interval_ms: 10_000.0,
            level_transition_ms: 2_000.0,
        }
    }
}

impl Tuning {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.powerup_probability) {
            return Err(ConfigError::Tuning {
                field: "powerup_probability",
                value: self.powerup_probability,
            });
        }
        if self.initial_lives == 0 {
            return Err(ConfigError::Tuning {
                field: "initial_lives",
                value: 0.0,
            });
        }
        let positive = [
            ("widen_duration_ms", self.widen_duration_ms),
            ("enlarge_duration_ms", self.enlarge_duration_ms),
            ("incendiary_duration_ms", self.incendiary_duration_ms),
            ("magnet_duration_ms", self.magnet_duration_ms),
            ("magnet_range", self.magnet_range),
            ("descent_interval_ms", self.descent_interval_ms),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::Tuning { field, value });
            }
        }
        if self.level_transition_ms < 0.0 {
            return Err(ConfigError::Tuning {
                field: "level_transition_ms",
                value: self.level_transition_ms,
            });
        }
        Ok(())
    }
}

/// Complete game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Ordered level table (level 1 is `levels[0]`)
    pub levels: Vec<LevelConfig>,
    pub tuning: Tuning,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            levels: vec![
                LevelConfig {
                    name: "Level 1 (Easy)".to_string(),
                    paddle_width_ratio: 2.0,
                    speed_ratio: 1.0,
                    pattern: vec![1; PATTERN_CELLS],
                },
                LevelConfig {
                    name: "Level 2 (Normal)".to_string(),
                    paddle_width_ratio: 1.0,
                    speed_ratio: 1.5,
                    pattern: vec![
                        1, 0, 1, 0, 0, 1, 0, 1, //
                        1, 1, 0, 1, 1, 0, 1, 1, //
                        0, 1, 1, 1, 1, 1, 1, 0, //
                        1, 1, 1, 0, 0, 1, 1, 1, //
                        1, 0, 1, 1, 1, 1, 0, 1,
                    ],
                },
                LevelConfig {
                    name: "Level 3 (Hard)".to_string(),
                    paddle_width_ratio: 0.8,
                    speed_ratio: 2.0,
                    pattern: vec![
                        1, 0, 0, 0, 0, 0, 0, 1, //
                        0, 1, 0, 0, 0, 0, 1, 0, //
                        0, 0, 1, 0, 0, 1, 0, 0, //
                        0, 0, 0, 1, 1, 0, 0, 0, //
                        0, 1, 0, 0, 0, 0, 0, 1,
                    ],
                },
            ],
            tuning: Tuning::default(),
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        log::info!("Loaded config with {} levels", config.levels.len());
        Ok(config)
    }

    /// Load a JSON config from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Check every level and the tuning block
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.levels.is_empty() {
            return Err(ConfigError::NoLevels);
        }
        for (i, level) in self.levels.iter().enumerate() {
            level.validate(i as u32 + 1)?;
        }
        self.tuning.validate()
    }

    /// Look up a 1-based level
    pub fn level(&self, level: u32) -> Result<&LevelConfig, ConfigError> {
        level
            .checked_sub(1)
            .and_then(|i| self.levels.get(i as usize))
            .ok_or(ConfigError::InvalidLevel {
                level,
                available: self.levels.len(),
            })
    }

    /// Level that follows `level`, wrapping to the first after the last
    pub fn next_level(&self, level: u32) -> u32 {
        if level as usize >= self.levels.len() {
            1
        } else {
            level + 1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.levels.len(), 3);
        assert_eq!(config.levels[0].brick_count(), 40);
        assert_eq!(config.levels[1].brick_count(), 28);
        assert_eq!(config.levels[2].brick_count(), 10);
    }

    #[test]
    fn test_level_lookup() {
        let config = GameConfig::default();
        assert_eq!(config.level(2).unwrap().speed_ratio, 1.5);
        assert!(matches!(
            config.level(0),
            Err(ConfigError::InvalidLevel { level: 0, available: 3 })
        ));
        assert!(config.level(4).is_err());
        assert_eq!(config.next_level(1), 2);
        assert_eq!(config.next_level(3), 1);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = GameConfig::from_json(r#"{ "tuning": { "initial_lives": 5 } }"#).unwrap();
        assert_eq!(config.tuning.initial_lives, 5);
        assert_eq!(config.tuning.powerup_probability, 0.15);
        assert_eq!(config.levels.len(), 3);
    }

    #[test]
    fn test_rejects_bad_pattern() {
        let json = r#"{ "levels": [
            { "name": "tiny", "paddle_width_ratio": 1.0, "speed_ratio": 1.0, "pattern": [1, 1] }
        ] }"#;
        assert!(matches!(
            GameConfig::from_json(json),
            Err(ConfigError::PatternSize { level: 1, actual: 2, .. })
        ));
    }

    #[test]
    fn test_rejects_bad_tuning() {
        let json = r#"{ "tuning": { "powerup_probability": 1.5 } }"#;
        assert!(matches!(
            GameConfig::from_json(json),
            Err(ConfigError::Tuning { field: "powerup_probability", .. })
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            GameConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
