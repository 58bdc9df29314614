//! Error types for configuration and level selection

use thiserror::Error;

/// Errors raised while loading configuration or selecting a level.
///
/// None of these abort a running session: a rejected request leaves the
/// current state untouched.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Level {level} does not exist (available: 1..={available})")]
    InvalidLevel { level: u32, available: usize },

    #[error("Level {level} pattern has {actual} cells, expected {expected}")]
    PatternSize {
        level: u32,
        expected: usize,
        actual: usize,
    },

    #[error("Level {level} has no bricks")]
    EmptyPattern { level: u32 },

    #[error("Level {level}: {field} must be positive, got {value}")]
    NonPositive {
        level: u32,
        field: &'static str,
        value: f32,
    },

    #[error("Tuning value {field} is out of range: {value}")]
    Tuning { field: &'static str, value: f32 },

    #[error("No levels configured")]
    NoLevels,

    #[error("Failed to read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
