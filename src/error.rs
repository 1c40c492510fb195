// src/error.rs

use thiserror::Error;

/// Rejected analysis settings. Raised when an engine is built, never per frame.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} must be a finite, non-negative number (got {value})")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("confidence floor must lie in [0, 1] (got {0})")]
    ConfidenceFloorOutOfRange(f32),

    #[error("descend threshold {descend} must be greater than bottom threshold {bottom} and at most 180")]
    ThresholdOrder { descend: f64, bottom: f64 },

    #[error("base score cap must be positive (got {0})")]
    InvalidScoreCap(f64),

    #[error("unsupported exercise type: {0:?}")]
    UnsupportedExercise(String),
}

/// Failures while reading a recorded landmark stream from disk.
#[derive(Debug, Error)]
pub enum LandmarkSourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed frame at line {line}: {source}")]
    MalformedFrame {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}
