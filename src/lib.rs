// src/lib.rs
//
// Exercise assessment from per-frame pose landmarks: joint angles, a phase
// state machine that counts repetitions, posture checks, and a final score.

pub mod analysis;
pub mod config;
pub mod error;
pub mod landmark_source;
pub mod pipeline;
pub mod pose;
pub mod report;
pub mod types;

pub use error::{ConfigError, LandmarkSourceError};
pub use pipeline::{AnalysisRun, FrameOutcome, MovementEngine};
pub use types::{AnalysisConfig, AnalysisResult, Config, ExerciseKind, Landmark};
