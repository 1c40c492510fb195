// src/pipeline/mod.rs

pub mod engine;
pub mod frame_context;
pub mod metrics;
pub mod run;

pub use engine::MovementEngine;
pub use frame_context::FrameOutcome;
pub use metrics::{MetricsSummary, PipelineMetrics};
pub use run::AnalysisRun;
