// src/analysis/mod.rs
//
// Movement analysis modules.
//
// Signal flow:
//   KeypointSet → exercise (joint angle) → state_machine → repetitions ─┐
//   KeypointSet → form_checker ─────────────────────────→ form flags ───┼→ scoring → ScoreCard
//                                          angle samples ───────────────┘
//
// Orchestrated by pipeline::MovementEngine.

pub mod exercise;
pub mod form_checker;
pub mod scoring;
pub mod state_machine;

pub use exercise::{analyzer_for, MovementAnalyzer, PushupAnalyzer};
pub use form_checker::{FormCheck, FormEvaluator, FormThresholds};
pub use scoring::{score_run, AngleStats, ScoreCard, NO_POSE_MESSAGE};
pub use state_machine::{PhaseStateMachine, PhaseThresholds};
