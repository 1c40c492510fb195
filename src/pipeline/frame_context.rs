// src/pipeline/frame_context.rs
//
// What a single frame contributed to the run. Returned by
// MovementEngine::process_frame for callers that want live progress.

use crate::types::{FormFlag, PhaseState};

#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutcome {
    pub frame_index: u64,
    pub pose_detected: bool,
    /// Tracked joint angle, absent when no side cleared the confidence floor.
    pub angle: Option<f64>,
    pub phase: PhaseState,
    pub repetitions: u32,
    pub repetition_completed: bool,
    pub flags: Vec<FormFlag>,
}

impl FrameOutcome {
    pub fn has_flags(&self) -> bool {
        !self.flags.is_empty()
    }
}
