// src/analysis/exercise.rs
//
// Per-exercise capability sets. The phase machine, form evaluator and scorer
// stay exercise-agnostic; an analyzer tells them which joint angle to track,
// where the phase thresholds sit, and which posture checks apply.

use super::form_checker::FormCheck;
use super::state_machine::PhaseThresholds;
use crate::pose::{paired_joint_angle, JointTriple};
use crate::types::{AnalysisConfig, ExerciseKind, JointId, KeypointSet};

pub trait MovementAnalyzer: Send + Sync {
    fn exercise(&self) -> ExerciseKind;

    /// The tracked joint angle for one frame, or `None` when it can't be measured.
    fn joint_angle(&self, keypoints: &KeypointSet, confidence_floor: f32) -> Option<f64>;

    fn phase_thresholds(&self) -> PhaseThresholds;

    fn form_checks(&self) -> &[FormCheck];

    /// Feedback shown when the average range of motion is too shallow.
    fn depth_cue(&self) -> &'static str;
}

const LEFT_ELBOW: JointTriple =
    JointTriple::new(JointId::LeftShoulder, JointId::LeftElbow, JointId::LeftWrist);
const RIGHT_ELBOW: JointTriple = JointTriple::new(
    JointId::RightShoulder,
    JointId::RightElbow,
    JointId::RightWrist,
);

const PUSHUP_CHECKS: [FormCheck; 2] = [FormCheck::BackSag, FormCheck::ElbowFlare];

/// Push-ups: elbow flexion drives the phases.
pub struct PushupAnalyzer {
    thresholds: PhaseThresholds,
}

impl PushupAnalyzer {
    pub fn new(thresholds: PhaseThresholds) -> Self {
        Self { thresholds }
    }
}

impl Default for PushupAnalyzer {
    fn default() -> Self {
        Self::new(PhaseThresholds::default())
    }
}

impl MovementAnalyzer for PushupAnalyzer {
    fn exercise(&self) -> ExerciseKind {
        ExerciseKind::Pushups
    }

    fn joint_angle(&self, keypoints: &KeypointSet, confidence_floor: f32) -> Option<f64> {
        paired_joint_angle(keypoints, LEFT_ELBOW, RIGHT_ELBOW, confidence_floor)
    }

    fn phase_thresholds(&self) -> PhaseThresholds {
        self.thresholds
    }

    fn form_checks(&self) -> &[FormCheck] {
        &PUSHUP_CHECKS
    }

    fn depth_cue(&self) -> &'static str {
        "Try to go deeper in your pushups for full range of motion"
    }
}

/// Build the analyzer for a configured exercise kind.
pub fn analyzer_for(kind: ExerciseKind, config: &AnalysisConfig) -> Box<dyn MovementAnalyzer> {
    let thresholds = PhaseThresholds {
        descend: config.descend_threshold,
        bottom: config.bottom_threshold,
    };

    match kind {
        ExerciseKind::Pushups => Box::new(PushupAnalyzer::new(thresholds)),
    }
}
