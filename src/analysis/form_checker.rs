// src/analysis/form_checker.rs
//
// Per-frame posture heuristics. Each check is a pure function of one frame's
// keypoints; the only state that outlives a frame (the sticky cheat flag)
// belongs to the run.

use crate::types::{FormFlag, FormFlagKind, FrameSample, JointId, KeypointSet};
use tracing::{debug, warn};

/// Horizontal image center the elbows are measured against.
const IMAGE_CENTER_X: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormCheck {
    BackSag,
    ElbowFlare,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormThresholds {
    pub back_sag: f32,
    pub elbow_flare: f32,
}

impl Default for FormThresholds {
    fn default() -> Self {
        Self {
            back_sag: 0.1,
            elbow_flare: 0.3,
        }
    }
}

/// How far the hips hang below the shoulders (image y grows downward).
///
/// `None` unless both shoulders and both hips are present.
pub fn hip_drop(keypoints: &KeypointSet) -> Option<f64> {
    let y = |joint| keypoints.get(joint).map(|kp| kp.y as f64);

    let shoulder_y = (y(JointId::LeftShoulder)? + y(JointId::RightShoulder)?) / 2.0;
    let hip_y = (y(JointId::LeftHip)? + y(JointId::RightHip)?) / 2.0;

    Some(hip_y - shoulder_y)
}

pub fn is_back_sagging(keypoints: &KeypointSet, threshold: f32) -> bool {
    hip_drop(keypoints).is_some_and(|drop| drop > threshold as f64)
}

/// True when any present elbow sits further than `threshold` from the center.
pub fn is_elbow_flaring(keypoints: &KeypointSet, threshold: f32) -> bool {
    [JointId::LeftElbow, JointId::RightElbow]
        .into_iter()
        .filter_map(|joint| keypoints.get(joint))
        .any(|elbow| (elbow.x as f64 - IMAGE_CENTER_X).abs() > threshold as f64)
}

pub struct FormEvaluator {
    thresholds: FormThresholds,
    checks: Vec<FormCheck>,
}

impl FormEvaluator {
    pub fn new(thresholds: FormThresholds, checks: &[FormCheck]) -> Self {
        Self {
            thresholds,
            checks: checks.to_vec(),
        }
    }

    /// Run every enabled check on one frame, in check order.
    pub fn evaluate(&self, frame: &FrameSample) -> Vec<FormFlag> {
        let mut flags = Vec::new();

        for check in &self.checks {
            match check {
                FormCheck::BackSag => {
                    if is_back_sagging(&frame.keypoints, self.thresholds.back_sag) {
                        warn!(
                            "⚠️  Back sag at frame {} (hip drop {:.3})",
                            frame.frame_index,
                            hip_drop(&frame.keypoints).unwrap_or_default()
                        );
                        flags.push(FormFlag::new(FormFlagKind::BackSag, frame.frame_index));
                    }
                }
                FormCheck::ElbowFlare => {
                    if is_elbow_flaring(&frame.keypoints, self.thresholds.elbow_flare) {
                        debug!("Elbow flare at frame {}", frame.frame_index);
                        flags.push(FormFlag::new(FormFlagKind::ElbowFlare, frame.frame_index));
                    }
                }
            }
        }

        flags
    }
}
