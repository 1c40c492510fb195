// src/types.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Numeric knobs of one analysis run. Fixed once an engine is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub exercise: String,
    /// Joint angle (degrees) below which a repetition starts descending.
    pub descend_threshold: f64,
    /// Joint angle (degrees) that marks the bottom of a repetition.
    pub bottom_threshold: f64,
    /// Minimum landmark visibility for a joint to take part in angle math.
    pub confidence_floor: f32,
    /// Normalized hip-below-shoulder drop that counts as a sagging back.
    pub back_sag_threshold: f32,
    /// Normalized elbow distance from the image center that counts as flaring.
    pub elbow_flare_threshold: f32,
    pub base_score_cap: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            exercise: "pushups".to_string(),
            descend_threshold: 160.0,
            bottom_threshold: 90.0,
            confidence_floor: 0.5,
            back_sag_threshold: 0.1,
            elbow_flare_threshold: 0.3,
            base_score_cap: 100.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub input_dir: String,
    pub output_dir: String,
    pub max_concurrent_runs: usize,
    /// Stop reading a recording after this long and score what was seen.
    pub processing_timeout_secs: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            input_dir: "recordings".to_string(),
            output_dir: "output".to_string(),
            max_concurrent_runs: 4,
            processing_timeout_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ============================================================================
// POSE INPUT
// ============================================================================

/// One landmark as reported by the pose estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
    #[serde(default = "full_visibility")]
    pub visibility: f32,
}

fn full_visibility() -> f32 {
    1.0
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32, visibility: f32) -> Self {
        Self {
            x,
            y,
            z,
            visibility,
        }
    }
}

/// Tracked anatomical joints, keyed by their index in the 33-point
/// BlazePose landmark topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointId {
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl JointId {
    pub const ALL: [JointId; 12] = [
        JointId::LeftShoulder,
        JointId::RightShoulder,
        JointId::LeftElbow,
        JointId::RightElbow,
        JointId::LeftWrist,
        JointId::RightWrist,
        JointId::LeftHip,
        JointId::RightHip,
        JointId::LeftKnee,
        JointId::RightKnee,
        JointId::LeftAnkle,
        JointId::RightAnkle,
    ];

    pub fn landmark_index(self) -> usize {
        match self {
            JointId::LeftShoulder => 11,
            JointId::RightShoulder => 12,
            JointId::LeftElbow => 13,
            JointId::RightElbow => 14,
            JointId::LeftWrist => 15,
            JointId::RightWrist => 16,
            JointId::LeftHip => 23,
            JointId::RightHip => 24,
            JointId::LeftKnee => 25,
            JointId::RightKnee => 26,
            JointId::LeftAnkle => 27,
            JointId::RightAnkle => 28,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Keypoint {
    pub joint: JointId,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub visibility: f32,
}

impl Keypoint {
    pub fn is_confident(&self, floor: f32) -> bool {
        self.visibility >= floor
    }
}

/// The tracked joints found in one frame, iterated in joint order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeypointSet {
    points: BTreeMap<JointId, Keypoint>,
}

impl KeypointSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, keypoint: Keypoint) {
        self.points.insert(keypoint.joint, keypoint);
    }

    pub fn get(&self, joint: JointId) -> Option<&Keypoint> {
        self.points.get(&joint)
    }

    pub fn contains(&self, joint: JointId) -> bool {
        self.points.contains_key(&joint)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Keypoint> {
        self.points.values()
    }
}

#[derive(Debug, Clone)]
pub struct FrameSample {
    pub frame_index: u64,
    pub keypoints: KeypointSet,
}

// ============================================================================
// RUN STATE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleSample {
    pub frame_index: u64,
    pub angle: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseState {
    Top,
    Descending,
    Bottom,
    Ascending,
}

impl PhaseState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseState::Top => "top",
            PhaseState::Descending => "descending",
            PhaseState::Bottom => "bottom",
            PhaseState::Ascending => "ascending",
        }
    }
}

impl fmt::Display for PhaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit trail entry: the phase held after `angle` was consumed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub frame: u64,
    pub phase: PhaseState,
    pub angle: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormFlagKind {
    BackSag,
    ElbowFlare,
}

impl FormFlagKind {
    pub fn message(&self) -> &'static str {
        match self {
            FormFlagKind::BackSag => "Keep your back straight - don't let your hips sag",
            FormFlagKind::ElbowFlare => "Keep your elbows closer to your body",
        }
    }

    /// Serious violations mark the whole run as cheated; the rest are advisory.
    pub fn is_cheat(&self) -> bool {
        matches!(self, FormFlagKind::BackSag)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormFlag {
    pub kind: FormFlagKind,
    pub frame: u64,
    pub message: String,
}

impl FormFlag {
    pub fn new(kind: FormFlagKind, frame: u64) -> Self {
        Self {
            kind,
            frame,
            message: kind.message().to_string(),
        }
    }
}

// ============================================================================
// OUTPUT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseKind {
    Pushups,
}

impl ExerciseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseKind::Pushups => "pushups",
        }
    }
}

impl std::str::FromStr for ExerciseKind {
    type Err = crate::error::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pushups" | "pushup" | "push-ups" | "push_ups" => Ok(ExerciseKind::Pushups),
            _ => Err(crate::error::ConfigError::UnsupportedExercise(s.to_string())),
        }
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal aggregate of one run, handed to persistence as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub exercise: ExerciseKind,
    pub frames_processed: u64,
    pub frames_with_pose: u64,
    pub repetitions: u32,
    pub ai_score: f64,
    pub mean_angle: f64,
    pub angle_variance: f64,
    pub average_depth: f64,
    pub form_consistency: f64,
    pub cheat_detected: bool,
    pub feedback: Vec<String>,
    pub form_flags: Vec<FormFlag>,
    pub phases: Vec<PhaseRecord>,
}
