// src/analysis/scoring.rs
//
// End-of-run aggregation:
//
//   avg_depth   = 180 − mean(angles)
//   consistency = population std-dev of angles
//   base        = min(cap, reps × 10)
//   score       = base × (1 + avg_depth / 90) × (1 − consistency / 180), clamped to [0, 100]

use crate::types::{AngleSample, FormFlag};

pub const MAX_SCORE: f64 = 100.0;
const POINTS_PER_REPETITION: f64 = 10.0;
const DEPTH_NORMALIZER: f64 = 90.0;
const CONSISTENCY_NORMALIZER: f64 = 180.0;

const SHALLOW_DEPTH: f64 = 45.0;
const INCONSISTENT_FORM: f64 = 20.0;
const REPETITIONS_FOR_PRAISE: u32 = 5;

pub const NO_POSE_MESSAGE: &str = "No pose detected in video";
const NO_REPETITIONS_MESSAGE: &str = "No complete repetitions detected";
const CONSISTENCY_MESSAGE: &str = "Work on maintaining consistent form throughout your set";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleStats {
    pub mean: f64,
    pub variance: f64,
}

impl AngleStats {
    pub fn from_samples(samples: &[AngleSample]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let n = samples.len() as f64;
        let mean = samples.iter().map(|s| s.angle).sum::<f64>() / n;
        let variance = samples
            .iter()
            .map(|s| (s.angle - mean).powi(2))
            .sum::<f64>()
            / n;

        Some(Self { mean, variance })
    }

    pub fn std_dev(&self) -> f64 {
        self.variance.sqrt()
    }

    pub fn average_depth(&self) -> f64 {
        180.0 - self.mean
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreCard {
    pub score: f64,
    pub stats: Option<AngleStats>,
    pub average_depth: f64,
    pub consistency: f64,
    pub feedback: Vec<String>,
}

pub fn compute_score(repetitions: u32, stats: &AngleStats, base_score_cap: f64) -> f64 {
    let base = (repetitions as f64 * POINTS_PER_REPETITION).min(base_score_cap);
    let score = base
        * (1.0 + stats.average_depth() / DEPTH_NORMALIZER)
        * (1.0 - stats.std_dev() / CONSISTENCY_NORMALIZER);

    // NaN and negative zero both collapse to a plain 0
    if score.is_nan() || score <= 0.0 {
        0.0
    } else {
        score.min(MAX_SCORE)
    }
}

/// Reduce a finished run to its score and ordered feedback.
pub fn score_run(
    repetitions: u32,
    samples: &[AngleSample],
    flags: &[FormFlag],
    depth_cue: &str,
    base_score_cap: f64,
) -> ScoreCard {
    let Some(stats) = AngleStats::from_samples(samples) else {
        let mut feedback = vec![NO_POSE_MESSAGE.to_string()];
        feedback.extend(flags.iter().map(|f| f.message.clone()));
        return ScoreCard {
            score: 0.0,
            stats: None,
            average_depth: 0.0,
            consistency: 0.0,
            feedback,
        };
    };

    let average_depth = stats.average_depth();
    let consistency = stats.std_dev();
    let mut feedback = Vec::new();

    if repetitions == 0 {
        feedback.push(NO_REPETITIONS_MESSAGE.to_string());
    } else if repetitions < REPETITIONS_FOR_PRAISE {
        feedback.push(format!(
            "Completed {} repetitions - keep practicing!",
            repetitions
        ));
    } else {
        feedback.push(format!("Great job! Completed {} repetitions", repetitions));
    }

    if average_depth < SHALLOW_DEPTH {
        feedback.push(depth_cue.to_string());
    }

    if consistency > INCONSISTENT_FORM {
        feedback.push(CONSISTENCY_MESSAGE.to_string());
    }

    feedback.extend(flags.iter().map(|f| f.message.clone()));

    ScoreCard {
        score: compute_score(repetitions, &stats, base_score_cap),
        stats: Some(stats),
        average_depth,
        consistency,
        feedback,
    }
}
