// src/pipeline/engine.rs
//
// Single entry point for one recording: call process_frame() for every frame
// in order, then finalize() once input ends. The engine has no notion of an
// expected frame count, so stopping early (timeout, cancellation) is simply a
// matter of calling finalize() sooner.

use super::frame_context::FrameOutcome;
use super::run::AnalysisRun;
use crate::analysis::{analyzer_for, score_run, FormEvaluator, FormThresholds, MovementAnalyzer};
use crate::error::ConfigError;
use crate::pose::extract_keypoints;
use crate::types::{AnalysisConfig, AnalysisResult, AngleSample, FormFlag, FrameSample, Landmark};
use tracing::{debug, info};

pub struct MovementEngine {
    config: AnalysisConfig,
    analyzer: Box<dyn MovementAnalyzer>,
    form: FormEvaluator,
    run: AnalysisRun,
}

impl MovementEngine {
    /// Build an engine for the exercise named in `config`.
    pub fn new(config: AnalysisConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let analyzer = analyzer_for(config.exercise_kind()?, &config);
        Self::build(config, analyzer)
    }

    /// Build an engine around a caller-supplied analyzer. The exercise and
    /// phase thresholds come from the analyzer; everything else from `config`.
    pub fn with_analyzer(
        mut config: AnalysisConfig,
        analyzer: Box<dyn MovementAnalyzer>,
    ) -> Result<Self, ConfigError> {
        config.exercise = analyzer.exercise().as_str().to_string();
        config.validate()?;
        Self::build(config, analyzer)
    }

    fn build(
        config: AnalysisConfig,
        analyzer: Box<dyn MovementAnalyzer>,
    ) -> Result<Self, ConfigError> {
        let thresholds = analyzer.phase_thresholds();
        if !(thresholds.bottom >= 0.0
            && thresholds.bottom < thresholds.descend
            && thresholds.descend <= 180.0)
        {
            return Err(ConfigError::ThresholdOrder {
                descend: thresholds.descend,
                bottom: thresholds.bottom,
            });
        }

        let form = FormEvaluator::new(
            FormThresholds {
                back_sag: config.back_sag_threshold,
                elbow_flare: config.elbow_flare_threshold,
            },
            analyzer.form_checks(),
        );

        info!(
            "✓ Movement engine ready: exercise={}, descend={:.1}°, bottom={:.1}°, confidence_floor={:.2}",
            analyzer.exercise(),
            thresholds.descend,
            thresholds.bottom,
            config.confidence_floor
        );

        Ok(Self {
            config,
            analyzer,
            form,
            run: AnalysisRun::new(thresholds),
        })
    }

    /// Feed the next frame. `None` means the estimator found no body.
    pub fn process_frame(&mut self, landmarks: Option<&[Landmark]>) -> FrameOutcome {
        let keypoints = extract_keypoints(landmarks);
        let pose_detected = !keypoints.is_empty();
        let frame_index = self.run.begin_frame(pose_detected);

        if !pose_detected {
            debug!("Frame {}: no pose detected", frame_index);
            return self.outcome(frame_index, false, None, false, Vec::new());
        }

        let frame = FrameSample {
            frame_index,
            keypoints,
        };

        let angle = self
            .analyzer
            .joint_angle(&frame.keypoints, self.config.confidence_floor);

        let repetition_completed = match angle {
            Some(angle) => self.run.record_angle(AngleSample { frame_index, angle }),
            None => {
                debug!(
                    "Frame {}: tracked joints below confidence floor, no angle sample",
                    frame_index
                );
                false
            }
        };

        let flags = self.form.evaluate(&frame);
        self.run.record_flags(&flags);

        self.outcome(frame_index, true, angle, repetition_completed, flags)
    }

    fn outcome(
        &self,
        frame_index: u64,
        pose_detected: bool,
        angle: Option<f64>,
        repetition_completed: bool,
        flags: Vec<FormFlag>,
    ) -> FrameOutcome {
        FrameOutcome {
            frame_index,
            pose_detected,
            angle,
            phase: self.run.phase(),
            repetitions: self.run.repetitions(),
            repetition_completed,
            flags,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn run(&self) -> &AnalysisRun {
        &self.run
    }

    pub fn analyzer(&self) -> &dyn MovementAnalyzer {
        self.analyzer.as_ref()
    }

    /// Score everything seen so far and close the run.
    pub fn finalize(self) -> AnalysisResult {
        let repetitions = self.run.repetitions();
        let card = score_run(
            repetitions,
            self.run.angles(),
            self.run.flags(),
            self.analyzer.depth_cue(),
            self.config.base_score_cap,
        );

        let frames_processed = self.run.frames_processed();
        let frames_with_pose = self.run.frames_with_pose();
        let cheat_detected = self.run.cheat_detected();
        let form_flags = self.run.flags().to_vec();
        let (mean_angle, angle_variance) = card
            .stats
            .map(|s| (s.mean, s.variance))
            .unwrap_or((0.0, 0.0));

        info!(
            "Run finished: {} frames ({} with pose), {} repetitions, score {:.1}, {} form flags{}",
            frames_processed,
            frames_with_pose,
            repetitions,
            card.score,
            form_flags.len(),
            if cheat_detected { ", CHEAT DETECTED" } else { "" }
        );

        AnalysisResult {
            exercise: self.analyzer.exercise(),
            frames_processed,
            frames_with_pose,
            repetitions,
            ai_score: card.score,
            mean_angle,
            angle_variance,
            average_depth: card.average_depth,
            form_consistency: card.consistency,
            cheat_detected,
            feedback: card.feedback,
            form_flags,
            phases: self.run.into_timeline(),
        }
    }
}
