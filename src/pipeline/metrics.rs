// src/pipeline/metrics.rs
//
// Batch-level counters shared by concurrently running analyses. Each run
// reports into these after it finalizes; runs never read each other's state.

use crate::types::AnalysisResult;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct PipelineMetrics {
    pub recordings_analyzed: Arc<AtomicU64>,
    pub recordings_failed: Arc<AtomicU64>,
    pub recordings_truncated: Arc<AtomicU64>,
    pub total_frames: Arc<AtomicU64>,
    pub frames_with_pose: Arc<AtomicU64>,
    pub repetitions: Arc<AtomicU64>,
    pub form_flags: Arc<AtomicU64>,
    pub cheat_runs: Arc<AtomicU64>,
    pub started_at: Instant,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            recordings_analyzed: Arc::new(AtomicU64::new(0)),
            recordings_failed: Arc::new(AtomicU64::new(0)),
            recordings_truncated: Arc::new(AtomicU64::new(0)),
            total_frames: Arc::new(AtomicU64::new(0)),
            frames_with_pose: Arc::new(AtomicU64::new(0)),
            repetitions: Arc::new(AtomicU64::new(0)),
            form_flags: Arc::new(AtomicU64::new(0)),
            cheat_runs: Arc::new(AtomicU64::new(0)),
            started_at: Instant::now(),
        }
    }

    pub fn inc(&self, counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_result(&self, result: &AnalysisResult, truncated: bool) {
        self.inc(&self.recordings_analyzed);
        if truncated {
            self.inc(&self.recordings_truncated);
        }
        if result.cheat_detected {
            self.inc(&self.cheat_runs);
        }
        self.total_frames
            .fetch_add(result.frames_processed, Ordering::Relaxed);
        self.frames_with_pose
            .fetch_add(result.frames_with_pose, Ordering::Relaxed);
        self.repetitions
            .fetch_add(result.repetitions as u64, Ordering::Relaxed);
        self.form_flags
            .fetch_add(result.form_flags.len() as u64, Ordering::Relaxed);
    }

    pub fn fps(&self) -> f64 {
        let frames = self.total_frames.load(Ordering::Relaxed);
        let elapsed = self.started_at.elapsed().as_secs_f64();
        if elapsed > 0.01 {
            frames as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            recordings_analyzed: self.recordings_analyzed.load(Ordering::Relaxed),
            recordings_failed: self.recordings_failed.load(Ordering::Relaxed),
            recordings_truncated: self.recordings_truncated.load(Ordering::Relaxed),
            total_frames: self.total_frames.load(Ordering::Relaxed),
            frames_with_pose: self.frames_with_pose.load(Ordering::Relaxed),
            repetitions: self.repetitions.load(Ordering::Relaxed),
            form_flags: self.form_flags.load(Ordering::Relaxed),
            cheat_runs: self.cheat_runs.load(Ordering::Relaxed),
            fps: self.fps(),
            elapsed_secs: self.started_at.elapsed().as_secs_f64(),
        }
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSummary {
    pub recordings_analyzed: u64,
    pub recordings_failed: u64,
    pub recordings_truncated: u64,
    pub total_frames: u64,
    pub frames_with_pose: u64,
    pub repetitions: u64,
    pub form_flags: u64,
    pub cheat_runs: u64,
    pub fps: f64,
    pub elapsed_secs: f64,
}
