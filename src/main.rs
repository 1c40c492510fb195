// src/main.rs

use anyhow::Result;
use movement_analysis::landmark_source::{analyze_recording, LandmarkSource};
use movement_analysis::pipeline::PipelineMetrics;
use movement_analysis::report::{write_report, AnalysisReport};
use movement_analysis::types::{AnalysisConfig, Config};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path =
        std::env::var("MOVEMENT_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());
    let config = Config::load(&config_path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("movement_analysis={}", config.logging.level))
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("🏋️ Movement Analysis Starting");
    info!("✓ Configuration loaded from {}", config_path);
    info!(
        "Thresholds: descend={:.1}°, bottom={:.1}°, confidence_floor={:.2}, back_sag={:.2}, elbow_flare={:.2}",
        config.analysis.descend_threshold,
        config.analysis.bottom_threshold,
        config.analysis.confidence_floor,
        config.analysis.back_sag_threshold,
        config.analysis.elbow_flare_threshold
    );

    let source = Arc::new(LandmarkSource::new(config.input.clone()));
    let recordings = source.find_recordings()?;

    if recordings.is_empty() {
        error!("No landmark recordings found in {}", config.input.input_dir);
        return Ok(());
    }

    let metrics = PipelineMetrics::new();
    let permits = Arc::new(Semaphore::new(config.input.max_concurrent_runs));
    let timeout = Duration::from_secs(config.input.processing_timeout_secs);
    let input_dir = PathBuf::from(&config.input.input_dir);
    let output_dir = PathBuf::from(&config.input.output_dir);

    let mut handles = Vec::with_capacity(recordings.len());
    for path in recordings {
        let permit = permits.clone().acquire_owned().await?;
        let source = source.clone();
        let analysis = config.analysis.clone();
        let input_dir = input_dir.clone();
        let output_dir = output_dir.clone();
        let metrics = metrics.clone();

        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let outcome =
                process_recording(&path, &source, &analysis, timeout, &input_dir, &output_dir);
            (path, outcome, metrics)
        });
        handles.push(handle);
    }

    for handle in handles {
        let (path, outcome, metrics) = handle.await?;
        match outcome {
            Ok(report) => {
                metrics.record_result(&report.result, report.truncated);
                log_report(&report);
            }
            Err(e) => {
                metrics.inc(&metrics.recordings_failed);
                error!("Failed to analyze {}: {:#}", path.display(), e);
            }
        }
    }

    let summary = metrics.summary();
    info!("\n========================================");
    info!(
        "Recordings: {} analyzed, {} failed, {} truncated",
        summary.recordings_analyzed, summary.recordings_failed, summary.recordings_truncated
    );
    info!(
        "Frames: {} total, {} with pose ({:.1} FPS)",
        summary.total_frames, summary.frames_with_pose, summary.fps
    );
    info!(
        "Repetitions: {} | Form flags: {} | Runs with cheating: {}",
        summary.repetitions, summary.form_flags, summary.cheat_runs
    );
    info!("========================================\n");

    Ok(())
}

fn process_recording(
    path: &Path,
    source: &LandmarkSource,
    analysis: &AnalysisConfig,
    timeout: Duration,
    input_dir: &Path,
    output_dir: &Path,
) -> Result<AnalysisReport> {
    let reader = source.open_recording(path)?;
    let outcome = analyze_recording(reader, analysis, Some(timeout))?;

    let report = AnalysisReport::new(path, outcome.result, outcome.truncated);
    write_report(input_dir, output_dir, &report)?;
    Ok(report)
}

fn log_report(report: &AnalysisReport) {
    let result = &report.result;

    info!("✓ {} analyzed", report.source);
    info!(
        "  Frames: {} ({} with pose, {:.1}%)",
        result.frames_processed,
        result.frames_with_pose,
        100.0 * result.frames_with_pose as f64 / result.frames_processed.max(1) as f64
    );
    info!("  Repetitions: {}", result.repetitions);
    info!(
        "  Score: {:.1} (depth {:.1}°, consistency {:.1}°)",
        result.ai_score, result.average_depth, result.form_consistency
    );

    if result.cheat_detected {
        warn!("  🚨 CHEAT DETECTED ({} form flags)", result.form_flags.len());
    } else if !result.form_flags.is_empty() {
        warn!("  ⚠️  {} form advisories", result.form_flags.len());
    }
    if report.truncated {
        warn!("  ⏱️  Recording truncated by processing timeout");
    }
    for message in &result.feedback {
        info!("  • {}", message);
    }
}
