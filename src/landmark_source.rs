// src/landmark_source.rs
//
// Recorded pose-estimator output on disk. A recording is JSON Lines, one
// frame per line, in frame order:
//
//   {"landmarks": [{"x": 0.51, "y": 0.32, "z": -0.1, "visibility": 0.98}, ...]}
//   {"landmarks": null}            <- estimator found no body in this frame

use crate::error::LandmarkSourceError;
use crate::pipeline::MovementEngine;
use crate::types::{AnalysisConfig, AnalysisResult, InputConfig, Landmark};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

const RECORDING_EXTENSIONS: [&str; 2] = ["jsonl", "json"];

/// One line of a recording.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PoseFrame {
    /// Informational only; line order decides frame order.
    #[serde(default)]
    pub frame: Option<u64>,
    #[serde(default)]
    pub landmarks: Option<Vec<Landmark>>,
}

pub struct LandmarkSource {
    config: InputConfig,
}

impl LandmarkSource {
    pub fn new(config: InputConfig) -> Self {
        Self { config }
    }

    pub fn find_recordings(&self) -> Result<Vec<PathBuf>> {
        let mut recordings = Vec::new();
        // Reports are written as .json under output_dir.
        let output_dir = fs::canonicalize(&self.config.output_dir).ok();

        for entry in WalkDir::new(&self.config.input_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                !(e.file_type().is_dir() && is_output_dir(e.path(), output_dir.as_deref()))
            })
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
                if RECORDING_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) {
                    recordings.push(path.to_path_buf());
                }
            }
        }

        info!("Found {} landmark recordings", recordings.len());
        Ok(recordings)
    }

    pub fn open_recording(&self, path: &Path) -> Result<RecordingReader<BufReader<File>>> {
        info!("Opening recording: {}", path.display());
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        Ok(RecordingReader::new(BufReader::new(file)))
    }
}

fn is_output_dir(path: &Path, output_dir: Option<&Path>) -> bool {
    match output_dir {
        Some(output_dir) => fs::canonicalize(path).is_ok_and(|p| p == output_dir),
        None => false,
    }
}

pub struct RecordingReader<R> {
    reader: R,
    line_no: usize,
    frames_read: u64,
    buf: String,
}

impl<R: BufRead> RecordingReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_no: 0,
            frames_read: 0,
            buf: String::new(),
        }
    }

    /// Next frame, or `None` at end of input. Blank lines are skipped.
    pub fn read_frame(&mut self) -> Result<Option<PoseFrame>, LandmarkSourceError> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let line = self.buf.trim();
            if line.is_empty() {
                continue;
            }

            let frame: PoseFrame = serde_json::from_str(line).map_err(|source| {
                LandmarkSourceError::MalformedFrame {
                    line: self.line_no,
                    source,
                }
            })?;
            self.frames_read += 1;
            return Ok(Some(frame));
        }
    }

    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }
}

#[derive(Debug, Clone)]
pub struct RecordingOutcome {
    pub result: AnalysisResult,
    /// Input was cut short by the processing timeout.
    pub truncated: bool,
}

/// Run one recording through a fresh engine.
///
/// Frames are pulled strictly in order. When `timeout` elapses the reader is
/// abandoned and whatever was seen so far is scored.
pub fn analyze_recording<R: BufRead>(
    mut reader: RecordingReader<R>,
    config: &AnalysisConfig,
    timeout: Option<Duration>,
) -> Result<RecordingOutcome> {
    let mut engine = MovementEngine::new(config.clone())?;
    let deadline = timeout.map(|t| Instant::now() + t);
    let mut truncated = false;

    loop {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            warn!(
                "⏱️  Processing timeout after {} frames, scoring partial recording",
                reader.frames_read()
            );
            truncated = true;
            break;
        }

        let Some(frame) = reader.read_frame()? else {
            break;
        };

        let outcome = engine.process_frame(frame.landmarks.as_deref());
        if outcome.repetition_completed {
            debug!(
                "Repetition {} closed at frame {}",
                outcome.repetitions, outcome.frame_index
            );
        }
    }

    Ok(RecordingOutcome {
        result: engine.finalize(),
        truncated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn landmarks_json(elbow_angle: f64) -> String {
        let theta = elbow_angle.to_radians();
        let mut points = vec![(0.5f64, 0.5f64); 33];
        for (shoulder, elbow, wrist, x) in [(11, 13, 15, 0.45), (12, 14, 16, 0.55)] {
            points[shoulder] = (x, 0.3);
            points[elbow] = (x, 0.45);
            points[wrist] = (x + 0.15 * theta.sin(), 0.45 - 0.15 * theta.cos());
        }
        points[23] = (0.45, 0.35);
        points[24] = (0.55, 0.35);

        let body: Vec<String> = points
            .iter()
            .map(|(x, y)| format!(r#"{{"x":{},"y":{},"z":0.0,"visibility":0.95}}"#, x, y))
            .collect();
        format!(r#"{{"landmarks":[{}]}}"#, body.join(","))
    }

    fn reader(text: String) -> RecordingReader<Cursor<Vec<u8>>> {
        RecordingReader::new(Cursor::new(text.into_bytes()))
    }

    #[test]
    fn test_reads_frames_and_skips_blank_lines() {
        let text = format!(
            "{}\n\n{{\"landmarks\": null}}\n{{\"frame\": 9}}\n",
            landmarks_json(170.0)
        );
        let mut reader = reader(text);

        let first = reader.read_frame().unwrap().unwrap();
        assert_eq!(first.landmarks.map(|l| l.len()), Some(33));

        let second = reader.read_frame().unwrap().unwrap();
        assert!(second.landmarks.is_none());

        let third = reader.read_frame().unwrap().unwrap();
        assert_eq!(third.frame, Some(9));
        assert!(third.landmarks.is_none());

        assert!(reader.read_frame().unwrap().is_none());
        assert_eq!(reader.frames_read(), 3);
    }

    #[test]
    fn test_visibility_defaults_to_full() {
        let mut reader = reader(r#"{"landmarks":[{"x":0.1,"y":0.2}]}"#.to_string());
        let frame = reader.read_frame().unwrap().unwrap();
        let lm = frame.landmarks.unwrap()[0];
        assert_eq!(lm.visibility, 1.0);
        assert_eq!(lm.z, 0.0);
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let text = format!("{}\n{{not json\n", landmarks_json(170.0));
        let mut reader = reader(text);

        assert!(reader.read_frame().is_ok());
        match reader.read_frame() {
            Err(LandmarkSourceError::MalformedFrame { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected malformed frame error, got {:?}", other),
        }
    }

    #[test]
    fn test_analyze_recording_end_to_end() {
        let angles = [170.0, 120.0, 80.0, 80.0, 130.0, 170.0, 170.0];
        let mut lines: Vec<String> = angles.iter().map(|&a| landmarks_json(a)).collect();
        lines.insert(2, r#"{"landmarks":null}"#.to_string());

        let outcome =
            analyze_recording(reader(lines.join("\n")), &AnalysisConfig::default(), None).unwrap();

        assert!(!outcome.truncated);
        assert_eq!(outcome.result.repetitions, 1);
        assert_eq!(outcome.result.frames_processed, 8);
        assert_eq!(outcome.result.frames_with_pose, 7);
        assert_eq!(outcome.result.phases.len(), 7);
    }

    #[test]
    fn test_zero_timeout_scores_nothing() {
        let lines: Vec<String> = (0..5).map(|_| landmarks_json(170.0)).collect();
        let outcome = analyze_recording(
            reader(lines.join("\n")),
            &AnalysisConfig::default(),
            Some(Duration::ZERO),
        )
        .unwrap();

        assert!(outcome.truncated);
        assert_eq!(outcome.result.frames_processed, 0);
        assert_eq!(outcome.result.ai_score, 0.0);
    }

    #[test]
    fn test_discovery_skips_output_dir_and_other_files() {
        let root = std::env::temp_dir()
            .join(format!("movement_discovery_test_{}", std::process::id()));
        let input = root.join("rec");
        let output = input.join("out");
        fs::create_dir_all(input.join("alice")).unwrap();
        fs::create_dir_all(&output).unwrap();

        fs::write(input.join("set1.jsonl"), landmarks_json(170.0)).unwrap();
        fs::write(input.join("alice").join("set1.JSONL"), landmarks_json(170.0)).unwrap();
        fs::write(input.join("notes.txt"), "not a recording").unwrap();
        fs::write(output.join("set1_analysis.json"), "{}").unwrap();

        let source = LandmarkSource::new(InputConfig {
            input_dir: input.to_string_lossy().to_string(),
            output_dir: output.to_string_lossy().to_string(),
            ..InputConfig::default()
        });
        let found = source.find_recordings().unwrap();

        assert_eq!(found.len(), 2, "found {:?}", found);
        assert!(found.iter().all(|p| !p.starts_with(&output)));

        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_invalid_config_fails_before_reading() {
        let config = AnalysisConfig {
            exercise: "plank".to_string(),
            ..AnalysisConfig::default()
        };
        assert!(analyze_recording(reader(String::new()), &config, None).is_err());
    }
}
