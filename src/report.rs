// src/report.rs

use crate::types::AnalysisResult;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Envelope written next to each analyzed recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub source: String,
    pub analyzed_at: DateTime<Utc>,
    pub truncated: bool,
    pub result: AnalysisResult,
}

impl AnalysisReport {
    pub fn new(source: &Path, result: AnalysisResult, truncated: bool) -> Self {
        Self {
            source: source.to_string_lossy().to_string(),
            analyzed_at: Utc::now(),
            truncated,
            result,
        }
    }
}

/// Where the report for `source` goes.
///
/// The recording's folder relative to `input_dir` is mirrored under
/// `output_dir`, so same-named recordings in different folders never collide.
/// `.jsonl` recordings map to `<stem>_analysis.json`; any other extension is
/// kept in the name (`set1.json` -> `set1_json_analysis.json`).
pub fn report_path(input_dir: &Path, output_dir: &Path, source: &Path) -> PathBuf {
    // Sources outside input_dir keep only their file name.
    let (folder, file) = match source.strip_prefix(input_dir) {
        Ok(relative) => (relative.parent(), relative),
        Err(_) => (None, source),
    };

    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "recording".to_string());
    let name = match file.extension().and_then(|e| e.to_str()) {
        Some(ext) if !ext.eq_ignore_ascii_case("jsonl") => {
            format!("{}_{}_analysis.json", stem, ext.to_ascii_lowercase())
        }
        _ => format!("{}_analysis.json", stem),
    };

    match folder.filter(|f| !f.as_os_str().is_empty()) {
        Some(folder) => output_dir.join(folder).join(name),
        None => output_dir.join(name),
    }
}

pub fn write_report(
    input_dir: &Path,
    output_dir: &Path,
    report: &AnalysisReport,
) -> Result<PathBuf> {
    let path = report_path(input_dir, output_dir, Path::new(&report.source));
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating output dir {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;

    info!("💾 Report written to: {}", path.display());
    Ok(path)
}
