// src/config.rs

use crate::error::ConfigError;
use crate::types::{AnalysisConfig, Config, ExerciseKind};
use anyhow::{Context, Result};
use std::fs;

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("reading config file {}", path))?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.analysis.validate()?;
        if self.input.max_concurrent_runs == 0 {
            anyhow::bail!("input.max_concurrent_runs must be at least 1");
        }
        if self.input.processing_timeout_secs == 0 {
            anyhow::bail!("input.processing_timeout_secs must be at least 1");
        }
        Ok(())
    }
}

impl AnalysisConfig {
    /// Rejects settings that would make the phase machine or scoring meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.exercise_kind()?;

        check_non_negative("descend_threshold", self.descend_threshold)?;
        check_non_negative("bottom_threshold", self.bottom_threshold)?;
        check_non_negative("back_sag_threshold", self.back_sag_threshold as f64)?;
        check_non_negative("elbow_flare_threshold", self.elbow_flare_threshold as f64)?;

        if !(0.0..=1.0).contains(&self.confidence_floor) {
            return Err(ConfigError::ConfidenceFloorOutOfRange(self.confidence_floor));
        }

        // Bottom must sit strictly below descend, otherwise one sample could cycle forever.
        if self.bottom_threshold >= self.descend_threshold || self.descend_threshold > 180.0 {
            return Err(ConfigError::ThresholdOrder {
                descend: self.descend_threshold,
                bottom: self.bottom_threshold,
            });
        }

        if !self.base_score_cap.is_finite() || self.base_score_cap <= 0.0 {
            return Err(ConfigError::InvalidScoreCap(self.base_score_cap));
        }

        Ok(())
    }

    pub fn exercise_kind(&self) -> Result<ExerciseKind, ConfigError> {
        self.exercise.parse()
    }
}

fn check_non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidThreshold { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.analysis.exercise_kind(), Ok(ExerciseKind::Pushups));
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = "analysis:\n  confidence_floor: 0.3\ninput:\n  input_dir: clips\n";
        let config = Config::from_yaml(yaml).expect("partial config should load");

        assert_eq!(config.analysis.confidence_floor, 0.3);
        assert_eq!(config.analysis.descend_threshold, 160.0);
        assert_eq!(config.analysis.bottom_threshold, 90.0);
        assert_eq!(config.input.input_dir, "clips");
        assert_eq!(config.input.output_dir, "output");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let config = AnalysisConfig {
            back_sag_threshold: -0.1,
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidThreshold {
                name: "back_sag_threshold",
                ..
            })
        ));
    }

    #[test]
    fn test_confidence_floor_out_of_range() {
        let config = AnalysisConfig {
            confidence_floor: 1.5,
            ..AnalysisConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ConfidenceFloorOutOfRange(1.5))
        );
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let config = AnalysisConfig {
            descend_threshold: 80.0,
            bottom_threshold: 90.0,
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ThresholdOrder { .. })
        ));
    }

    #[test]
    fn test_unsupported_exercise_rejected() {
        let config = AnalysisConfig {
            exercise: "burpees".to_string(),
            ..AnalysisConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnsupportedExercise("burpees".to_string()))
        );
    }

    #[test]
    fn test_zero_processing_timeout_rejected() {
        let yaml = "input:\n  processing_timeout_secs: 0\n";
        let err = Config::from_yaml(yaml).unwrap_err();
        assert!(
            err.to_string().contains("processing_timeout_secs"),
            "unexpected error: {}",
            err
        );

        let yaml = "input:\n  processing_timeout_secs: 1\n";
        assert!(Config::from_yaml(yaml).is_ok());
    }

    #[test]
    fn test_yaml_with_bad_values_fails_to_load() {
        let yaml = "analysis:\n  descend_threshold: 60.0\n";
        assert!(Config::from_yaml(yaml).is_err());

        let yaml = "input:\n  max_concurrent_runs: 0\n";
        assert!(Config::from_yaml(yaml).is_err());
    }
}
