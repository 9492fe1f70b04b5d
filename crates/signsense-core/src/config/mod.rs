//! Configuration management for the signsense system.

mod sub_configs;

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::calibration::CalibrationSettings;
use crate::error::{SignError, SignResult};
use crate::types::{QualityThresholds, VoteThresholds};

pub use sub_configs::{
    CalibrationConfig, ClassifierConfig, LoggingConfig, QualityConfig, VoteConfig,
};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub quality: QualityConfig,
    #[serde(default)]
    pub vote: VoteConfig,
    #[serde(default)]
    pub calibration: CalibrationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from files and environment.
    ///
    /// Loaded in order:
    /// 1. config/default.toml (base settings)
    /// 2. config/{SIGNSENSE_ENV}.toml (environment-specific)
    /// 3. Environment variables with SIGNSENSE_ prefix
    pub fn load() -> SignResult<Self> {
        let env = std::env::var("SIGNSENSE_ENV").unwrap_or_else(|_| "development".to_string());

        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(config::Environment::with_prefix("SIGNSENSE").separator("__"));

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> SignResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SignError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| SignError::Config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> SignResult<()> {
        if self.classifier.reject_distance <= 0.0 {
            return Err(SignError::Config(
                "classifier.reject_distance must be positive".into(),
            ));
        }
        if self.classifier.neighbors == 0 {
            return Err(SignError::Config(
                "classifier.neighbors must be at least 1".into(),
            ));
        }
        if self.quality.brightness_min >= self.quality.brightness_max {
            return Err(SignError::Config(
                "quality.brightness_min must be below quality.brightness_max".into(),
            ));
        }
        if self.vote.window_size == 0 || self.vote.required_hits == 0 {
            return Err(SignError::Config(
                "vote.window_size and vote.required_hits must be at least 1".into(),
            ));
        }
        if self.vote.required_hits > self.vote.window_size {
            return Err(SignError::Config(
                "vote.required_hits cannot exceed vote.window_size".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.vote.min_confidence) {
            return Err(SignError::Config(
                "vote.min_confidence must be within [0, 1]".into(),
            ));
        }
        if self.calibration.min_samples > self.calibration.max_samples {
            return Err(SignError::Config(
                "calibration.min_samples cannot exceed calibration.max_samples".into(),
            ));
        }
        Ok(())
    }

    /// Runtime quality thresholds derived from this configuration.
    pub fn quality_thresholds(&self) -> QualityThresholds {
        QualityThresholds {
            brightness_min: self.quality.brightness_min,
            brightness_max: self.quality.brightness_max,
            contrast_min: self.quality.contrast_min,
        }
    }

    /// Runtime vote thresholds derived from this configuration.
    pub fn vote_thresholds(&self) -> VoteThresholds {
        VoteThresholds {
            window_size: self.vote.window_size,
            required_hits: self.vote.required_hits,
            min_confidence: self.vote.min_confidence,
            entry_ttl: Duration::from_millis(self.vote.entry_ttl_ms),
        }
    }

    /// Calibration session settings derived from this configuration.
    pub fn calibration_settings(&self) -> CalibrationSettings {
        CalibrationSettings {
            target_duration: Duration::from_secs(self.calibration.target_duration_secs),
            min_samples: self.calibration.min_samples,
            max_samples: self.calibration.max_samples,
        }
    }
}
