//! Sub-configuration structures for the signsense components.

use serde::{Deserialize, Serialize};

/// Nearest-neighbor classifier configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClassifierConfig {
    /// Observations at or beyond this distance classify as idle.
    #[serde(default = "default_reject_distance")]
    pub reject_distance: f32,

    /// Exemplars consulted per classification. 1 keeps plain
    /// nearest-neighbor semantics; >1 enables majority smoothing.
    #[serde(default = "default_neighbors")]
    pub neighbors: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            reject_distance: default_reject_distance(),
            neighbors: default_neighbors(),
        }
    }
}

/// Quality gate configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QualityConfig {
    #[serde(default = "default_brightness_min")]
    pub brightness_min: f32,
    #[serde(default = "default_brightness_max")]
    pub brightness_max: f32,
    #[serde(default = "default_contrast_min")]
    pub contrast_min: f32,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            brightness_min: default_brightness_min(),
            brightness_max: default_brightness_max(),
            contrast_min: default_contrast_min(),
        }
    }
}

/// Temporal voter configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VoteConfig {
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    #[serde(default = "default_required_hits")]
    pub required_hits: usize,
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,
    /// Entry time-to-live in milliseconds.
    #[serde(default = "default_entry_ttl_ms")]
    pub entry_ttl_ms: u64,
}

impl Default for VoteConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            required_hits: default_required_hits(),
            min_confidence: default_min_confidence(),
            entry_ttl_ms: default_entry_ttl_ms(),
        }
    }
}

/// Calibration session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CalibrationConfig {
    /// Nominal session length in seconds.
    #[serde(default = "default_target_duration_secs")]
    pub target_duration_secs: u64,
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            target_duration_secs: default_target_duration_secs(),
            min_samples: default_min_samples(),
            max_samples: default_max_samples(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Tracing filter directive, e.g. "info" or "signsense_core=debug".
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_reject_distance() -> f32 {
    1.8
}

fn default_neighbors() -> usize {
    1
}

fn default_brightness_min() -> f32 {
    60.0
}

fn default_brightness_max() -> f32 {
    200.0
}

fn default_contrast_min() -> f32 {
    25.0
}

fn default_window_size() -> usize {
    8
}

fn default_required_hits() -> usize {
    3
}

fn default_min_confidence() -> f32 {
    0.45
}

fn default_entry_ttl_ms() -> u64 {
    900
}

fn default_target_duration_secs() -> u64 {
    12
}

fn default_min_samples() -> usize {
    120
}

fn default_max_samples() -> usize {
    1200
}

fn default_log_level() -> String {
    "warn".to_string()
}
