//! Runtime threshold values read on every frame.
//!
//! Both structs are small copyable values threaded explicitly through the
//! pipeline instead of living as ambient globals, so independent sessions
//! (parallel tests, multiple cameras) cannot interfere. Mutation happens
//! only between frames, from calibration or explicit settings, and always
//! by replacing the whole value.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Admission thresholds for the environmental quality gate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityThresholds {
    /// Below this mean brightness the frame is rejected as low light.
    pub brightness_min: f32,
    /// Above this mean brightness the frame is rejected as overexposed.
    pub brightness_max: f32,
    /// Below this contrast (pixel stddev) the frame is rejected.
    pub contrast_min: f32,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            brightness_min: 60.0,
            brightness_max: 200.0,
            contrast_min: 25.0,
        }
    }
}

/// Thresholds governing the temporal consensus filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoteThresholds {
    /// Maximum entries kept in the voting window.
    pub window_size: usize,
    /// Minimum matching entries before a label is emitted.
    pub required_hits: usize,
    /// Minimum average confidence before a label is emitted.
    pub min_confidence: f32,
    /// Entries older than this are excluded from every tally.
    pub entry_ttl: Duration,
}

impl Default for VoteThresholds {
    fn default() -> Self {
        Self {
            window_size: 8,
            required_hits: 3,
            min_confidence: 0.45,
            entry_ttl: Duration::from_millis(900),
        }
    }
}
