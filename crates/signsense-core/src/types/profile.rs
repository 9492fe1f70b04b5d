//! Calibration samples and the per-user threshold profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SignResult;

/// Schema version of [`CalibrationProfile`].
pub const PROFILE_VERSION: u32 = 1;

/// One observation recorded while a calibration session is collecting.
///
/// Exists only inside an active session's bounded buffer; discarded after
/// finalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationSample {
    pub brightness: f32,
    pub contrast: f32,
    pub hand_count: usize,
    /// Classifier confidence for the frame, when one was produced.
    pub confidence: Option<f32>,
}

/// Per-user tuned thresholds derived from a calibration session.
///
/// The core produces and consumes this as a plain value; persistence
/// (disk, cloud, wherever) is entirely the caller's responsibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationProfile {
    /// Schema version, currently [`PROFILE_VERSION`].
    pub version: u32,
    /// Caller-supplied identity the profile belongs to.
    pub identity: String,
    /// When the session finalized.
    pub updated_at: DateTime<Utc>,
    /// Samples the derivation was computed from.
    pub samples: usize,
    /// Derived minimum admissible mean brightness, always in [25, 120].
    pub lighting_min: f32,
    /// Derived maximum admissible mean brightness, always in [120, 245].
    pub lighting_max: f32,
    /// Derived minimum admissible contrast, always in [10, 80].
    pub lighting_min_contrast: f32,
    /// Derived voting confidence bar, always in [0.25, 0.9].
    pub vote_min_confidence: f32,
    /// Carried through unchanged; calibration does not tune hit counts.
    pub vote_required_hits: usize,
}

impl CalibrationProfile {
    /// Serialize to the persisted JSON record format.
    ///
    /// Storage itself (disk, cloud) stays with the caller; this only fixes
    /// the record shape.
    pub fn to_json(&self) -> SignResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a persisted JSON record back into a profile.
    pub fn from_json(json: &str) -> SignResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
