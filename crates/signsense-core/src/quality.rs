//! Environmental admission gate: brightness, contrast, hand presence.

use serde::{Deserialize, Serialize};

use crate::types::QualityThresholds;

/// Per-frame capture statistics supplied by the caller.
///
/// `mean_brightness` is the frame's mean pixel intensity (0..255);
/// `contrast` its pixel standard deviation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    pub mean_brightness: f32,
    pub contrast: f32,
}

/// Capture-condition verdict for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityStatus {
    Good,
    LowLight,
    Overexposed,
    LowContrast,
}

impl QualityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityStatus::Good => "good",
            QualityStatus::LowLight => "low_light",
            QualityStatus::Overexposed => "overexposed",
            QualityStatus::LowContrast => "low_contrast",
        }
    }
}

/// Result of evaluating one frame against the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityDecision {
    pub status: QualityStatus,
    /// Whether this frame's classification counts as real evidence.
    pub admit: bool,
}

/// Evaluate a frame's capture quality and hand presence.
///
/// Status checks run in severity order: low light, overexposure, then low
/// contrast. A frame is admitted only when the status is good, at least one
/// hand is present, and (under `restricted_mode`, a caller policy for
/// two-handed signs) both hands are present.
pub fn evaluate(
    stats: FrameStats,
    hand_count: usize,
    restricted_mode: bool,
    thresholds: &QualityThresholds,
) -> QualityDecision {
    let status = if stats.mean_brightness < thresholds.brightness_min {
        QualityStatus::LowLight
    } else if stats.mean_brightness > thresholds.brightness_max {
        QualityStatus::Overexposed
    } else if stats.contrast < thresholds.contrast_min {
        QualityStatus::LowContrast
    } else {
        QualityStatus::Good
    };

    let admit = status == QualityStatus::Good
        && hand_count > 0
        && (!restricted_mode || hand_count >= 2);

    QualityDecision { status, admit }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> QualityThresholds {
        QualityThresholds {
            brightness_min: 60.0,
            brightness_max: 200.0,
            contrast_min: 25.0,
        }
    }

    fn stats(brightness: f32, contrast: f32) -> FrameStats {
        FrameStats {
            mean_brightness: brightness,
            contrast,
        }
    }

    #[test]
    fn good_frame_with_hand_admits() {
        let d = evaluate(stats(120.0, 40.0), 1, false, &thresholds());
        assert_eq!(d.status, QualityStatus::Good);
        assert!(d.admit);
    }

    #[test]
    fn dark_frame_rejected() {
        let d = evaluate(stats(30.0, 40.0), 2, false, &thresholds());
        assert_eq!(d.status, QualityStatus::LowLight);
        assert!(!d.admit);
    }

    #[test]
    fn overexposed_frame_rejected() {
        let d = evaluate(stats(240.0, 40.0), 1, false, &thresholds());
        assert_eq!(d.status, QualityStatus::Overexposed);
        assert!(!d.admit);
    }

    #[test]
    fn flat_frame_rejected() {
        let d = evaluate(stats(120.0, 5.0), 1, false, &thresholds());
        assert_eq!(d.status, QualityStatus::LowContrast);
        assert!(!d.admit);
    }

    #[test]
    fn no_hands_never_admits() {
        let d = evaluate(stats(120.0, 40.0), 0, false, &thresholds());
        assert_eq!(d.status, QualityStatus::Good);
        assert!(!d.admit);
    }

    #[test]
    fn restricted_mode_needs_both_hands() {
        let one = evaluate(stats(120.0, 40.0), 1, true, &thresholds());
        assert!(!one.admit);
        let two = evaluate(stats(120.0, 40.0), 2, true, &thresholds());
        assert!(two.admit);
    }

    #[test]
    fn brightness_below_min_outranks_contrast() {
        let d = evaluate(stats(30.0, 5.0), 1, false, &thresholds());
        assert_eq!(d.status, QualityStatus::LowLight);
    }
}
