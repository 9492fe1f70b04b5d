//! Online calibration: derive per-user thresholds from a live session.
//!
//! The engine observes an already-admitted capture stream for a bounded
//! duration, then rewrites the quality/vote thresholds from what it saw.
//! It never opens cameras and never persists anything; the finished
//! [`CalibrationProfile`] is handed back as a plain value.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{SignError, SignResult};
use crate::types::{
    CalibrationProfile, CalibrationSample, QualityThresholds, VoteThresholds, PROFILE_VERSION,
};

/// Hard clamp bounds for derived thresholds. A finished profile's numeric
/// fields always land inside these ranges regardless of sample content.
const LIGHTING_MIN_RANGE: (f32, f32) = (25.0, 120.0);
const LIGHTING_MAX_RANGE: (f32, f32) = (120.0, 245.0);
const CONTRAST_MIN_RANGE: (f32, f32) = (10.0, 80.0);
const VOTE_CONFIDENCE_RANGE: (f32, f32) = (0.25, 0.9);

/// Session timing and buffer limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationSettings {
    /// Nominal sampling duration.
    pub target_duration: Duration,
    /// Samples required to finalize at the nominal duration.
    pub min_samples: usize,
    /// Sample buffer cap; oldest samples drop on overflow.
    pub max_samples: usize,
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        Self {
            target_duration: Duration::from_secs(12),
            min_samples: 120,
            max_samples: 1200,
        }
    }
}

impl CalibrationSettings {
    /// Hard timeout past which the session finalizes with whatever it has.
    /// Calibration always terminates.
    fn hard_timeout(&self) -> Duration {
        self.target_duration.mul_f32(1.7)
    }
}

/// Session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationState {
    Idle,
    Collecting,
    Finalizing,
    Saved,
    Failed,
}

/// Bounded-duration calibration session.
///
/// An active session can be aborted at any time by dropping the engine or
/// calling [`abort`](Self::abort); no cleanup beyond releasing the sample
/// buffer is needed.
#[derive(Debug)]
pub struct CalibrationEngine {
    /// Correlates the log lines of one session.
    session_id: Uuid,
    identity: String,
    settings: CalibrationSettings,
    state: CalibrationState,
    started_at: Option<Instant>,
    samples: VecDeque<CalibrationSample>,
    /// Vote thresholds in effect when the session started; carried through
    /// where calibration does not tune them.
    baseline_vote: VoteThresholds,
}

impl CalibrationEngine {
    pub fn new(identity: impl Into<String>, settings: CalibrationSettings) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            identity: identity.into(),
            settings,
            state: CalibrationState::Idle,
            started_at: None,
            samples: VecDeque::new(),
            baseline_vote: VoteThresholds::default(),
        }
    }

    pub fn state(&self) -> CalibrationState {
        self.state
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Begin collecting. Clears any previous sample buffer and snapshots
    /// the vote thresholds the session should treat as its baseline.
    pub fn start(&mut self, now: Instant, baseline_vote: VoteThresholds) {
        self.samples.clear();
        self.started_at = Some(now);
        self.baseline_vote = baseline_vote;
        self.state = CalibrationState::Collecting;
        info!(
            session = %self.session_id,
            identity = %self.identity,
            "calibration session started"
        );
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Record one observation. Accepted only while collecting; anything
    /// else is silently dropped. The buffer is bounded; the oldest sample
    /// gives way on overflow.
    pub fn sample(
        &mut self,
        brightness: f32,
        contrast: f32,
        hand_count: usize,
        confidence: Option<f32>,
    ) {
        if self.state != CalibrationState::Collecting {
            return;
        }
        if self.samples.len() >= self.settings.max_samples {
            self.samples.pop_front();
        }
        self.samples.push_back(CalibrationSample {
            brightness,
            contrast,
            hand_count,
            confidence,
        });
    }

    /// Drive the session clock. Returns the finished profile once the
    /// finalization trigger fires; `None` on every other call.
    ///
    /// The trigger: elapsed >= target_duration with at least min_samples
    /// collected, or elapsed >= 1.7x target_duration regardless of count.
    pub fn tick(&mut self, now: Instant) -> Option<CalibrationProfile> {
        let started = match (self.state, self.started_at) {
            (CalibrationState::Collecting, Some(s)) => s,
            _ => return None,
        };
        let elapsed = now.duration_since(started);
        let due = (elapsed >= self.settings.target_duration
            && self.samples.len() >= self.settings.min_samples)
            || elapsed >= self.settings.hard_timeout();
        if !due {
            return None;
        }

        self.state = CalibrationState::Finalizing;
        match self.finalize() {
            Ok(profile) => {
                self.state = CalibrationState::Saved;
                self.samples.clear();
                info!(
                    session = %self.session_id,
                    identity = %profile.identity,
                    samples = profile.samples,
                    lighting_min = profile.lighting_min,
                    lighting_max = profile.lighting_max,
                    lighting_min_contrast = profile.lighting_min_contrast,
                    vote_min_confidence = profile.vote_min_confidence,
                    "calibration session saved"
                );
                Some(profile)
            }
            Err(err) => {
                self.state = CalibrationState::Failed;
                warn!(
                    session = %self.session_id,
                    identity = %self.identity,
                    %err,
                    "calibration session failed"
                );
                None
            }
        }
    }

    /// Abandon an active session, releasing the sample buffer.
    pub fn abort(&mut self) {
        self.samples.clear();
        self.started_at = None;
        self.state = CalibrationState::Idle;
        debug!(session = %self.session_id, "calibration session aborted");
    }

    /// Derive the profile from the collected samples.
    ///
    /// # Errors
    ///
    /// [`SignError::EmptyCalibration`] when no samples were captured; the
    /// caller keeps its prior thresholds untouched in that case.
    fn finalize(&self) -> SignResult<CalibrationProfile> {
        if self.samples.is_empty() {
            return Err(SignError::EmptyCalibration);
        }

        let mut brightness: Vec<f32> = self.samples.iter().map(|s| s.brightness).collect();
        let mut contrast: Vec<f32> = self.samples.iter().map(|s| s.contrast).collect();
        let mut confidences: Vec<f32> = self
            .samples
            .iter()
            .filter_map(|s| s.confidence)
            .filter(|c| *c > 0.0)
            .collect();

        let b_med = median(&mut brightness);
        let c_med = median(&mut contrast);

        let vote_min_confidence = if confidences.is_empty() {
            // No classifier evidence this session; the bar stays put.
            self.baseline_vote.min_confidence
        } else {
            clamp(percentile(&mut confidences, 0.30) * 0.9, VOTE_CONFIDENCE_RANGE)
        };

        Ok(CalibrationProfile {
            version: PROFILE_VERSION,
            identity: self.identity.clone(),
            updated_at: Utc::now(),
            samples: self.samples.len(),
            lighting_min: clamp(b_med * 0.55, LIGHTING_MIN_RANGE),
            lighting_max: clamp(b_med * 1.45, LIGHTING_MAX_RANGE),
            lighting_min_contrast: clamp(c_med * 0.65, CONTRAST_MIN_RANGE),
            vote_min_confidence,
            vote_required_hits: self.baseline_vote.required_hits,
        })
    }
}

/// Threshold values a finished profile translates into.
pub fn profile_thresholds(
    profile: &CalibrationProfile,
    current_vote: &VoteThresholds,
) -> (QualityThresholds, VoteThresholds) {
    (
        QualityThresholds {
            brightness_min: profile.lighting_min,
            brightness_max: profile.lighting_max,
            contrast_min: profile.lighting_min_contrast,
        },
        VoteThresholds {
            min_confidence: profile.vote_min_confidence,
            required_hits: profile.vote_required_hits,
            ..*current_vote
        },
    )
}

fn clamp(value: f32, range: (f32, f32)) -> f32 {
    value.clamp(range.0, range.1)
}

fn median(values: &mut [f32]) -> f32 {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}

/// Linear-interpolated percentile, `q` in [0, 1]. Callers guarantee a
/// non-empty slice.
fn percentile(values: &mut [f32], q: f32) -> f32 {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = values.len();
    if n == 1 {
        return values[0];
    }
    let rank = q * (n - 1) as f32;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f32;
    values[lo] + (values[hi] - values[lo]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> CalibrationEngine {
        CalibrationEngine::new(
            "player-1",
            CalibrationSettings {
                target_duration: Duration::from_secs(10),
                min_samples: 5,
                max_samples: 1200,
            },
        )
    }

    fn collect(e: &mut CalibrationEngine, n: usize, brightness: f32, contrast: f32) {
        for _ in 0..n {
            e.sample(brightness, contrast, 2, Some(0.6));
        }
    }

    #[test]
    fn lifecycle_reaches_saved() {
        let mut e = engine();
        let t0 = Instant::now();
        assert_eq!(e.state(), CalibrationState::Idle);

        e.start(t0, VoteThresholds::default());
        assert_eq!(e.state(), CalibrationState::Collecting);
        collect(&mut e, 10, 130.0, 40.0);

        // Not due yet: time has not elapsed.
        assert!(e.tick(t0 + Duration::from_secs(3)).is_none());
        assert_eq!(e.state(), CalibrationState::Collecting);

        let profile = e.tick(t0 + Duration::from_secs(10)).unwrap();
        assert_eq!(e.state(), CalibrationState::Saved);
        assert_eq!(profile.version, PROFILE_VERSION);
        assert_eq!(profile.identity, "player-1");
        assert_eq!(profile.samples, 10);
    }

    #[test]
    fn needs_min_samples_before_target_finalizes() {
        let mut e = engine();
        let t0 = Instant::now();
        e.start(t0, VoteThresholds::default());
        collect(&mut e, 3, 130.0, 40.0);

        // Target elapsed but too few samples: keeps collecting.
        assert!(e.tick(t0 + Duration::from_secs(11)).is_none());
        assert_eq!(e.state(), CalibrationState::Collecting);
    }

    #[test]
    fn hard_timeout_finalizes_regardless_of_count() {
        let mut e = engine();
        let t0 = Instant::now();
        e.start(t0, VoteThresholds::default());
        collect(&mut e, 2, 130.0, 40.0);

        let profile = e.tick(t0 + Duration::from_secs(17)).unwrap();
        assert_eq!(profile.samples, 2);
        assert_eq!(e.state(), CalibrationState::Saved);
    }

    #[test]
    fn empty_buffer_fails_and_keeps_nothing() {
        let mut e = engine();
        let t0 = Instant::now();
        e.start(t0, VoteThresholds::default());

        assert!(e.tick(t0 + Duration::from_secs(17)).is_none());
        assert_eq!(e.state(), CalibrationState::Failed);
    }

    #[test]
    fn derivation_formulas() {
        let mut e = engine();
        let t0 = Instant::now();
        e.start(t0, VoteThresholds::default());
        for _ in 0..10 {
            e.sample(130.0, 40.0, 2, Some(0.6));
        }
        let profile = e.tick(t0 + Duration::from_secs(10)).unwrap();

        assert!((profile.lighting_min - 130.0 * 0.55).abs() < 1e-4);
        assert!((profile.lighting_max - 130.0 * 1.45).abs() < 1e-4);
        assert!((profile.lighting_min_contrast - 40.0 * 0.65).abs() < 1e-4);
        // All confidences equal: p30 is 0.6, scaled by 0.9.
        assert!((profile.vote_min_confidence - 0.54).abs() < 1e-4);
    }

    #[test]
    fn clamps_hold_for_adversarial_samples() {
        for (brightness, contrast, confidence) in
            [(0.0f32, 0.0f32, 0.001f32), (255.0, 255.0, 1.0)]
        {
            let mut e = engine();
            let t0 = Instant::now();
            e.start(t0, VoteThresholds::default());
            for _ in 0..10 {
                e.sample(brightness, contrast, 0, Some(confidence));
            }
            let p = e.tick(t0 + Duration::from_secs(10)).unwrap();
            assert!((25.0..=120.0).contains(&p.lighting_min));
            assert!((120.0..=245.0).contains(&p.lighting_max));
            assert!((10.0..=80.0).contains(&p.lighting_min_contrast));
            assert!((0.25..=0.9).contains(&p.vote_min_confidence));
        }
    }

    #[test]
    fn no_confidence_samples_leaves_vote_bar_unchanged() {
        let mut e = engine();
        let t0 = Instant::now();
        let baseline = VoteThresholds {
            min_confidence: 0.61,
            ..VoteThresholds::default()
        };
        e.start(t0, baseline);
        for _ in 0..10 {
            e.sample(130.0, 40.0, 0, None);
        }
        let p = e.tick(t0 + Duration::from_secs(10)).unwrap();
        assert_eq!(p.vote_min_confidence, 0.61);
        assert_eq!(p.vote_required_hits, baseline.required_hits);
    }

    #[test]
    fn buffer_caps_and_drops_oldest() {
        let mut e = CalibrationEngine::new(
            "player-1",
            CalibrationSettings {
                target_duration: Duration::from_secs(10),
                min_samples: 1,
                max_samples: 4,
            },
        );
        let t0 = Instant::now();
        e.start(t0, VoteThresholds::default());
        for i in 0..6 {
            e.sample(100.0 + i as f32, 40.0, 2, None);
        }
        assert_eq!(e.sample_count(), 4);
    }

    #[test]
    fn samples_ignored_outside_collecting() {
        let mut e = engine();
        e.sample(130.0, 40.0, 2, Some(0.6));
        assert_eq!(e.sample_count(), 0);
    }

    #[test]
    fn abort_releases_everything() {
        let mut e = engine();
        let t0 = Instant::now();
        e.start(t0, VoteThresholds::default());
        collect(&mut e, 8, 130.0, 40.0);
        e.abort();
        assert_eq!(e.state(), CalibrationState::Idle);
        assert_eq!(e.sample_count(), 0);
        assert!(e.tick(t0 + Duration::from_secs(30)).is_none());
    }

    #[test]
    fn percentile_interpolates() {
        let mut vals = vec![0.0, 1.0];
        assert!((percentile(&mut vals, 0.30) - 0.3).abs() < 1e-6);
        let mut single = vec![0.7];
        assert_eq!(percentile(&mut single, 0.30), 0.7);
    }
}
