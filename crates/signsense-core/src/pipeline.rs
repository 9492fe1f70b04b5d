//! Per-frame orchestration: gate, normalize, classify, vote, calibrate.
//!
//! One [`SignPipeline`] is one session. Everything runs synchronously
//! inside the caller's capture loop; no background threads, no I/O. The
//! quality gate is always evaluated before the voter sees the frame, and
//! its admit flag decides whether the vote counts as evidence or as a
//! hard-reset signal. Threshold mutations (calibration or settings) land
//! atomically between frames by replacing whole threshold values.

use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::calibration::{CalibrationEngine, CalibrationSettings, CalibrationState};
use crate::classifier::{ClassificationResult, SignClassifier};
use crate::config::Config;
use crate::dataset::ExemplarStore;
use crate::normalize::{normalize, SlotAssigner};
use crate::quality::{self, FrameStats, QualityDecision};
use crate::types::{combine, CalibrationProfile, HandObservation, QualityThresholds, VoteThresholds};
use crate::voter::{TemporalVoter, VoteDecision};

/// Everything one frame produced.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameDecision {
    pub quality: QualityDecision,
    /// Raw per-frame classification, before temporal consensus.
    pub classification: ClassificationResult,
    /// The stabilized decision downstream code should act on.
    pub vote: VoteDecision,
    /// Present on the frame a calibration session finished; the profile
    /// has already been applied to this pipeline, persisting it is the
    /// caller's business.
    pub calibrated: Option<CalibrationProfile>,
}

/// Single-session classification pipeline.
///
/// The exemplar store is shared immutably; independent pipelines (several
/// cameras, parallel tests) can hold clones of the same `Arc` without
/// locking.
pub struct SignPipeline {
    classifier: SignClassifier,
    assigner: SlotAssigner,
    voter: TemporalVoter,
    quality: QualityThresholds,
    restricted_mode: bool,
    calibration_settings: CalibrationSettings,
    calibration: Option<CalibrationEngine>,
}

impl SignPipeline {
    pub fn new(store: Arc<ExemplarStore>, config: &Config) -> Self {
        let classifier = SignClassifier::new(store, config.classifier.reject_distance)
            .with_neighbors(config.classifier.neighbors);
        Self {
            classifier,
            assigner: SlotAssigner::new(),
            voter: TemporalVoter::new(config.vote_thresholds()),
            quality: config.quality_thresholds(),
            restricted_mode: false,
            calibration_settings: config.calibration_settings(),
            calibration: None,
        }
    }

    /// Run one frame through the full flow.
    pub fn process_frame(
        &mut self,
        stats: FrameStats,
        hands: &[HandObservation],
        now: Instant,
    ) -> FrameDecision {
        let gate = quality::evaluate(stats, hands.len(), self.restricted_mode, &self.quality);

        let slots = self.assigner.assign(hands);
        let slot0 = normalize(slots[0].map(|i| &hands[i]));
        let slot1 = normalize(slots[1].map(|i| &hands[i]));
        let observation = combine(&slot0, &slot1);

        let classification = self.classifier.classify(&observation);
        let vote = self.voter.push(
            &classification.label,
            classification.confidence,
            gate.admit,
            now,
        );

        let calibrated = self.observe_calibration(stats, hands.len(), &classification, gate, now);

        FrameDecision {
            quality: gate,
            classification,
            vote,
            calibrated,
        }
    }

    /// Feed an active calibration session and apply its result when done.
    fn observe_calibration(
        &mut self,
        stats: FrameStats,
        hand_count: usize,
        classification: &ClassificationResult,
        gate: QualityDecision,
        now: Instant,
    ) -> Option<CalibrationProfile> {
        let engine = self.calibration.as_mut()?;
        let confidence = if gate.admit && classification.confidence > 0.0 {
            Some(classification.confidence)
        } else {
            None
        };
        engine.sample(stats.mean_brightness, stats.contrast, hand_count, confidence);

        let profile = engine.tick(now);
        if engine.state() != CalibrationState::Collecting {
            self.calibration = None;
        }
        if let Some(profile) = &profile {
            self.apply_profile(profile);
        }
        profile
    }

    /// Begin a calibration session over the live stream.
    ///
    /// Any previously active session is discarded.
    pub fn start_calibration(&mut self, identity: impl Into<String>, now: Instant) {
        let mut engine = CalibrationEngine::new(identity, self.calibration_settings);
        engine.start(now, *self.voter.thresholds());
        self.calibration = Some(engine);
    }

    /// Abort an active calibration session, keeping current thresholds.
    pub fn abort_calibration(&mut self) {
        if let Some(mut engine) = self.calibration.take() {
            engine.abort();
        }
    }

    pub fn calibration_state(&self) -> Option<CalibrationState> {
        self.calibration.as_ref().map(|e| e.state())
    }

    /// Adopt a calibration profile (fresh from a session here, or restored
    /// by the caller from wherever it persists them).
    pub fn apply_profile(&mut self, profile: &CalibrationProfile) {
        let (quality, vote) =
            crate::calibration::profile_thresholds(profile, self.voter.thresholds());
        self.quality = quality;
        self.voter.set_thresholds(vote);
        info!(identity = %profile.identity, "applied calibration profile");
    }

    /// Caller policy: require both hands for admission.
    pub fn set_restricted_mode(&mut self, restricted: bool) {
        self.restricted_mode = restricted;
    }

    pub fn quality_thresholds(&self) -> &QualityThresholds {
        &self.quality
    }

    pub fn vote_thresholds(&self) -> &VoteThresholds {
        self.voter.thresholds()
    }

    /// Explicit settings path for quality thresholds.
    pub fn set_quality_thresholds(&mut self, thresholds: QualityThresholds) {
        self.quality = thresholds;
    }

    /// Explicit settings path for vote thresholds.
    pub fn set_vote_thresholds(&mut self, thresholds: VoteThresholds) {
        self.voter.set_thresholds(thresholds);
    }

    /// Drop tracking and voting state, e.g. when capture restarts.
    pub fn reset(&mut self) {
        self.assigner.reset();
        self.voter.reset();
    }
}
