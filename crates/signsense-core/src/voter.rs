//! Temporal consensus filter: noisy per-frame labels to a stable decision.
//!
//! Not a state machine and not a statistical estimator: an accumulating,
//! continuously pruned window with a deterministic majority tally. A
//! rejection (idle/unknown label, or a non-admitted frame) hard-resets the
//! window so stale detections cannot leak across gaps.

use std::collections::VecDeque;
use std::time::Instant;

use tracing::trace;

use crate::labels;
use crate::types::VoteThresholds;

/// One admitted classification waiting in the voting window.
#[derive(Debug, Clone, PartialEq)]
pub struct VoteEntry {
    pub label: String,
    pub confidence: f32,
    pub at: Instant,
}

/// Stabilized output of one voting step.
#[derive(Debug, Clone, PartialEq)]
pub struct VoteDecision {
    /// The stabilized label, or `"idle"` while consensus is withheld.
    pub label: String,
    /// Average confidence of the best candidate. Reported even when the
    /// label is withheld, as a diagnostic for how close consensus is.
    pub confidence: f32,
    /// Matching entries behind the best candidate.
    pub hits: usize,
}

impl VoteDecision {
    fn idle() -> Self {
        Self {
            label: labels::IDLE.to_string(),
            confidence: 0.0,
            hits: 0,
        }
    }
}

/// Time-windowed majority filter with hysteresis.
#[derive(Debug)]
pub struct TemporalVoter {
    entries: VecDeque<VoteEntry>,
    thresholds: VoteThresholds,
}

impl TemporalVoter {
    pub fn new(thresholds: VoteThresholds) -> Self {
        Self {
            entries: VecDeque::with_capacity(thresholds.window_size),
            thresholds,
        }
    }

    pub fn thresholds(&self) -> &VoteThresholds {
        &self.thresholds
    }

    /// Replace thresholds. Applied between frames only; the window keeps
    /// its entries and the next push tallies under the new values.
    pub fn set_thresholds(&mut self, thresholds: VoteThresholds) {
        self.thresholds = thresholds;
    }

    /// Number of entries currently buffered.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Feed one per-frame classification into the window.
    ///
    /// A rejection label (`idle`/`unknown`) or a non-admitted frame clears
    /// the whole window and returns the idle decision: accumulated evidence
    /// is invalid the moment the stream is interrupted. Otherwise the entry
    /// joins the window, age and overflow eviction run, and the majority
    /// tally decides whether a label is emitted.
    pub fn push(&mut self, label: &str, confidence: f32, admitted: bool, now: Instant) -> VoteDecision {
        let label = labels::canonical(label);
        if !admitted || labels::is_rejection(&label) {
            self.entries.clear();
            return VoteDecision::idle();
        }

        self.entries.push_back(VoteEntry {
            label,
            confidence,
            at: now,
        });
        self.evict(now);
        self.tally()
    }

    /// Drop the accumulated window, e.g. when the caller pauses capture.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// Age eviction first, then overflow truncation to the newest entries.
    /// Runs before every tally so expired entries never count.
    fn evict(&mut self, now: Instant) {
        let ttl = self.thresholds.entry_ttl;
        while let Some(front) = self.entries.front() {
            if now.duration_since(front.at) > ttl {
                self.entries.pop_front();
            } else {
                break;
            }
        }
        while self.entries.len() > self.thresholds.window_size {
            self.entries.pop_front();
        }
    }

    fn tally(&self) -> VoteDecision {
        // (label, count, summed confidence), first-seen order.
        let mut buckets: Vec<(&str, usize, f32)> = Vec::new();
        for entry in &self.entries {
            match buckets.iter_mut().find(|(l, _, _)| *l == entry.label) {
                Some(bucket) => {
                    bucket.1 += 1;
                    bucket.2 += entry.confidence;
                }
                None => buckets.push((&entry.label, 1, entry.confidence)),
            }
        }

        let best = buckets.iter().copied().reduce(|a, b| {
            if b.1 > a.1 || (b.1 == a.1 && b.2 > a.2) {
                b
            } else {
                a
            }
        });
        let (label, hits, summed) = match best {
            Some(b) => b,
            None => return VoteDecision::idle(),
        };

        let avg_confidence = summed / hits as f32;
        let accepted =
            hits >= self.thresholds.required_hits && avg_confidence >= self.thresholds.min_confidence;
        trace!(label, hits, avg_confidence, accepted, "vote tally");

        VoteDecision {
            label: if accepted {
                label.to_string()
            } else {
                labels::IDLE.to_string()
            },
            confidence: avg_confidence,
            hits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn thresholds() -> VoteThresholds {
        VoteThresholds {
            window_size: 5,
            required_hits: 3,
            min_confidence: 0.45,
            entry_ttl: Duration::from_millis(900),
        }
    }

    #[test]
    fn consensus_requires_hits_and_confidence() {
        let mut voter = TemporalVoter::new(thresholds());
        let t0 = Instant::now();

        let d1 = voter.push("tiger", 0.9, true, t0);
        assert_eq!(d1.label, "idle");
        assert_eq!(d1.hits, 1);
        assert!((d1.confidence - 0.9).abs() < 1e-6);

        let d2 = voter.push("tiger", 0.9, true, t0 + Duration::from_millis(30));
        assert_eq!(d2.label, "idle");

        let d3 = voter.push("tiger", 0.9, true, t0 + Duration::from_millis(60));
        assert_eq!(d3.label, "tiger");
        assert_eq!(d3.hits, 3);
    }

    #[test]
    fn low_confidence_withholds_label_but_reports_it() {
        let mut voter = TemporalVoter::new(thresholds());
        let t0 = Instant::now();
        for i in 0..4 {
            let d = voter.push("tiger", 0.2, true, t0 + Duration::from_millis(i * 30));
            assert_eq!(d.label, "idle");
            assert!((d.confidence - 0.2).abs() < 1e-6);
        }
    }

    #[test]
    fn idle_push_hard_resets_window() {
        let mut voter = TemporalVoter::new(thresholds());
        let t0 = Instant::now();
        for i in 0..5 {
            voter.push("tiger", 0.9, true, t0 + Duration::from_millis(i * 30));
        }
        let d = voter.push("idle", 0.9, true, t0 + Duration::from_millis(150));
        assert_eq!(d.label, "idle");
        assert_eq!(d.confidence, 0.0);
        assert!(voter.is_empty());

        // Behaves exactly like a fresh window afterwards.
        let d = voter.push("tiger", 0.9, true, t0 + Duration::from_millis(180));
        assert_eq!(d.hits, 1);
        assert_eq!(d.label, "idle");
    }

    #[test]
    fn non_admitted_frame_hard_resets() {
        let mut voter = TemporalVoter::new(thresholds());
        let t0 = Instant::now();
        for i in 0..3 {
            voter.push("tiger", 0.9, true, t0 + Duration::from_millis(i * 30));
        }
        let d = voter.push("tiger", 0.9, false, t0 + Duration::from_millis(90));
        assert_eq!(d.label, "idle");
        assert!(voter.is_empty());
    }

    #[test]
    fn unknown_label_hard_resets() {
        let mut voter = TemporalVoter::new(thresholds());
        let t0 = Instant::now();
        voter.push("tiger", 0.9, true, t0);
        voter.push("unknown", 0.9, true, t0 + Duration::from_millis(30));
        assert!(voter.is_empty());
    }

    #[test]
    fn stale_entries_never_counted() {
        let mut voter = TemporalVoter::new(thresholds());
        let t0 = Instant::now();
        voter.push("tiger", 0.9, true, t0);
        voter.push("tiger", 0.9, true, t0 + Duration::from_millis(10));

        // Two seconds later both earlier entries are past the 900ms ttl.
        let d = voter.push("tiger", 0.9, true, t0 + Duration::from_secs(2));
        assert_eq!(d.hits, 1);
        assert_eq!(d.label, "idle");
        assert_eq!(voter.len(), 1);
    }

    #[test]
    fn window_overflow_drops_oldest() {
        let mut voter = TemporalVoter::new(thresholds());
        let t0 = Instant::now();
        for i in 0..5 {
            voter.push("tiger", 0.9, true, t0 + Duration::from_millis(i * 10));
        }
        // Sixth entry pushes the window past window_size=5.
        let d = voter.push("boar", 0.9, true, t0 + Duration::from_millis(50));
        assert_eq!(voter.len(), 5);
        // Four tigers remain vs one boar.
        assert_eq!(d.label, "tiger");
        assert_eq!(d.hits, 4);
    }

    #[test]
    fn count_tie_breaks_on_summed_confidence() {
        let mut voter = TemporalVoter::new(VoteThresholds {
            window_size: 6,
            required_hits: 2,
            min_confidence: 0.1,
            entry_ttl: Duration::from_secs(10),
        });
        let t0 = Instant::now();
        voter.push("tiger", 0.5, true, t0);
        voter.push("boar", 0.9, true, t0 + Duration::from_millis(10));
        voter.push("tiger", 0.5, true, t0 + Duration::from_millis(20));
        let d = voter.push("boar", 0.9, true, t0 + Duration::from_millis(30));
        assert_eq!(d.label, "boar");
        assert_eq!(d.hits, 2);
        assert!((d.confidence - 0.9).abs() < 1e-6);
    }

    #[test]
    fn synonyms_merge_into_one_candidate() {
        let mut voter = TemporalVoter::new(thresholds());
        let t0 = Instant::now();
        voter.push("rabbit", 0.9, true, t0);
        voter.push("hare", 0.9, true, t0 + Duration::from_millis(10));
        let d = voter.push("Rabbit", 0.9, true, t0 + Duration::from_millis(20));
        assert_eq!(d.label, "hare");
        assert_eq!(d.hits, 3);
    }
}
