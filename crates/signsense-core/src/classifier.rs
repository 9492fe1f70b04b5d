//! Nearest-neighbor sign classification with a distance rejection region.

use std::sync::Arc;

use tracing::debug;

use crate::dataset::ExemplarStore;
use crate::labels;
use crate::types::Observation;

/// Outcome of classifying one observation.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    /// Canonical label, or `"idle"` when the observation was rejected.
    pub label: String,
    /// Confidence in [0, 1]; 0 for rejected observations.
    pub confidence: f32,
    /// Euclidean distance to the nearest exemplar.
    pub nearest_distance: f32,
}

impl ClassificationResult {
    /// The rejected / no-sign result for a given nearest distance.
    fn idle(nearest_distance: f32) -> Self {
        Self {
            label: labels::IDLE.to_string(),
            confidence: 0.0,
            nearest_distance,
        }
    }
}

/// Exemplar-based 1-nearest-neighbor classifier.
///
/// `reject_distance` is the single most important tunable: observations at
/// or beyond it classify as `"idle"` with zero confidence. Inside it,
/// confidence falls off linearly with distance.
///
/// `neighbors` defaults to 1; values above 1 switch to majority voting over
/// the k nearest exemplars, an explicit opt-in that keeps plain
/// nearest-neighbor semantics as the compatibility baseline.
#[derive(Debug, Clone)]
pub struct SignClassifier {
    store: Arc<ExemplarStore>,
    reject_distance: f32,
    neighbors: usize,
}

impl SignClassifier {
    pub fn new(store: Arc<ExemplarStore>, reject_distance: f32) -> Self {
        Self {
            store,
            reject_distance,
            neighbors: 1,
        }
    }

    /// Opt in to k>1 majority smoothing.
    pub fn with_neighbors(mut self, neighbors: usize) -> Self {
        self.neighbors = neighbors.max(1);
        self
    }

    pub fn reject_distance(&self) -> f32 {
        self.reject_distance
    }

    /// Replace the rejection threshold. Applied between frames only.
    pub fn set_reject_distance(&mut self, reject_distance: f32) {
        self.reject_distance = reject_distance;
    }

    /// Classify one 126-float observation.
    ///
    /// Returns `"idle"` with zero confidence when the nearest exemplar is
    /// at or beyond `reject_distance`; otherwise the nearest label with
    /// `confidence = clamp(1 - d / reject_distance, 0, 1)`.
    pub fn classify(&self, observation: &Observation) -> ClassificationResult {
        let hits = self.store.nearest(observation, self.neighbors);
        let (nearest, nearest_distance) = match hits.first() {
            Some((e, d)) => (*e, *d),
            None => return ClassificationResult::idle(f32::INFINITY),
        };

        if nearest_distance >= self.reject_distance {
            return ClassificationResult::idle(nearest_distance);
        }

        let label = if self.neighbors > 1 {
            majority_label(&hits).unwrap_or(&nearest.label).clone()
        } else {
            nearest.label.clone()
        };

        let confidence = (1.0 - nearest_distance / self.reject_distance).clamp(0.0, 1.0);
        debug!(%label, confidence, nearest_distance, "classified observation");
        ClassificationResult {
            label,
            confidence,
            nearest_distance,
        }
    }
}

/// Most frequent label among the candidates, ties to the nearer one.
///
/// Candidates arrive ascending by distance, so scanning in order and only
/// replacing on a strictly greater count keeps ties with the nearest.
fn majority_label<'a>(hits: &[(&'a crate::dataset::Exemplar, f32)]) -> Option<&'a String> {
    let mut best: Option<(&String, usize)> = None;
    for (exemplar, _) in hits {
        let count = hits
            .iter()
            .filter(|(other, _)| other.label == exemplar.label)
            .count();
        match best {
            Some((_, best_count)) if best_count >= count => {}
            _ => best = Some((&exemplar.label, count)),
        }
    }
    best.map(|(label, _)| label)
}
