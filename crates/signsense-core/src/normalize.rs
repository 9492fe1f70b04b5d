//! Feature normalization: raw landmarks to scale/position-invariant vectors.
//!
//! A hand's 21 landmarks become a wrist-relative 63-float vector divided by
//! the median wrist distance of its visible points. Median (not mean) keeps
//! the scale stable when a few fingertips are occluded or jittering, which
//! is the normal condition on consumer webcams.

use tracing::trace;

use crate::types::{
    HandObservation, Handedness, Landmark, NormalizedVector, HAND_DIMS, WRIST_INDEX,
};

/// Convert one optional hand into its normalized feature vector.
///
/// - Absent hand (`None`) yields the all-zero vector.
/// - Otherwise each visible landmark contributes `(point - wrist) / scale`
///   and each occluded landmark contributes `(0, 0, 0)`, where `scale` is
///   the median Euclidean distance of visible non-wrist landmarks to the
///   wrist (1.0 when none are visible).
///
/// Deterministic and side-effect free; wrong-arity observations cannot
/// reach here because [`HandObservation::new`] enforces the 21-point arity
/// and callers map that failure to an absent hand.
pub fn normalize(hand: Option<&HandObservation>) -> NormalizedVector {
    let mut out = [0.0f32; HAND_DIMS];
    let hand = match hand {
        Some(h) => h,
        None => return out,
    };

    let wrist = *hand.wrist();
    let mut distances: Vec<f32> = hand
        .landmarks()
        .iter()
        .enumerate()
        .filter(|(i, lm)| *i != WRIST_INDEX && lm.visible)
        .map(|(_, lm)| lm.distance_to(&wrist))
        .collect();

    let scale = if distances.is_empty() {
        1.0
    } else {
        median(&mut distances)
    };
    // Degenerate cluster at the wrist: fall back to unit scale rather than
    // dividing by zero.
    let scale = if scale > f32::EPSILON { scale } else { 1.0 };
    trace!(scale, visible = distances.len(), "normalized hand");

    for (i, lm) in hand.landmarks().iter().enumerate() {
        if !lm.visible {
            continue;
        }
        out[i * 3] = (lm.x - wrist.x) / scale;
        out[i * 3 + 1] = (lm.y - wrist.y) / scale;
        out[i * 3 + 2] = (lm.z - wrist.z) / scale;
    }
    out
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

/// Assigns up to two detected hands to the fixed observation slots.
///
/// Priority order per frame: continuity with the hand previously assigned
/// to a slot (nearest previous wrist), then the handedness default (left
/// hand to slot 0, right hand to slot 1), then leftmost-in-image. The
/// assigner is per-session state; independent sessions each own one.
#[derive(Debug, Default)]
pub struct SlotAssigner {
    anchors: [Option<Landmark>; 2],
}

impl SlotAssigner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget previous-frame anchors, e.g. when tracking was interrupted.
    pub fn reset(&mut self) {
        self.anchors = [None, None];
    }

    /// Map this frame's detected hands to slots.
    ///
    /// Returns, per slot, the index into `hands` assigned to it. Hands
    /// beyond the first two remaining after matching are ignored.
    pub fn assign(&mut self, hands: &[HandObservation]) -> [Option<usize>; 2] {
        let mut slots: [Option<usize>; 2] = [None, None];
        let mut taken = vec![false; hands.len()];

        // Continuity: greedily match anchored slots to the nearest wrist.
        loop {
            let mut best: Option<(usize, usize, f32)> = None;
            for (slot, anchor) in self.anchors.iter().enumerate() {
                let anchor = match anchor {
                    Some(a) if slots[slot].is_none() => a,
                    _ => continue,
                };
                for (h, hand) in hands.iter().enumerate() {
                    if taken[h] {
                        continue;
                    }
                    let d = hand.wrist().distance_to(anchor);
                    if best.map_or(true, |(_, _, bd)| d < bd) {
                        best = Some((slot, h, d));
                    }
                }
            }
            match best {
                Some((slot, h, _)) => {
                    slots[slot] = Some(h);
                    taken[h] = true;
                }
                None => break,
            }
        }

        // Handedness default for hands the continuity pass left over.
        for (h, hand) in hands.iter().enumerate() {
            if taken[h] {
                continue;
            }
            let preferred = match hand.handedness {
                Handedness::Left => Some(0),
                Handedness::Right => Some(1),
                Handedness::Unknown => None,
            };
            if let Some(slot) = preferred {
                if slots[slot].is_none() {
                    slots[slot] = Some(h);
                    taken[h] = true;
                }
            }
        }

        // Remaining hands fill free slots leftmost-in-image first.
        let mut rest: Vec<usize> = (0..hands.len()).filter(|h| !taken[*h]).collect();
        rest.sort_by(|a, b| {
            hands[*a]
                .wrist()
                .x
                .partial_cmp(&hands[*b].wrist().x)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let mut rest = rest.into_iter();
        for slot in 0..2 {
            if slots[slot].is_none() {
                if let Some(h) = rest.next() {
                    slots[slot] = Some(h);
                }
            }
        }

        for slot in 0..2 {
            if let Some(h) = slots[slot] {
                self.anchors[slot] = Some(*hands[h].wrist());
            }
        }
        slots
    }
}
