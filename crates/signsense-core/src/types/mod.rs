//! Core domain types for hand-sign classification.

mod landmark;
mod profile;
mod thresholds;

pub use landmark::{HandObservation, Handedness, Landmark, LANDMARKS_PER_HAND, WRIST_INDEX};
pub use profile::{CalibrationProfile, CalibrationSample, PROFILE_VERSION};
pub use thresholds::{QualityThresholds, VoteThresholds};

/// Floats per normalized hand: 21 landmarks x (x, y, z).
pub const HAND_DIMS: usize = 63;

/// Floats per observation: two hand blocks concatenated in fixed order.
pub const OBS_DIMS: usize = 2 * HAND_DIMS;

/// Scale/position-invariant feature vector for one hand.
///
/// All-zero encodes an absent (or fully occluded) hand.
pub type NormalizedVector = [f32; HAND_DIMS];

/// One classification input: hand slot 0 followed by hand slot 1.
pub type Observation = [f32; OBS_DIMS];

/// Concatenate two hand vectors into a single observation.
pub fn combine(slot0: &NormalizedVector, slot1: &NormalizedVector) -> Observation {
    let mut obs = [0.0f32; OBS_DIMS];
    obs[..HAND_DIMS].copy_from_slice(slot0);
    obs[HAND_DIMS..].copy_from_slice(slot1);
    obs
}
