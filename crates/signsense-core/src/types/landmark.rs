//! Raw hand-landmark observations as delivered by the external detector.
//!
//! The detector is a black box producing, per detected hand, 21 tracked 3D
//! points (wrist first) with per-point visibility and a left/right tag.
//! These types are owned transiently per frame; nothing in the core retains
//! them past the frame that produced them.

use crate::error::{SignError, SignResult};

/// Landmarks the detector reports per hand.
pub const LANDMARKS_PER_HAND: usize = 21;

/// Index of the wrist landmark within a hand observation.
pub const WRIST_INDEX: usize = 0;

/// A single tracked 3D point on a hand, in normalized image coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// False when the detector flagged the point as occluded or unreliable.
    pub visible: bool,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x,
            y,
            z,
            visible: true,
        }
    }

    /// Euclidean distance to another landmark.
    pub fn distance_to(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Which hand the detector believes an observation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Handedness {
    Left,
    Right,
    /// Detector could not decide; slot assignment falls back to image
    /// position.
    #[default]
    Unknown,
}

/// One detected hand: exactly 21 ordered landmarks plus a handedness tag.
#[derive(Debug, Clone, PartialEq)]
pub struct HandObservation {
    landmarks: Vec<Landmark>,
    pub handedness: Handedness,
}

impl HandObservation {
    /// Build an observation, enforcing the 21-landmark arity.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::InvalidInput`] when the landmark count is not
    /// exactly 21. Callers treat this as an absent hand rather than a
    /// session failure.
    pub fn new(landmarks: Vec<Landmark>, handedness: Handedness) -> SignResult<Self> {
        if landmarks.len() != LANDMARKS_PER_HAND {
            return Err(SignError::InvalidInput {
                expected: LANDMARKS_PER_HAND,
                actual: landmarks.len(),
            });
        }
        Ok(Self {
            landmarks,
            handedness,
        })
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    /// The wrist landmark (index 0).
    pub fn wrist(&self) -> &Landmark {
        &self.landmarks[WRIST_INDEX]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_hand(n: usize) -> Vec<Landmark> {
        (0..n).map(|i| Landmark::new(i as f32 * 0.01, 0.5, 0.0)).collect()
    }

    #[test]
    fn rejects_wrong_arity() {
        let err = HandObservation::new(flat_hand(17), Handedness::Left);
        assert!(matches!(
            err,
            Err(SignError::InvalidInput {
                expected: 21,
                actual: 17
            })
        ));
    }

    #[test]
    fn accepts_exactly_21() {
        let hand = HandObservation::new(flat_hand(21), Handedness::Right).unwrap();
        assert_eq!(hand.landmarks().len(), 21);
        assert_eq!(hand.wrist().x, 0.0);
    }

    #[test]
    fn landmark_distance() {
        let a = Landmark::new(0.0, 0.0, 0.0);
        let b = Landmark::new(3.0, 4.0, 0.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-6);
    }
}
