//! Signsense Core Library
//!
//! Classifies a live stream of hand-skeleton observations into a discrete
//! vocabulary of signs, and turns the noisy per-frame label stream into a
//! stable, debounced decision with per-user calibrated thresholds.
//!
//! # Architecture
//!
//! - Feature normalization: raw 21-landmark hands to wrist-relative,
//!   scale-invariant vectors ([`normalize`])
//! - Exemplar dataset with nearest-neighbor search ([`dataset`])
//! - Distance-rejecting nearest-neighbor classification ([`classifier`])
//! - Environmental admission gate ([`quality`])
//! - Temporal consensus voting with hysteresis ([`voter`])
//! - Online calibration of admission/voting thresholds ([`calibration`])
//! - Per-frame orchestration ([`pipeline`])
//!
//! The upstream landmark detector, video capture, rendering, and profile
//! persistence all live outside this crate and talk to it through plain
//! values.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Instant;
//! use signsense_core::config::Config;
//! use signsense_core::dataset::{Exemplar, ExemplarStore};
//! use signsense_core::pipeline::SignPipeline;
//! use signsense_core::quality::FrameStats;
//!
//! let store = Arc::new(ExemplarStore::from_exemplars(vec![Exemplar {
//!     label: "tiger".into(),
//!     vector: [0.0; 126],
//! }]).unwrap());
//! let mut pipeline = SignPipeline::new(store, &Config::default());
//!
//! let stats = FrameStats { mean_brightness: 120.0, contrast: 40.0 };
//! let decision = pipeline.process_frame(stats, &[], Instant::now());
//! assert!(!decision.quality.admit); // no hands in frame
//! ```

pub mod calibration;
pub mod classifier;
pub mod config;
pub mod dataset;
pub mod error;
pub mod labels;
pub mod normalize;
pub mod pipeline;
pub mod quality;
pub mod types;
pub mod voter;

// Re-exports for convenience
pub use calibration::{CalibrationEngine, CalibrationSettings, CalibrationState};
pub use classifier::{ClassificationResult, SignClassifier};
pub use config::Config;
pub use dataset::{Exemplar, ExemplarStore};
pub use error::{SignError, SignResult};
pub use normalize::{normalize, SlotAssigner};
pub use pipeline::{FrameDecision, SignPipeline};
pub use quality::{FrameStats, QualityDecision, QualityStatus};
pub use types::{
    CalibrationProfile, CalibrationSample, HandObservation, Handedness, Landmark,
    NormalizedVector, Observation, QualityThresholds, VoteThresholds,
};
pub use voter::{TemporalVoter, VoteDecision, VoteEntry};
