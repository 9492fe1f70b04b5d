//! Error types for signsense-core.
//!
//! This module defines the central error type [`SignError`] used throughout
//! the crate, along with the [`SignResult<T>`] type alias.
//!
//! # Propagation Policy
//!
//! Row-level and per-frame failures are absorbed locally and degrade to a
//! safe default (zero vector, "idle" label, unchanged thresholds). Only
//! total exemplar-dataset unavailability escalates to the caller, because
//! classification is impossible without it.

use thiserror::Error;

/// Top-level error type for signsense-core operations.
///
/// # Examples
///
/// ```rust
/// use signsense_core::SignError;
///
/// let err = SignError::MalformedRow {
///     line: 12,
///     message: "expected 127 columns, got 4".to_string(),
/// };
/// assert!(err.to_string().contains("12"));
/// ```
#[derive(Debug, Error)]
pub enum SignError {
    /// The exemplar dataset could not be loaded or contained no valid rows.
    ///
    /// Fatal at startup: classification cannot run without at least one
    /// exemplar. Never raised mid-session.
    #[error("Exemplar dataset unavailable: {0}")]
    Dataset(String),

    /// A single dataset row failed to parse.
    ///
    /// Recovered by skipping the row and counting it; never fatal on its
    /// own. Surfaces through [`ExemplarStore::skipped_rows`].
    ///
    /// [`ExemplarStore::skipped_rows`]: crate::dataset::ExemplarStore::skipped_rows
    #[error("Malformed dataset row at line {line}: {message}")]
    MalformedRow {
        /// 1-based line number in the source file
        line: usize,
        /// Description of the parse failure
        message: String,
    },

    /// A calibration session finished with zero collected samples.
    ///
    /// The session ends in the Failed state and the previously active
    /// thresholds are retained unchanged. A calibration is never adopted
    /// from zero evidence.
    #[error("Calibration session captured no samples")]
    EmptyCalibration,

    /// A hand observation did not carry the expected 21 landmarks.
    ///
    /// Treated as an absent hand (all-zero feature vector), not fatal.
    #[error("Invalid hand observation: expected {expected} landmarks, got {actual}")]
    InvalidInput {
        /// Expected landmark count (always 21)
        expected: usize,
        /// Actual landmark count provided
        actual: usize,
    },

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A calibration profile record failed to serialize or deserialize.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<config::ConfigError> for SignError {
    fn from(err: config::ConfigError) -> Self {
        SignError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for SignError {
    fn from(err: serde_json::Error) -> Self {
        SignError::Serialization(err.to_string())
    }
}

/// Result type alias for signsense-core operations.
pub type SignResult<T> = Result<T, SignError>;
