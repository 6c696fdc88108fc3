//! Configuration error types.

use thiserror::Error;

/// Structural problems with a [`SequenceConstraints`](crate::SequenceConstraints) value.
///
/// These are detected before any random draw and are never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// N must be at least 1.
    #[error("n_back must be at least 1")]
    NBackZero,

    /// No position could ever be a target.
    #[error("n_trials ({n_trials}) must exceed n_back ({n_back})")]
    TooFewTrials { n_trials: usize, n_back: usize },

    /// A rate is NaN or outside [0, 1].
    #[error("{name} must lie in [0, 1], got {value}")]
    RateOutOfRange { name: &'static str, value: f64 },

    /// A count limit that must be at least 1 was 0.
    #[error("{name} must be at least 1")]
    ZeroLimit { name: &'static str },

    /// ITI bounds are reversed.
    #[error("Invalid ITI range: min {min_ms}ms exceeds max {max_ms}ms")]
    InvalidItiRange { min_ms: u32, max_ms: u32 },

    /// No symbols to draw from.
    #[error("Alphabet is empty")]
    EmptyAlphabet,

    /// The retry budget allows no attempt at all.
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,
}

impl ConfigError {
    pub fn rate_out_of_range(name: &'static str, value: f64) -> Self {
        Self::RateOutOfRange { name, value }
    }

    pub fn zero_limit(name: &'static str) -> Self {
        Self::ZeroLimit { name }
    }
}

/// Result type for configuration checks.
pub type ConfigResult<T> = Result<T, ConfigError>;
