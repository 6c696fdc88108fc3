//! Generation error types

use nback_constraint::{ViolationKind, Violations};
use nback_core::{ConfigError, SequenceConstraints, TrialSpec};
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors that can occur during sequence generation
#[derive(Error, Debug)]
pub enum GenerationError {
    /// Parameters are structurally impossible; raised before any random draw.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
    /// Every attempt in the retry budget failed validation.
    #[error("Constraints unsatisfiable: {0}")]
    ConstraintUnsatisfiable(Box<Unsatisfiable>),
}

impl GenerationError {
    pub fn unsatisfiable(
        constraints: SequenceConstraints,
        attempts: usize,
        violations: Violations,
        last_candidate: Vec<TrialSpec>,
    ) -> Self {
        Self::ConstraintUnsatisfiable(Box::new(Unsatisfiable {
            constraints,
            attempts,
            violations,
            last_candidate,
        }))
    }

    /// Violation kinds of the last attempt, empty for configuration errors.
    pub fn violated(&self) -> BTreeSet<ViolationKind> {
        match self {
            Self::InvalidConfiguration(_) => BTreeSet::new(),
            Self::ConstraintUnsatisfiable(details) => details.violations.kinds(),
        }
    }
}

/// Diagnostics for an exhausted retry budget.
#[derive(Debug, Clone)]
pub struct Unsatisfiable {
    /// The constraint set that could not be met.
    pub constraints: SequenceConstraints,
    /// Attempts made.
    pub attempts: usize,
    /// Violations of the last attempt.
    pub violations: Violations,
    /// The last rejected sequence, kept for inspection only.
    pub last_candidate: Vec<TrialSpec>,
}

impl std::fmt::Display for Unsatisfiable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kinds: Vec<&str> = self.violations.kinds().iter().map(|k| k.as_str()).collect();
        write!(
            f,
            "{}-back, {} trials: no valid sequence after {} attempts (last violated: {})",
            self.constraints.n_back,
            self.constraints.n_trials,
            self.attempts,
            kinds.join(", ")
        )
    }
}

/// Result type for generation.
pub type GenerationResult<T> = Result<T, GenerationError>;
