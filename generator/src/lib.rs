//! Constrained N-back Sequence Generator
//!
//! This crate builds randomized N-back trial sequences by generate-then-validate:
//! - Plans how many targets fit under the run cap and places them, avoiding
//!   N-back chains where the plan allows
//! - Draws lures and assigns stimuli left to right
//! - Draws an ITI per trial
//! - Runs the validator and retries with fresh draws until a candidate passes
//!
//! One seeded random stream is created per top-level call and advanced across
//! attempts, so a fixed seed reproduces the whole call.

pub mod error;
pub mod placement;
pub mod symbols;

pub use error::{GenerationError, GenerationResult, Unsatisfiable};
pub use nback_constraint::{validate, Violation, ViolationKind, Violations};
pub use nback_core::*;
pub use placement::TargetPlacer;
pub use symbols::{Candidate, SymbolAssigner};

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Generate a sequence for `constraints`.
pub fn generate(constraints: &SequenceConstraints) -> GenerationResult<Vec<TrialSpec>> {
    let mut generator = SequenceGenerator::new(constraints.clone())?;
    Ok(generator.run()?.trials)
}

/// An accepted sequence plus how it was obtained.
#[derive(Debug, Clone)]
pub struct GeneratedSequence {
    pub trials: Vec<TrialSpec>,
    /// 1-based attempt that passed validation.
    pub attempt: usize,
    /// Target count the placer aimed for after feasibility reduction.
    pub planned_targets: usize,
    /// Lure draws in the accepted attempt that could not be honored.
    pub demoted_lures: usize,
}

impl GeneratedSequence {
    pub fn summary(&self) -> SequenceSummary {
        SequenceSummary::from_trials(&self.trials).with_demoted_lures(self.demoted_lures)
    }
}

/// Main entry point for sequence generation
pub struct SequenceGenerator {
    constraints: SequenceConstraints,
    rng: StdRng,
}

impl SequenceGenerator {
    /// Check the constraints and seed the random stream.
    pub fn new(constraints: SequenceConstraints) -> GenerationResult<Self> {
        constraints.check()?;
        let rng = match constraints.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self { constraints, rng })
    }

    pub fn constraints(&self) -> &SequenceConstraints {
        &self.constraints
    }

    /// Generate candidates until one validates or the budget runs out.
    pub fn run(&mut self) -> GenerationResult<GeneratedSequence> {
        let c = &self.constraints;
        let placer = TargetPlacer::new(c);
        let requested = c.expected_targets();
        let planned = placer.planned_count();
        if planned < requested {
            tracing::debug!(
                requested,
                planned,
                n_back = c.n_back,
                n_trials = c.n_trials,
                "target count reduced to feasible maximum"
            );
        }

        let mut last = None;
        for attempt in 1..=c.max_attempts {
            let targets = placer.place(planned, &mut self.rng);
            let candidate = SymbolAssigner::new(c).assign(&targets, &mut self.rng);
            let violations = validate(&candidate.trials, c);

            if violations.passed() {
                tracing::info!(
                    attempt,
                    n_back = c.n_back,
                    n_trials = c.n_trials,
                    targets = planned,
                    demoted_lures = candidate.demoted_lures,
                    "sequence accepted"
                );
                return Ok(GeneratedSequence {
                    trials: candidate.trials,
                    attempt,
                    planned_targets: planned,
                    demoted_lures: candidate.demoted_lures,
                });
            }

            tracing::debug!(attempt, violated = ?violations.kinds(), "candidate rejected");
            last = Some((candidate.trials, violations));
        }

        let (last_candidate, violations) = last.unwrap_or_default();
        tracing::warn!(
            attempts = c.max_attempts,
            violated = ?violations.kinds(),
            "retry budget exhausted"
        );
        Err(GenerationError::unsatisfiable(
            c.clone(),
            c.max_attempts,
            violations,
            last_candidate,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_generate_default_block() {
        let c = SequenceConstraints::block(2, 120).with_seed(42);

        let trials = generate(&c).unwrap();

        assert_eq!(trials.len(), 120);
        assert!(validate(&trials, &c).passed());
    }

    #[test]
    fn test_invalid_configuration_before_drawing() {
        let c = SequenceConstraints::new(2, 2).with_seed(1);

        let err = generate(&c).unwrap_err();

        assert!(matches!(
            err,
            GenerationError::InvalidConfiguration(ConfigError::TooFewTrials { .. })
        ));
        assert!(err.violated().is_empty());
    }

    #[test]
    fn test_run_reports_attempt_and_plan() {
        let c = SequenceConstraints::practice(1, 20).with_seed(7);
        let mut gen = SequenceGenerator::new(c).unwrap();

        let generated = gen.run().unwrap();

        assert!(generated.attempt >= 1);
        assert_eq!(generated.planned_targets, 5);
        assert_eq!(generated.demoted_lures, 0);
        assert_eq!(generated.summary().targets, 5);
    }

    #[test]
    fn test_repeated_runs_advance_the_stream() {
        let c = SequenceConstraints::block(2, 40).with_seed(99);
        let mut gen = SequenceGenerator::new(c.clone()).unwrap();

        let first = gen.run().unwrap().trials;
        let second = gen.run().unwrap().trials;

        assert_eq!(first, generate(&c).unwrap());
        assert_ne!(first, second);
    }
}
