//! Constraints for one sequence request.

use serde::{Deserialize, Serialize};

use crate::alphabet::Alphabet;
use crate::error::{ConfigError, ConfigResult};

/// Default proportion of target trials.
pub const TARGET_RATE: f64 = 0.30;
/// Target proportion used for practice sequences.
pub const PRACTICE_TARGET_RATE: f64 = 0.25;
/// Default n-1 lure rate among non-targets.
pub const LURE_N_MINUS_1_RATE: f64 = 0.05;
/// Default n+1 lure rate among non-targets.
pub const LURE_N_PLUS_1_RATE: f64 = 0.05;
/// Default cap on consecutive targets.
pub const MAX_CONSEC_TARGETS: usize = 1;
/// Default cap on identical consecutive symbols.
pub const MAX_IDENTICAL_RUN: usize = 2;
/// Default inclusive ITI jitter bounds in milliseconds.
pub const ITI_RANGE_MS: (u32, u32) = (500, 900);
/// Default retry budget.
pub const MAX_ATTEMPTS: usize = 300;

/// Immutable configuration for one generation call.
///
/// Deserializing fills omitted fields from [`SequenceConstraints::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConstraints {
    /// The N of N-back.
    pub n_back: usize,
    /// Sequence length.
    pub n_trials: usize,
    /// Desired proportion of target trials.
    pub target_rate: f64,
    /// Probability that a non-target becomes an n-1 lure.
    pub lure_nminus1_rate: f64,
    /// Probability that a non-target becomes an n+1 lure.
    pub lure_nplus1_rate: f64,
    /// Longest allowed run of consecutive targets.
    pub max_consec_targets: usize,
    /// Longest allowed run of identical symbols not forced by a target or lure.
    pub max_identical_letter_run: usize,
    /// Inclusive `(min_ms, max_ms)` bounds for the inter-trial interval.
    pub iti_range: (u32, u32),
    /// Symbols to draw stimuli from.
    pub alphabet: Alphabet,
    /// Seed for reproducible output; `None` draws from OS entropy.
    pub seed: Option<u64>,
    /// Number of candidate sequences tried before giving up.
    pub max_attempts: usize,
    /// Avoid placing targets at both `i - n_back` and `i` unless the planned
    /// target count needs it.
    pub break_target_chains: bool,
    /// Favour the least-used symbols when drawing ordinary trials.
    pub soft_balance: bool,
}

impl Default for SequenceConstraints {
    fn default() -> Self {
        Self {
            n_back: 2,
            n_trials: 120,
            target_rate: TARGET_RATE,
            lure_nminus1_rate: LURE_N_MINUS_1_RATE,
            lure_nplus1_rate: LURE_N_PLUS_1_RATE,
            max_consec_targets: MAX_CONSEC_TARGETS,
            max_identical_letter_run: MAX_IDENTICAL_RUN,
            iti_range: ITI_RANGE_MS,
            alphabet: Alphabet::default(),
            seed: None,
            max_attempts: MAX_ATTEMPTS,
            break_target_chains: true,
            soft_balance: true,
        }
    }
}

impl SequenceConstraints {
    pub fn new(n_back: usize, n_trials: usize) -> Self {
        Self {
            n_back,
            n_trials,
            ..Self::default()
        }
    }

    /// Constraints for a main task block.
    pub fn block(n_back: usize, n_trials: usize) -> Self {
        Self::new(n_back, n_trials)
    }

    /// Constraints for a practice run: fewer targets and no lures.
    pub fn practice(n_back: usize, n_trials: usize) -> Self {
        Self {
            target_rate: PRACTICE_TARGET_RATE,
            lure_nminus1_rate: 0.0,
            lure_nplus1_rate: 0.0,
            ..Self::new(n_back, n_trials)
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_target_rate(mut self, rate: f64) -> Self {
        self.target_rate = rate;
        self
    }

    pub fn with_lure_rates(mut self, n_minus_1: f64, n_plus_1: f64) -> Self {
        self.lure_nminus1_rate = n_minus_1;
        self.lure_nplus1_rate = n_plus_1;
        self
    }

    pub fn with_max_consec_targets(mut self, max: usize) -> Self {
        self.max_consec_targets = max;
        self
    }

    pub fn with_max_identical_letter_run(mut self, max: usize) -> Self {
        self.max_identical_letter_run = max;
        self
    }

    pub fn with_iti_range(mut self, min_ms: u32, max_ms: u32) -> Self {
        self.iti_range = (min_ms, max_ms);
        self
    }

    pub fn with_alphabet(mut self, alphabet: impl Into<Alphabet>) -> Self {
        self.alphabet = alphabet.into();
        self
    }

    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_break_target_chains(mut self, enabled: bool) -> Self {
        self.break_target_chains = enabled;
        self
    }

    pub fn with_soft_balance(mut self, enabled: bool) -> Self {
        self.soft_balance = enabled;
        self
    }

    /// Check that the constraints are structurally possible.
    pub fn check(&self) -> ConfigResult<()> {
        if self.n_back == 0 {
            return Err(ConfigError::NBackZero);
        }
        if self.n_trials <= self.n_back {
            return Err(ConfigError::TooFewTrials {
                n_trials: self.n_trials,
                n_back: self.n_back,
            });
        }
        for (name, value) in [
            ("target_rate", self.target_rate),
            ("lure_nminus1_rate", self.lure_nminus1_rate),
            ("lure_nplus1_rate", self.lure_nplus1_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::rate_out_of_range(name, value));
            }
        }
        if self.max_consec_targets == 0 {
            return Err(ConfigError::zero_limit("max_consec_targets"));
        }
        if self.max_identical_letter_run == 0 {
            return Err(ConfigError::zero_limit("max_identical_letter_run"));
        }
        let (min_ms, max_ms) = self.iti_range;
        if min_ms > max_ms {
            return Err(ConfigError::InvalidItiRange { min_ms, max_ms });
        }
        if self.alphabet.is_empty() {
            return Err(ConfigError::EmptyAlphabet);
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        Ok(())
    }

    /// Requested number of targets, `round(target_rate * n_trials)`.
    ///
    /// Halves round to even.
    pub fn expected_targets(&self) -> usize {
        (self.target_rate * self.n_trials as f64).round_ties_even() as usize
    }

    /// Whether `iti_ms` lies inside the configured bounds.
    pub fn iti_in_range(&self, iti_ms: u32) -> bool {
        let (min_ms, max_ms) = self.iti_range;
        (min_ms..=max_ms).contains(&iti_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_pass_check() {
        assert_eq!(SequenceConstraints::default().check(), Ok(()));
        assert_eq!(SequenceConstraints::practice(3, 20).check(), Ok(()));
    }

    #[test]
    fn test_practice_has_no_lures() {
        let c = SequenceConstraints::practice(2, 20);
        assert_eq!(c.target_rate, PRACTICE_TARGET_RATE);
        assert_eq!(c.lure_nminus1_rate, 0.0);
        assert_eq!(c.lure_nplus1_rate, 0.0);
        assert_eq!(c.expected_targets(), 5);
    }

    #[test]
    fn test_too_few_trials() {
        let result = SequenceConstraints::new(2, 2).check();
        assert_eq!(
            result,
            Err(ConfigError::TooFewTrials {
                n_trials: 2,
                n_back: 2
            })
        );
    }

    #[test]
    fn test_rejects_bad_rates() {
        let c = SequenceConstraints::new(2, 20).with_target_rate(1.5);
        assert!(matches!(
            c.check(),
            Err(ConfigError::RateOutOfRange {
                name: "target_rate",
                ..
            })
        ));

        let c = SequenceConstraints::new(2, 20).with_lure_rates(0.1, f64::NAN);
        assert!(matches!(
            c.check(),
            Err(ConfigError::RateOutOfRange {
                name: "lure_nplus1_rate",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_reversed_iti_range() {
        let c = SequenceConstraints::new(1, 10).with_iti_range(900, 500);
        assert_eq!(
            c.check(),
            Err(ConfigError::InvalidItiRange {
                min_ms: 900,
                max_ms: 500
            })
        );
    }

    #[test]
    fn test_rejects_zero_limits_and_empty_alphabet() {
        let c = SequenceConstraints::new(1, 10).with_max_consec_targets(0);
        assert_eq!(c.check(), Err(ConfigError::zero_limit("max_consec_targets")));

        let c = SequenceConstraints::new(1, 10).with_alphabet("");
        assert_eq!(c.check(), Err(ConfigError::EmptyAlphabet));

        let c = SequenceConstraints::new(1, 10).with_max_attempts(0);
        assert_eq!(c.check(), Err(ConfigError::ZeroAttempts));
    }

    #[test]
    fn test_expected_targets_rounds_half_to_even() {
        // 0.25 * 10 = 2.5 rounds down, 0.25 * 14 = 3.5 rounds up
        let c = SequenceConstraints::new(1, 10).with_target_rate(0.25);
        assert_eq!(c.expected_targets(), 2);
        let c = SequenceConstraints::new(1, 14).with_target_rate(0.25);
        assert_eq!(c.expected_targets(), 4);
        let c = SequenceConstraints::new(2, 20).with_target_rate(0.30);
        assert_eq!(c.expected_targets(), 6);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "n_back": 3, "n_trials": 40, "seed": 7, "alphabet": "BCDFG" }"#;
        let c: SequenceConstraints = serde_json::from_str(json).unwrap();

        assert_eq!(c.n_back, 3);
        assert_eq!(c.seed, Some(7));
        assert_eq!(c.alphabet.len(), 5);
        assert_eq!(c.target_rate, TARGET_RATE);
        assert_eq!(c.iti_range, ITI_RANGE_MS);
        assert!(c.break_target_chains);
    }
}
