//! Sequence checking.

use nback_core::{SequenceConstraints, TrialSpec};

use crate::violation::{Violation, ViolationKind, Violations};

/// Check `trials` against `constraints` and collect every violation.
///
/// An empty result means the sequence passed.
pub fn validate(trials: &[TrialSpec], constraints: &SequenceConstraints) -> Violations {
    SequenceChecker::new(constraints, trials).check_all()
}

/// Sequence checker.
///
/// Each `check_*` method covers one rule and can be run on its own.
pub struct SequenceChecker<'c, 't> {
    constraints: &'c SequenceConstraints,
    trials: &'t [TrialSpec],
}

impl<'c, 't> SequenceChecker<'c, 't> {
    /// Create a new sequence checker.
    pub fn new(constraints: &'c SequenceConstraints, trials: &'t [TrialSpec]) -> Self {
        Self {
            constraints,
            trials,
        }
    }

    /// Run every check.
    pub fn check_all(&self) -> Violations {
        let mut violations = Violations::new();
        violations.merge(self.check_length());
        violations.merge(self.check_early_targets());
        violations.merge(self.check_target_count());
        violations.merge(self.check_consecutive_targets());
        violations.merge(self.check_lure_target_overlap());
        violations.merge(self.check_identical_runs());
        violations.merge(self.check_lures());
        violations.merge(self.check_target_flags());
        violations.merge(self.check_symbols());
        violations.merge(self.check_iti());
        violations
    }

    pub fn check_length(&self) -> Violations {
        let mut violations = Violations::new();
        if self.trials.len() != self.constraints.n_trials {
            violations.push(Violation::new(
                ViolationKind::LengthMismatch,
                format!(
                    "Expected {} trials, got {}",
                    self.constraints.n_trials,
                    self.trials.len()
                ),
            ));
        }
        violations
    }

    pub fn check_early_targets(&self) -> Violations {
        let n_back = self.constraints.n_back;
        self.trials
            .iter()
            .enumerate()
            .take(n_back)
            .filter(|(_, t)| t.is_target)
            .map(|(i, _)| {
                Violation::at(
                    ViolationKind::EarlyTarget,
                    i,
                    format!("Target in the first {} trials", n_back),
                )
            })
            .collect()
    }

    pub fn check_target_count(&self) -> Violations {
        let mut violations = Violations::new();
        let desired = self.constraints.expected_targets();
        let actual = self.trials.iter().filter(|t| t.is_target).count();
        if actual.abs_diff(desired) > 1 {
            violations.push(Violation::new(
                ViolationKind::TargetCount,
                format!("Target count {} outside ±1 around {}", actual, desired),
            ));
        }
        violations
    }

    pub fn check_consecutive_targets(&self) -> Violations {
        let mut violations = Violations::new();
        let max = self.constraints.max_consec_targets;
        let mut run = 0;
        for (i, trial) in self.trials.iter().enumerate() {
            if !trial.is_target {
                run = 0;
                continue;
            }
            run += 1;
            // Report each offending run once, where it first exceeds the cap.
            if run == max + 1 {
                violations.push(Violation::at(
                    ViolationKind::ConsecutiveTargets,
                    i,
                    format!("More than {} consecutive targets", max),
                ));
            }
        }
        violations
    }

    pub fn check_lure_target_overlap(&self) -> Violations {
        let mut violations = Violations::new();
        for (i, trial) in self.trials.iter().enumerate() {
            if trial.is_target && trial.lure_type.is_lure() {
                violations.push(Violation::at(
                    ViolationKind::LureTargetOverlap,
                    i,
                    format!("{} lure double-counted as target", trial.lure_type),
                ));
            }
        }
        violations
    }

    /// Runs longer than the cap are excused only where every extending trial
    /// was forced by a target or a tagged lure.
    pub fn check_identical_runs(&self) -> Violations {
        let mut violations = Violations::new();
        let max = self.constraints.max_identical_letter_run;
        let mut run = 0;
        let mut prev: Option<char> = None;
        for (i, trial) in self.trials.iter().enumerate() {
            if prev == Some(trial.stimulus) {
                run += 1;
            } else {
                run = 1;
            }
            prev = Some(trial.stimulus);

            let forced = trial.is_target || trial.lure_type.is_lure();
            if run > max && !forced {
                violations.push(Violation::at(
                    ViolationKind::IdenticalRun,
                    i,
                    format!(
                        "Run of {} identical '{}' exceeds {}",
                        run, trial.stimulus, max
                    ),
                ));
            }
        }
        violations
    }

    pub fn check_lures(&self) -> Violations {
        let mut violations = Violations::new();
        let n_back = self.constraints.n_back;
        for (i, trial) in self.trials.iter().enumerate() {
            if !trial.lure_type.is_lure() {
                continue;
            }
            let Some(offset) = trial.lure_type.offset(n_back) else {
                // Only an n-1 lure at N = 1 lands here.
                violations.push(Violation::at(
                    ViolationKind::LureMismatch,
                    i,
                    "n-1 lure is undefined for 1-back",
                ));
                continue;
            };
            let Some(reference) = i.checked_sub(offset) else {
                continue;
            };
            let expected = self.trials[reference].stimulus;
            if trial.stimulus != expected {
                violations.push(Violation::at(
                    ViolationKind::LureMismatch,
                    i,
                    format!(
                        "{} lure '{}' does not match '{}' at trial {}",
                        trial.lure_type, trial.stimulus, expected, reference
                    ),
                ));
            }
        }
        violations
    }

    /// `is_target` must be true exactly where the N-back symbols match.
    pub fn check_target_flags(&self) -> Violations {
        let mut violations = Violations::new();
        let n_back = self.constraints.n_back;
        for (i, trial) in self.trials.iter().enumerate().skip(n_back) {
            let matches = trial.stimulus == self.trials[i - n_back].stimulus;
            if matches != trial.is_target {
                let message = if trial.is_target {
                    format!("Target '{}' does not repeat trial {}", trial.stimulus, i - n_back)
                } else {
                    format!(
                        "Untagged '{}' repeats trial {} ({}-back match)",
                        trial.stimulus,
                        i - n_back,
                        n_back
                    )
                };
                violations.push(Violation::at(ViolationKind::TargetMismatch, i, message));
            }
        }
        violations
    }

    pub fn check_symbols(&self) -> Violations {
        let mut violations = Violations::new();
        for (i, trial) in self.trials.iter().enumerate() {
            if !self.constraints.alphabet.contains(trial.stimulus) {
                violations.push(Violation::at(
                    ViolationKind::UnknownSymbol,
                    i,
                    format!("'{}' is not in the alphabet", trial.stimulus),
                ));
            }
        }
        violations
    }

    pub fn check_iti(&self) -> Violations {
        let mut violations = Violations::new();
        let (min_ms, max_ms) = self.constraints.iti_range;
        for (i, trial) in self.trials.iter().enumerate() {
            if !self.constraints.iti_in_range(trial.iti_ms) {
                violations.push(Violation::at(
                    ViolationKind::ItiOutOfRange,
                    i,
                    format!("ITI {}ms outside [{}, {}]", trial.iti_ms, min_ms, max_ms),
                ));
            }
        }
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nback_core::LureType;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    /// Build plain trials from a symbol string; targets and lures are patched in by tests.
    fn trials(symbols: &str) -> Vec<TrialSpec> {
        symbols
            .chars()
            .map(|c| TrialSpec::new(c, false, LureType::None, 600))
            .collect()
    }

    fn constraints(n_back: usize, n_trials: usize, target_rate: f64) -> SequenceConstraints {
        SequenceConstraints::new(n_back, n_trials).with_target_rate(target_rate)
    }

    #[test]
    fn test_valid_two_back_sequence_passes() {
        // GIVEN: targets at 2 (repeats A) and 5 (repeats C)
        let mut seq = trials("ABACDC");
        seq[2].is_target = true;
        seq[5].is_target = true;
        let c = constraints(2, 6, 0.34);

        // WHEN
        let violations = validate(&seq, &c);

        // THEN
        assert!(violations.passed(), "{:?}", violations);
    }

    #[test]
    fn test_early_target() {
        let mut seq = trials("AABCDE");
        seq[1].is_target = true;
        let c = constraints(2, 6, 0.0);

        let violations = SequenceChecker::new(&c, &seq).check_early_targets();

        assert_eq!(violations.len(), 1);
        assert_eq!(violations.all()[0].position, Some(1));
    }

    #[test]
    fn test_target_count_tolerance() {
        // 0.5 * 10 = 5 requested; 4 and 6 pass, 3 fails
        let c = constraints(1, 10, 0.5);
        let mut seq = trials("ABCDEFGHJK");
        for i in [1, 3, 5] {
            seq[i].is_target = true;
        }
        let checker = SequenceChecker::new(&c, &seq);
        assert!(checker.check_target_count().contains(ViolationKind::TargetCount));

        seq[7].is_target = true;
        let checker = SequenceChecker::new(&c, &seq);
        assert!(checker.check_target_count().passed());
    }

    #[test]
    fn test_consecutive_targets_reported_once_per_run() {
        let c = constraints(1, 8, 0.5).with_max_consec_targets(1);
        let mut seq = trials("AAAABBBB");
        for i in [1, 2, 3, 5, 6] {
            seq[i].is_target = true;
        }

        let violations = SequenceChecker::new(&c, &seq).check_consecutive_targets();

        let positions: Vec<_> = violations.all().iter().map(|v| v.position).collect();
        assert_eq!(positions, vec![Some(2), Some(6)]);
    }

    #[test]
    fn test_lure_target_overlap() {
        let c = constraints(2, 4, 0.25);
        let mut seq = trials("ABAB");
        seq[2].is_target = true;
        seq[2].lure_type = LureType::NPlus1;

        let violations = SequenceChecker::new(&c, &seq).check_lure_target_overlap();
        assert_eq!(violations.kinds(), BTreeSet::from([ViolationKind::LureTargetOverlap]));
    }

    #[test]
    fn test_identical_run_over_cap() {
        let c = constraints(2, 6, 0.0).with_max_identical_letter_run(2);
        let seq = trials("ABBBCD");

        let violations = SequenceChecker::new(&c, &seq).check_identical_runs();

        assert_eq!(violations.len(), 1);
        assert_eq!(violations.all()[0].position, Some(3));
    }

    #[test]
    fn test_identical_run_excused_when_forced() {
        // 1-back targets force repeats: A A A with both repeats tagged
        let c = constraints(1, 5, 0.4).with_max_identical_letter_run(1);
        let mut seq = trials("BAAAC");
        seq[2].is_target = true;
        seq[3].is_target = true;

        let violations = SequenceChecker::new(&c, &seq).check_identical_runs();
        assert!(violations.passed(), "{:?}", violations);
    }

    #[test]
    fn test_lure_correctness() {
        let c = constraints(2, 6, 0.0);
        // n-1 at 3 references 2 ('C' == 'C'); n+1 at 4 references 1 ('B' != 'D')
        let mut seq = trials("ABCCDE");
        seq[3].lure_type = LureType::NMinus1;
        seq[4].lure_type = LureType::NPlus1;

        let violations = SequenceChecker::new(&c, &seq).check_lures();

        assert_eq!(violations.len(), 1);
        assert_eq!(violations.all()[0].position, Some(4));
    }

    #[test]
    fn test_lure_with_negative_reference_is_skipped() {
        let c = constraints(2, 4, 0.0);
        let mut seq = trials("ABCD");
        seq[1].lure_type = LureType::NPlus1;

        assert!(SequenceChecker::new(&c, &seq).check_lures().passed());
    }

    #[test]
    fn test_n_minus_1_lure_rejected_at_one_back() {
        let c = constraints(1, 4, 0.0);
        let mut seq = trials("ABCD");
        seq[2].lure_type = LureType::NMinus1;

        let violations = SequenceChecker::new(&c, &seq).check_lures();
        assert!(violations.contains(ViolationKind::LureMismatch));
    }

    #[test]
    fn test_untagged_target_match() {
        let c = constraints(2, 5, 0.0);
        let seq = trials("ABADE");

        let violations = SequenceChecker::new(&c, &seq).check_target_flags();

        assert_eq!(violations.len(), 1);
        assert_eq!(violations.all()[0].position, Some(2));
    }

    #[test]
    fn test_symbols_and_iti() {
        let c = constraints(1, 3, 0.0).with_alphabet("ABC").with_iti_range(500, 900);
        let mut seq = trials("ABZ");
        seq[0].iti_ms = 450;

        let violations = validate(&seq, &c);

        assert!(violations.contains(ViolationKind::UnknownSymbol));
        assert!(violations.contains(ViolationKind::ItiOutOfRange));
    }

    #[test]
    fn test_length_mismatch() {
        let c = constraints(1, 5, 0.0);
        let seq = trials("ABC");
        assert!(validate(&seq, &c).contains(ViolationKind::LengthMismatch));
    }

    #[test]
    fn test_validate_does_not_mutate() {
        let c = constraints(2, 6, 0.0);
        let seq = trials("ABBBCD");
        let before = seq.clone();

        let _ = validate(&seq, &c);

        assert_eq!(seq, before);
    }
}
