//! Per-sequence statistics.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::trial::{TrialKind, TrialSpec};

/// Counts describing one generated sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SequenceSummary {
    pub trials: usize,
    pub targets: usize,
    pub lures_n_minus_1: usize,
    pub lures_n_plus_1: usize,
    /// Lure draws that could not be honored and were left untagged.
    pub demoted_lures: usize,
    pub symbol_counts: BTreeMap<char, usize>,
}

impl SequenceSummary {
    pub fn from_trials(trials: &[TrialSpec]) -> Self {
        let mut summary = Self {
            trials: trials.len(),
            ..Self::default()
        };
        for trial in trials {
            match trial.kind() {
                TrialKind::Target => summary.targets += 1,
                TrialKind::LureNMinus1 => summary.lures_n_minus_1 += 1,
                TrialKind::LureNPlus1 => summary.lures_n_plus_1 += 1,
                TrialKind::NonTarget => {}
            }
            *summary.symbol_counts.entry(trial.stimulus).or_insert(0) += 1;
        }
        summary
    }

    pub fn with_demoted_lures(mut self, demoted: usize) -> Self {
        self.demoted_lures = demoted;
        self
    }

    /// Observed proportion of target trials.
    pub fn target_rate(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.targets as f64 / self.trials as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trial::LureType;

    #[test]
    fn test_summary_counts() {
        let trials = vec![
            TrialSpec::new('A', false, LureType::None, 500),
            TrialSpec::new('B', false, LureType::None, 500),
            TrialSpec::new('A', true, LureType::None, 500),
            TrialSpec::new('A', false, LureType::NMinus1, 500),
        ];

        let summary = SequenceSummary::from_trials(&trials);

        assert_eq!(summary.trials, 4);
        assert_eq!(summary.targets, 1);
        assert_eq!(summary.lures_n_minus_1, 1);
        assert_eq!(summary.lures_n_plus_1, 0);
        assert_eq!(summary.symbol_counts.get(&'A'), Some(&3));
        assert!((summary.target_rate() - 0.25).abs() < f64::EPSILON);
    }
}
