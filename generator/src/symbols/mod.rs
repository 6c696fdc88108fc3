//! Lure draws and stimulus assignment

use nback_core::{LureType, SequenceConstraints, TrialSpec};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// Redraws allowed when an ordinary symbol lands on a lure offset.
const MAX_RESAMPLES: usize = 8;

/// One candidate sequence before validation.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub trials: Vec<TrialSpec>,
    /// Lure draws that fired but could not be honored.
    pub demoted_lures: usize,
}

/// Assigns lure tags, stimuli and ITIs around a fixed set of target positions.
///
/// Symbols are filled strictly left to right. Every reference a target or lure
/// needs (`n_back`, `n_back - 1` or `n_back + 1` trials back) is already
/// assigned when it is read.
pub struct SymbolAssigner<'a> {
    constraints: &'a SequenceConstraints,
    seq: Vec<char>,
    /// Usage count per alphabet index, for soft balancing.
    counts: Vec<usize>,
}

impl<'a> SymbolAssigner<'a> {
    pub fn new(constraints: &'a SequenceConstraints) -> Self {
        Self {
            constraints,
            seq: Vec::with_capacity(constraints.n_trials),
            counts: vec![0; constraints.alphabet.len()],
        }
    }

    /// Build a full candidate from the target mask.
    pub fn assign(mut self, targets: &[bool], rng: &mut impl Rng) -> Candidate {
        let mut lures = Vec::with_capacity(targets.len());
        let mut demoted_lures = 0;

        for (i, &is_target) in targets.iter().enumerate() {
            let (symbol, lure) = match self.target_symbol(i) {
                Some(symbol) if is_target => (symbol, LureType::None),
                _ => match self.draw_lure(i, rng) {
                    LureType::None => (self.draw_ordinary(i, rng), LureType::None),
                    lure => match self.honor_lure(i, lure) {
                        Some(symbol) => (symbol, lure),
                        None => {
                            tracing::debug!(position = i, lure = %lure, "lure demoted");
                            demoted_lures += 1;
                            (self.draw_ordinary(i, rng), LureType::None)
                        }
                    },
                },
            };
            self.push(symbol);
            lures.push(lure);
        }

        let (min_ms, max_ms) = self.constraints.iti_range;
        let trials = self
            .seq
            .iter()
            .zip(targets)
            .zip(lures)
            .map(|((&stimulus, &is_target), lure_type)| {
                TrialSpec::new(stimulus, is_target, lure_type, rng.gen_range(min_ms..=max_ms))
            })
            .collect();

        Candidate {
            trials,
            demoted_lures,
        }
    }

    /// Decide the lure tag of a non-target trial. n-1 wins when both would fire.
    fn draw_lure(&self, i: usize, rng: &mut impl Rng) -> LureType {
        let c = self.constraints;
        if LureType::NMinus1.reference(i, c.n_back).is_some() && rng.gen_bool(c.lure_nminus1_rate)
        {
            return LureType::NMinus1;
        }
        if LureType::NPlus1.reference(i, c.n_back).is_some() && rng.gen_bool(c.lure_nplus1_rate) {
            return LureType::NPlus1;
        }
        LureType::None
    }

    /// The symbol a lure must copy, if copying it is allowed here.
    fn honor_lure(&self, i: usize, lure: LureType) -> Option<char> {
        let reference = lure.reference(i, self.constraints.n_back)?;
        let symbol = self.seq[reference];
        if self.target_symbol(i) == Some(symbol) {
            return None;
        }
        if self.run_if_appended(symbol) > self.constraints.max_identical_letter_run {
            return None;
        }
        Some(symbol)
    }

    /// Draw a symbol for a plain non-target trial.
    ///
    /// The N-back symbol and run-breaking repeats are excluded outright; lure
    /// offsets are avoided by bounded redraws.
    fn draw_ordinary(&self, i: usize, rng: &mut impl Rng) -> char {
        let c = self.constraints;
        let target = self.target_symbol(i);
        let mut candidates: Vec<char> = c
            .alphabet
            .symbols()
            .iter()
            .copied()
            .filter(|&s| Some(s) != target)
            .filter(|&s| self.run_if_appended(s) <= c.max_identical_letter_run)
            .collect();
        if candidates.is_empty() {
            candidates = c.alphabet.symbols().to_vec();
        }

        let avoid: Vec<char> = [LureType::NMinus1, LureType::NPlus1]
            .iter()
            .filter_map(|lure| lure.reference(i, c.n_back))
            .map(|r| self.seq[r])
            .collect();

        let mut symbol = self.pick(&candidates, rng);
        for _ in 0..MAX_RESAMPLES {
            if !avoid.contains(&symbol) {
                break;
            }
            symbol = self.pick(&candidates, rng);
        }
        symbol
    }

    /// Pick from `candidates`, weighting rarely used symbols up when balancing.
    fn pick(&self, candidates: &[char], rng: &mut impl Rng) -> char {
        if self.constraints.soft_balance {
            let max_count = self.counts.iter().copied().max().unwrap_or(0);
            let weights = candidates
                .iter()
                .map(|&s| max_count - self.count_of(s) + 1);
            if let Ok(dist) = WeightedIndex::new(weights) {
                return candidates[dist.sample(rng)];
            }
        }
        candidates[rng.gen_range(0..candidates.len())]
    }

    fn count_of(&self, symbol: char) -> usize {
        self.constraints
            .alphabet
            .index_of(symbol)
            .map_or(0, |idx| self.counts[idx])
    }

    fn target_symbol(&self, i: usize) -> Option<char> {
        i.checked_sub(self.constraints.n_back).map(|r| self.seq[r])
    }

    /// Length of the identical run ending at the new trial if `symbol` is appended.
    fn run_if_appended(&self, symbol: char) -> usize {
        1 + self.seq.iter().rev().take_while(|&&s| s == symbol).count()
    }

    fn push(&mut self, symbol: char) {
        if let Some(idx) = self.constraints.alphabet.index_of(symbol) {
            self.counts[idx] += 1;
        }
        self.seq.push(symbol);
    }
}
