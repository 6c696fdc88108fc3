//! Target position placement

use nback_core::SequenceConstraints;
use rand::Rng;

/// Chooses which trials are targets.
///
/// Positions before `n_back` are never eligible and no target run may exceed
/// `max_consec_targets`. That run cap alone decides how many targets fit.
/// Chain breaking (no targets at both `i - n_back` and `i`) is a preference:
/// the placer skips a chained position only while the plan can still be met.
pub struct TargetPlacer<'a> {
    constraints: &'a SequenceConstraints,
}

impl<'a> TargetPlacer<'a> {
    pub fn new(constraints: &'a SequenceConstraints) -> Self {
        Self { constraints }
    }

    /// Largest target count that fits under the run cap.
    pub fn max_feasible(&self) -> usize {
        self.capacity(self.constraints.n_back, 0)
    }

    /// Requested target count reduced to what can actually be placed.
    pub fn planned_count(&self) -> usize {
        self.constraints.expected_targets().min(self.max_feasible())
    }

    /// Most targets that fit in `start..n_trials` when the target run ending
    /// just before `start` has length `run`.
    ///
    /// Leftmost packing is optimal here: top up the open run, leave one gap,
    /// then repeat blocks of `max_consec_targets` targets and one gap.
    pub fn capacity(&self, start: usize, run: usize) -> usize {
        let cap = self.constraints.max_consec_targets;
        let start = start.max(self.constraints.n_back);
        let left = self.constraints.n_trials.saturating_sub(start);
        let open = cap.saturating_sub(run);
        if left <= open {
            return left;
        }
        let rest = left - open - 1;
        open + (rest / (cap + 1)) * cap + (rest % (cap + 1)).min(cap)
    }

    /// Randomly place exactly `count` targets, left to right.
    ///
    /// At every eligible position the placer only takes a branch (place or
    /// skip) from which the remaining quota still fits, so `count` must not
    /// exceed [`max_feasible`](Self::max_feasible). Between two open branches
    /// it skips chained positions and otherwise places with probability
    /// `remaining quota / open positions`.
    pub fn place(&self, count: usize, rng: &mut impl Rng) -> Vec<bool> {
        let n_trials = self.constraints.n_trials;
        let mut chosen = vec![false; n_trials];
        let mut needed = count;
        let mut run = 0;

        for i in self.constraints.n_back..n_trials {
            if needed == 0 {
                break;
            }

            let place_ok = run < self.constraints.max_consec_targets
                && 1 + self.capacity(i + 1, run + 1) >= needed;
            let skip_ok = self.capacity(i + 1, 0) >= needed;

            let place = match (place_ok, skip_ok) {
                (true, true) if self.chains(&chosen, i) => false,
                (true, true) => {
                    let open = self.open_positions(&chosen, i, needed);
                    rng.gen_bool((needed as f64 / open as f64).min(1.0))
                }
                (true, false) => true,
                _ => false,
            };

            if place {
                chosen[i] = true;
                needed -= 1;
                run += 1;
            } else {
                run = 0;
            }
        }

        chosen
    }

    /// Positions from `i` on still worth a target, for the place probability.
    ///
    /// With chain breaking, every chosen target blocks the slot `n_back` later
    /// and each of the `needed` targets still to come will block one more.
    fn open_positions(&self, chosen: &[bool], i: usize, needed: usize) -> usize {
        let n_trials = self.constraints.n_trials;
        let remaining = n_trials - i;
        if !self.constraints.break_target_chains {
            return remaining;
        }
        let n_back = self.constraints.n_back;
        let blocked = (i - n_back..i)
            .filter(|&p| chosen[p] && p + n_back < n_trials)
            .count();
        remaining.saturating_sub(blocked + needed).max(needed)
    }

    /// Whether a target at `i` would repeat the target `n_back` trials earlier.
    fn chains(&self, chosen: &[bool], i: usize) -> bool {
        self.constraints.break_target_chains && chosen[i - self.constraints.n_back]
    }
}
