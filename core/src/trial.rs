//! Trial structures.
//!
//! A sequence is an ordered list of [`TrialSpec`]s. The presentation layer
//! renders each one and owns everything that happens after generation.

use serde::{Deserialize, Serialize};

/// Marker code for a target stimulus onset.
pub const MARK_STIM_TARGET: u8 = 41;
/// Marker code for a plain non-target stimulus onset.
pub const MARK_STIM_NONTARGET: u8 = 42;
/// Marker code for an n-1 lure stimulus onset.
pub const MARK_STIM_LURE_N_MINUS_1: u8 = 43;
/// Marker code for an n+1 lure stimulus onset.
pub const MARK_STIM_LURE_N_PLUS_1: u8 = 44;

/// Lure classification of a non-target trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LureType {
    /// Not a lure.
    #[default]
    #[serde(rename = "none")]
    None,
    /// Matches the stimulus (N-1) positions earlier.
    #[serde(rename = "n-1")]
    NMinus1,
    /// Matches the stimulus (N+1) positions earlier.
    #[serde(rename = "n+1")]
    NPlus1,
}

impl LureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LureType::None => "none",
            LureType::NMinus1 => "n-1",
            LureType::NPlus1 => "n+1",
        }
    }

    /// Backward distance to the referenced stimulus for a given N.
    ///
    /// Returns `None` for [`LureType::None`] and for an n-1 lure at N = 1,
    /// where the offset would point at the trial itself.
    pub fn offset(&self, n_back: usize) -> Option<usize> {
        match self {
            LureType::None => None,
            LureType::NMinus1 => n_back.checked_sub(1).filter(|&d| d > 0),
            LureType::NPlus1 => Some(n_back + 1),
        }
    }

    /// Index of the referenced earlier trial for a lure at `position`.
    pub fn reference(&self, position: usize, n_back: usize) -> Option<usize> {
        self.offset(n_back).and_then(|d| position.checked_sub(d))
    }

    pub fn is_lure(&self) -> bool {
        !matches!(self, LureType::None)
    }
}

impl std::fmt::Display for LureType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One position in a generated sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrialSpec {
    /// Symbol shown on this trial.
    pub stimulus: char,
    /// True iff `stimulus` equals the stimulus N positions earlier.
    pub is_target: bool,
    /// Lure tag; always [`LureType::None`] on targets.
    pub lure_type: LureType,
    /// Inter-trial interval following this trial, in milliseconds.
    pub iti_ms: u32,
}

impl TrialSpec {
    pub fn new(stimulus: char, is_target: bool, lure_type: LureType, iti_ms: u32) -> Self {
        Self {
            stimulus,
            is_target,
            lure_type,
            iti_ms,
        }
    }

    pub fn kind(&self) -> TrialKind {
        if self.is_target {
            return TrialKind::Target;
        }
        match self.lure_type {
            LureType::None => TrialKind::NonTarget,
            LureType::NMinus1 => TrialKind::LureNMinus1,
            LureType::NPlus1 => TrialKind::LureNPlus1,
        }
    }
}

/// Coarse classification of a trial, as seen by event markers and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrialKind {
    Target,
    NonTarget,
    LureNMinus1,
    LureNPlus1,
}

impl TrialKind {
    /// Stimulus-onset marker code for this kind of trial.
    pub fn marker_code(&self) -> u8 {
        match self {
            TrialKind::Target => MARK_STIM_TARGET,
            TrialKind::NonTarget => MARK_STIM_NONTARGET,
            TrialKind::LureNMinus1 => MARK_STIM_LURE_N_MINUS_1,
            TrialKind::LureNPlus1 => MARK_STIM_LURE_N_PLUS_1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lure_offsets() {
        assert_eq!(LureType::None.offset(2), None);
        assert_eq!(LureType::NMinus1.offset(2), Some(1));
        assert_eq!(LureType::NMinus1.offset(3), Some(2));
        assert_eq!(LureType::NPlus1.offset(2), Some(3));
    }

    #[test]
    fn test_n_minus_1_has_no_offset_at_one_back() {
        // Offset 0 would compare a trial with itself
        assert_eq!(LureType::NMinus1.offset(1), None);
        assert_eq!(LureType::NMinus1.reference(4, 1), None);
    }

    #[test]
    fn test_reference_before_start() {
        assert_eq!(LureType::NPlus1.reference(5, 2), Some(2));
        assert_eq!(LureType::NPlus1.reference(2, 2), None);
        assert_eq!(LureType::None.reference(9, 2), None);
    }

    #[test]
    fn test_kind_prefers_target() {
        let target = TrialSpec::new('B', true, LureType::None, 600);
        let lure = TrialSpec::new('B', false, LureType::NPlus1, 600);
        let plain = TrialSpec::new('C', false, LureType::None, 600);

        assert_eq!(target.kind().marker_code(), MARK_STIM_TARGET);
        assert_eq!(lure.kind(), TrialKind::LureNPlus1);
        assert_eq!(plain.kind().marker_code(), MARK_STIM_NONTARGET);
    }

    #[test]
    fn test_lure_type_wire_names() {
        let trial = TrialSpec::new('K', false, LureType::NMinus1, 512);
        let json = serde_json::to_string(&trial).unwrap();
        assert!(json.contains(r#""lure_type":"n-1""#), "{}", json);

        let back: TrialSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, trial);
    }
}
