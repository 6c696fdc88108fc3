//! Sequence violation types.

use std::collections::BTreeSet;

use serde::Serialize;

/// Which rule a sequence broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// A target before position N.
    EarlyTarget,
    /// Target count outside ±1 of the requested count.
    TargetCount,
    /// A run of targets longer than allowed.
    ConsecutiveTargets,
    /// A trial tagged both as target and as lure.
    LureTargetOverlap,
    /// An identical-symbol run longer than allowed that no target or lure forced.
    IdenticalRun,
    /// A lure whose symbol does not match its reference position.
    LureMismatch,
    /// `is_target` disagrees with the N-back comparison.
    TargetMismatch,
    /// Sequence length differs from `n_trials`.
    LengthMismatch,
    /// A stimulus outside the alphabet.
    UnknownSymbol,
    /// An ITI outside the configured range.
    ItiOutOfRange,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::EarlyTarget => "early_target",
            ViolationKind::TargetCount => "target_count",
            ViolationKind::ConsecutiveTargets => "consecutive_targets",
            ViolationKind::LureTargetOverlap => "lure_target_overlap",
            ViolationKind::IdenticalRun => "identical_run",
            ViolationKind::LureMismatch => "lure_mismatch",
            ViolationKind::TargetMismatch => "target_mismatch",
            ViolationKind::LengthMismatch => "length_mismatch",
            ViolationKind::UnknownSymbol => "unknown_symbol",
            ViolationKind::ItiOutOfRange => "iti_out_of_range",
        }
    }
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single broken rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// The rule that was broken.
    pub kind: ViolationKind,
    /// Human-readable message describing the violation.
    pub message: String,
    /// Trial index involved, when the rule is positional.
    pub position: Option<usize>,
}

impl Violation {
    /// Create a new sequence-wide violation.
    pub fn new(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            position: None,
        }
    }

    /// Create a violation anchored at a trial index.
    pub fn at(kind: ViolationKind, position: usize, message: impl Into<String>) -> Self {
        Self::new(kind, message).with_position(position)
    }

    /// Add a trial index to the violation context.
    pub fn with_position(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.position {
            Some(pos) => write!(f, "[{}] trial {}: {}", self.kind, pos, self.message),
            None => write!(f, "[{}] {}", self.kind, self.message),
        }
    }
}

/// Collection of violations found in one sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Violations {
    violations: Vec<Violation>,
}

impl Violations {
    /// Create a new empty violations collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a violation.
    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// True when the sequence satisfied every rule.
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    /// Check if there are any violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Distinct kinds of rule that were broken.
    pub fn kinds(&self) -> BTreeSet<ViolationKind> {
        self.violations.iter().map(|v| v.kind).collect()
    }

    /// Check whether a particular rule was broken.
    pub fn contains(&self, kind: ViolationKind) -> bool {
        self.violations.iter().any(|v| v.kind == kind)
    }

    /// Violations of one kind.
    pub fn of_kind(&self, kind: ViolationKind) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.kind == kind)
    }

    /// Get all violations.
    pub fn all(&self) -> &[Violation] {
        &self.violations
    }

    /// Get the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Merge another violations collection.
    pub fn merge(&mut self, other: Violations) {
        self.violations.extend(other.violations);
    }
}

impl Extend<Violation> for Violations {
    fn extend<I: IntoIterator<Item = Violation>>(&mut self, iter: I) {
        self.violations.extend(iter);
    }
}

impl FromIterator<Violation> for Violations {
    fn from_iter<I: IntoIterator<Item = Violation>>(iter: I) -> Self {
        Self {
            violations: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.into_iter()
    }
}

impl<'a> IntoIterator for &'a Violations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}
