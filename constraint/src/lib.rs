//! N-back Constraint
//!
//! Validate a candidate trial sequence against its constraints.
//!
//! Responsibilities:
//! - Check every structural and statistical rule independently
//! - Report each violation with its kind and, where meaningful, its position
//! - Never mutate the sequence under inspection

mod checker;
mod violation;

pub use checker::{validate, SequenceChecker};
pub use violation::{Violation, ViolationKind, Violations};
