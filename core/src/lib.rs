//! N-back Core Types
//!
//! This crate provides the foundational types shared by the validator and the
//! generator:
//! - Trial types (TrialSpec, LureType, TrialKind)
//! - The stimulus alphabet
//! - SequenceConstraints, the immutable configuration of one generation call
//! - Configuration errors
//! - Per-sequence summary statistics

mod alphabet;
mod constraints;
mod error;
mod summary;
mod trial;

pub use alphabet::*;
pub use constraints::*;
pub use error::*;
pub use summary::*;
pub use trial::*;
