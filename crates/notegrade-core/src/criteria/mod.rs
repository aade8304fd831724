//! The four rubric criteria.
//!
//! Each criterion answers one question about a note and evaluates
//! independently of the others.
//!
//! ## Criterion Independence
//!
//! - No criterion reads another criterion's result
//! - No shared mutable state; every check is a pure function of its input
//! - Checks may run in any order, or concurrently

mod details;
mod length;
mod symbols;
mod tone;

pub use details::{check_details, DetailsCriterion, MAX_DETAIL_MATCHES, MIN_DETAIL_MATCHES};
pub use length::{check_length, LengthCriterion, DEFAULT_MAX_LENGTH};
pub use symbols::{check_symbols, contains_hash_marker, pictographic_symbols, SymbolsCriterion, HASH_MARKER};
pub use tone::{
    check_tone, PolarityScorer, ToneCriterion, VaderScorer, NEGATIVE_THRESHOLD,
    POSITIVE_THRESHOLD,
};

use crate::profile::ProfileRecord;
use crate::types::{CriterionResult, CriterionType};

/// Trait implemented by all criteria.
pub trait Criterion {
    /// Criterion-specific evidence type.
    type Evidence;

    /// Which criterion this is.
    fn criterion_type(&self) -> CriterionType;

    /// Check a note against this criterion.
    ///
    /// # Arguments
    ///
    /// * `note` - The candidate message, unnormalized
    /// * `profile` - The profile the note was written for
    fn check(&self, note: &str, profile: &ProfileRecord) -> CriterionResult<Self::Evidence>;
}
