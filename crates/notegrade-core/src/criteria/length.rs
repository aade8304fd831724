//! Length criterion.
//!
//! **Question**: Does the note fit within the character limit?
//!
//! Length is counted in Unicode scalar values, not bytes, so the 300
//! character limit means the same thing for every script.

use crate::profile::ProfileRecord;
use crate::types::{CriterionResult, CriterionType};

use super::Criterion;

/// Character limit for a connection note.
pub const DEFAULT_MAX_LENGTH: usize = 300;

/// Check that `note` has at most `max_length` characters.
///
/// Evidence is the measured length whether or not the check passes.
pub fn check_length(note: &str, max_length: usize) -> CriterionResult<usize> {
    let length = note.chars().count();
    CriterionResult::new(length <= max_length, length)
}

/// The length criterion.
#[derive(Debug, Clone, Copy)]
pub struct LengthCriterion {
    max_length: usize,
}

impl LengthCriterion {
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }
}

impl Default for LengthCriterion {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LENGTH)
    }
}

impl Criterion for LengthCriterion {
    type Evidence = usize;

    fn criterion_type(&self) -> CriterionType {
        CriterionType::Length
    }

    fn check(&self, note: &str, _profile: &ProfileRecord) -> CriterionResult<usize> {
        check_length(note, self.max_length)
    }
}
