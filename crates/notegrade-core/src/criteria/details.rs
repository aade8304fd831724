//! Specific Details criterion
//!
//! **Question**: Does the note mention one or two profile details?
//!
//! ## State Conditions
//!
//! | Matches | Result | Reason |
//! |---------|--------|--------|
//! | 0 | FAIL | Not personalized |
//! | 1-2 | PASS | Specific without reciting the profile |
//! | 3+ | FAIL | Over-specific |
//!
//! Candidates are the whitespace tokens of the first `experience`,
//! `education` and `skills` entries. Each candidate the note mentions as a
//! whole word (case-insensitive) counts once, duplicates included.

use crate::profile::{candidate_tokens, matching_tokens, ProfileRecord};
use crate::types::{CriterionResult, CriterionType};

use super::Criterion;

/// Fewest matched details for a pass.
pub const MIN_DETAIL_MATCHES: usize = 1;

/// Most matched details for a pass.
pub const MAX_DETAIL_MATCHES: usize = 2;

/// Check that `note` mentions between one and two sampled profile tokens.
///
/// Evidence is the list of matched tokens in candidate order.
pub fn check_details(note: &str, profile: &ProfileRecord) -> CriterionResult<Vec<String>> {
    let candidates = candidate_tokens(profile);
    let matches = matching_tokens(note, &candidates);
    let passed = (MIN_DETAIL_MATCHES..=MAX_DETAIL_MATCHES).contains(&matches.len());

    tracing::trace!(
        candidates = candidates.len(),
        matches = matches.len(),
        passed,
        "Detail matching complete"
    );

    CriterionResult::new(passed, matches)
}

/// The specific details criterion.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetailsCriterion;

impl DetailsCriterion {
    pub fn new() -> Self {
        Self
    }
}

impl Criterion for DetailsCriterion {
    type Evidence = Vec<String>;

    fn criterion_type(&self) -> CriterionType {
        CriterionType::SpecificDetails
    }

    fn check(&self, note: &str, profile: &ProfileRecord) -> CriterionResult<Vec<String>> {
        check_details(note, profile)
    }
}
