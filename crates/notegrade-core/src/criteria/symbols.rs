//! Professional Text criterion
//!
//! **Question**: Is the note free of emoji and hashtags?
//!
//! ## Built-in Patterns
//!
//! | Category | Pattern |
//! |----------|---------|
//! | Pictographic | Unicode `Extended_Pictographic` or `Emoji_Presentation` |
//! | Hashtag | The literal `#` anywhere in the note |
//!
//! Evidence lists the pictographic characters found, in order and with
//! duplicates. The hashtag flag affects only the pass/fail result.

use lazy_static::lazy_static;
use regex::Regex;

use crate::profile::ProfileRecord;
use crate::types::{CriterionResult, CriterionType};

use super::Criterion;

/// The hashtag marker.
pub const HASH_MARKER: char = '#';

lazy_static! {
    // One character per match so duplicates and order survive find_iter.
    static ref PICTOGRAPHIC_PATTERN: Regex = Regex::new(
        r"[\p{Extended_Pictographic}\p{Emoji_Presentation}]"
    ).unwrap();
}

/// Pictographic characters in `note`, in order of appearance.
pub fn pictographic_symbols(note: &str) -> Vec<String> {
    PICTOGRAPHIC_PATTERN
        .find_iter(note)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Whether `note` contains the hashtag marker.
pub fn contains_hash_marker(note: &str) -> bool {
    note.contains(HASH_MARKER)
}

/// Check that `note` has no pictographic symbols and no `#`.
pub fn check_symbols(note: &str) -> CriterionResult<Vec<String>> {
    let symbols = pictographic_symbols(note);
    let has_hash = contains_hash_marker(note);

    tracing::trace!(symbols = symbols.len(), has_hash, "Symbol scan complete");

    CriterionResult::new(symbols.is_empty() && !has_hash, symbols)
}

/// The professional text criterion.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolsCriterion;

impl SymbolsCriterion {
    pub fn new() -> Self {
        Self
    }
}

impl Criterion for SymbolsCriterion {
    type Evidence = Vec<String>;

    fn criterion_type(&self) -> CriterionType {
        CriterionType::ProfessionalText
    }

    fn check(&self, note: &str, _profile: &ProfileRecord) -> CriterionResult<Vec<String>> {
        check_symbols(note)
    }
}
