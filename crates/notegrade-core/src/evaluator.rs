//! Evaluator: runs the four criteria and assembles the verdict.
//!
//! The evaluator has no retry or recovery logic. Each criterion is a pure
//! function of the note and profile, and the verdict is exactly their four
//! results under fixed keys.

use std::sync::Arc;

use crate::criteria::{
    Criterion, DetailsCriterion, LengthCriterion, PolarityScorer, SymbolsCriterion,
    ToneCriterion,
};
use crate::profile::ProfileRecord;
use crate::types::VerdictRecord;

/// The Evaluator scores notes against the rubric.
///
/// Immutable once built; share one instance freely across threads.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    length: LengthCriterion,
    details: DetailsCriterion,
    tone: ToneCriterion,
    symbols: SymbolsCriterion,
}

impl Evaluator {
    /// Evaluator with the 300 character limit and the VADER scorer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different character limit.
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.length = LengthCriterion::new(max_length);
        self
    }

    /// Use a different polarity scorer.
    pub fn with_scorer(mut self, scorer: Arc<dyn PolarityScorer>) -> Self {
        self.tone = ToneCriterion::with_scorer(scorer);
        self
    }

    /// The configured character limit.
    pub fn max_length(&self) -> usize {
        self.length.max_length()
    }

    /// Evaluate a note written for `profile`.
    ///
    /// This function is fully deterministic: same inputs always produce the
    /// same verdict.
    pub fn evaluate(&self, note: &str, profile: &ProfileRecord) -> VerdictRecord {
        let verdict = VerdictRecord {
            length_ok: self.length.check(note, profile),
            specific_details_ok: self.details.check(note, profile),
            tone: self.tone.check(note, profile),
            professional_text: self.symbols.check(note, profile),
        };

        tracing::debug!(
            length_ok = verdict.length_ok.passed,
            specific_details_ok = verdict.specific_details_ok.passed,
            tone = %verdict.tone.evidence,
            professional_text = verdict.professional_text.passed,
            "Note evaluated"
        );

        verdict
    }
}
