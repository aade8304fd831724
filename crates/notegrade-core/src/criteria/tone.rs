//! Tone criterion
//!
//! **Question**: Is the note free of negative tone?
//!
//! A lexicon/rule-based polarity scorer produces a compound score in
//! `[-1, 1]`, which maps to a label:
//!
//! | Compound score | Tone | Result |
//! |----------------|------|--------|
//! | `>= 0.05` | positive | PASS |
//! | between | neutral | PASS |
//! | `<= -0.05` | negative | FAIL |
//!
//! The default scorer is VADER. Its lexicon is loaded once per process and
//! only ever read, so scoring from many threads needs no locking.

use std::fmt;
use std::sync::Arc;

use crate::profile::ProfileRecord;
use crate::types::{CriterionResult, CriterionType, Tone};

use super::Criterion;

/// Compound score at or above which a note is positive.
pub const POSITIVE_THRESHOLD: f64 = 0.05;

/// Compound score at or below which a note is negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

/// A sentiment scorer producing a compound polarity in `[-1, 1]`.
///
/// Implementations must be stateless across calls.
pub trait PolarityScorer: Send + Sync {
    /// Compound polarity of `text`.
    fn compound(&self, text: &str) -> f64;
}

/// VADER lexicon and rule based scorer.
///
/// Handles negation, intensifiers and punctuation emphasis. Symbols and
/// hash-marked words only contribute their lexical sentiment, if any.
#[derive(Debug, Clone, Copy, Default)]
pub struct VaderScorer;

impl PolarityScorer for VaderScorer {
    fn compound(&self, text: &str) -> f64 {
        // The analyzer only borrows the crate's static lexicons.
        let analyzer = vader_sentiment::SentimentIntensityAnalyzer::new();
        let scores = analyzer.polarity_scores(text);
        scores.get("compound").copied().unwrap_or(0.0)
    }
}

impl Tone {
    /// Map a compound polarity score to a tone label.
    ///
    /// A NaN score is neutral.
    pub fn from_compound(score: f64) -> Self {
        if score >= POSITIVE_THRESHOLD {
            Tone::Positive
        } else if score <= NEGATIVE_THRESHOLD {
            Tone::Negative
        } else {
            Tone::Neutral
        }
    }
}

/// Classify the tone of `note` with `scorer`.
///
/// Positive and neutral notes pass. Evidence is the label, not the score.
pub fn check_tone(note: &str, scorer: &dyn PolarityScorer) -> CriterionResult<Tone> {
    let score = scorer.compound(note);
    let tone = Tone::from_compound(score);

    tracing::trace!(score, tone = %tone, "Tone classified");

    CriterionResult::new(tone != Tone::Negative, tone)
}

/// The tone criterion.
#[derive(Clone)]
pub struct ToneCriterion {
    scorer: Arc<dyn PolarityScorer>,
}

impl ToneCriterion {
    pub fn new() -> Self {
        Self::with_scorer(Arc::new(VaderScorer))
    }

    pub fn with_scorer(scorer: Arc<dyn PolarityScorer>) -> Self {
        Self { scorer }
    }
}

impl Default for ToneCriterion {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ToneCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToneCriterion").finish_non_exhaustive()
    }
}

impl Criterion for ToneCriterion {
    type Evidence = Tone;

    fn criterion_type(&self) -> CriterionType {
        CriterionType::Tone
    }

    fn check(&self, note: &str, _profile: &ProfileRecord) -> CriterionResult<Tone> {
        check_tone(note, self.scorer.as_ref())
    }
}
