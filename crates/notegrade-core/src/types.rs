//! Core types for note evaluation.
//!
//! These are the records that flow out of the evaluator: one
//! [`CriterionResult`] per rubric criterion, collected into a
//! [`VerdictRecord`] with four fixed keys.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Outcome of a single criterion: pass/fail plus criterion-specific evidence.
///
/// On the wire this is a two-element array `[passed, evidence]`, the shape
/// existing results files already use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriterionResult<E> {
    /// Authoritative pass/fail signal
    pub passed: bool,

    /// Informational evidence (length, matched tokens, tone label, symbols)
    pub evidence: E,
}

impl<E> CriterionResult<E> {
    pub fn new(passed: bool, evidence: E) -> Self {
        Self { passed, evidence }
    }
}

impl<E: Serialize> Serialize for CriterionResult<E> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (self.passed, &self.evidence).serialize(serializer)
    }
}

impl<'de, E: Deserialize<'de>> Deserialize<'de> for CriterionResult<E> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (passed, evidence) = <(bool, E)>::deserialize(deserializer)?;
        Ok(Self { passed, evidence })
    }
}

/// Three-way tone label derived from a compound polarity score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Positive,
    Neutral,
    Negative,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Positive => "positive",
            Tone::Neutral => "neutral",
            Tone::Negative => "negative",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four rubric criteria.
///
/// Declaration order is the order verdicts are reported in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum CriterionType {
    Length,
    SpecificDetails,
    Tone,
    ProfessionalText,
}

impl CriterionType {
    /// All criteria in reporting order.
    pub const ALL: [CriterionType; 4] = [
        CriterionType::Length,
        CriterionType::SpecificDetails,
        CriterionType::Tone,
        CriterionType::ProfessionalText,
    ];

    /// Key of this criterion in a serialized [`VerdictRecord`].
    pub fn key(&self) -> &'static str {
        match self {
            CriterionType::Length => "length_ok",
            CriterionType::SpecificDetails => "specific_details_ok",
            CriterionType::Tone => "tone",
            CriterionType::ProfessionalText => "professional_text",
        }
    }

    /// The rubric question this criterion answers.
    pub fn question(&self) -> &'static str {
        match self {
            CriterionType::Length => "Does the note fit within the character limit?",
            CriterionType::SpecificDetails => "Does the note mention one or two profile details?",
            CriterionType::Tone => "Is the note free of negative tone?",
            CriterionType::ProfessionalText => "Is the note free of emoji and hashtags?",
        }
    }
}

impl fmt::Display for CriterionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Verdict for one note: the four criteria under fixed keys.
///
/// Created fresh per evaluation and never mutated by the evaluator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerdictRecord {
    /// Character count against the maximum length
    pub length_ok: CriterionResult<usize>,

    /// Profile tokens the note mentions
    pub specific_details_ok: CriterionResult<Vec<String>>,

    /// Tone label of the note
    pub tone: CriterionResult<Tone>,

    /// Pictographic symbols found in the note
    #[serde(alias = "professional text")]
    pub professional_text: CriterionResult<Vec<String>>,
}

impl VerdictRecord {
    /// Whether a single criterion passed.
    pub fn passed(&self, criterion: CriterionType) -> bool {
        match criterion {
            CriterionType::Length => self.length_ok.passed,
            CriterionType::SpecificDetails => self.specific_details_ok.passed,
            CriterionType::Tone => self.tone.passed,
            CriterionType::ProfessionalText => self.professional_text.passed,
        }
    }

    /// Pass/fail per criterion in reporting order.
    pub fn outcomes(&self) -> [(CriterionType, bool); 4] {
        CriterionType::ALL.map(|c| (c, self.passed(c)))
    }

    /// True when every criterion passed.
    pub fn all_passed(&self) -> bool {
        CriterionType::ALL.iter().all(|c| self.passed(*c))
    }

    /// Criteria that failed, in reporting order.
    pub fn failed(&self) -> Vec<CriterionType> {
        CriterionType::ALL
            .into_iter()
            .filter(|c| !self.passed(*c))
            .collect()
    }

    /// Evidence for a criterion as a JSON value, for display.
    pub fn evidence_json(&self, criterion: CriterionType) -> serde_json::Value {
        match criterion {
            CriterionType::Length => serde_json::json!(self.length_ok.evidence),
            CriterionType::SpecificDetails => serde_json::json!(self.specific_details_ok.evidence),
            CriterionType::Tone => serde_json::json!(self.tone.evidence),
            CriterionType::ProfessionalText => serde_json::json!(self.professional_text.evidence),
        }
    }
}
