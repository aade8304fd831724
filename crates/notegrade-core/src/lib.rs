//! # notegrade-core
//!
//! Deterministic quality rubric for generated connection notes.
//!
//! This crate scores a short networking message against the profile it was
//! written for, answering four questions:
//! - Does it fit within 300 characters?
//! - Does it mention one or two concrete profile details?
//! - Is its tone non-negative?
//! - Is it free of emoji and hashtags?
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same input always produces same output
//! 2. **Pure**: No I/O, no clock, no shared mutable state
//! 3. **Infallible**: Any note and profile yield a verdict
//! 4. **Parallel-safe**: Criteria evaluate independently
//!
//! ## Example
//!
//! ```rust,ignore
//! use notegrade_core::{evaluate, ProfileRecord};
//!
//! let profile = ProfileRecord::from_json_file("profile.json")?;
//! let verdict = evaluate("Loved your work as a Developer!", &profile);
//!
//! for (criterion, passed) in verdict.outcomes() {
//!     println!("{}: {}", criterion, if passed { "Pass" } else { "Fail" });
//! }
//! ```

pub mod criteria;
pub mod evaluator;
pub mod profile;
pub mod types;

// Re-export main types at crate root
pub use criteria::{
    check_details, check_length, check_symbols, check_tone, Criterion, PolarityScorer,
    VaderScorer, DEFAULT_MAX_LENGTH,
};
pub use evaluator::Evaluator;
pub use profile::{candidate_tokens, profile_id_from_url, ProfileError, ProfileRecord};
pub use types::{CriterionResult, CriterionType, Tone, VerdictRecord};

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors raised at the input boundary, before evaluation starts.
///
/// Evaluation itself never fails.
#[derive(Error, Debug)]
pub enum EvaluationError {
    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to read request: {0}")]
    Io(#[from] std::io::Error),
}

/// A note paired with the profile it was written for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvaluationRequest {
    /// The candidate message
    pub note: String,

    /// The profile the message addresses
    #[serde(default)]
    pub profile: ProfileRecord,
}

impl EvaluationRequest {
    pub fn new(note: impl Into<String>, profile: ProfileRecord) -> Self {
        Self {
            note: note.into(),
            profile,
        }
    }

    /// Parse and validate a request from JSON.
    ///
    /// Expects `{"note": <string>, "profile": {...}}`. A missing profile is
    /// an empty profile; a missing or non-string note is invalid input.
    pub fn from_json(json: &str) -> Result<Self, EvaluationError> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| EvaluationError::InvalidInput(format!("malformed JSON: {}", e)))?;

        let mut object = match value {
            serde_json::Value::Object(map) => map,
            other => {
                return Err(EvaluationError::InvalidInput(format!(
                    "request must be a JSON object, found {}",
                    profile::json_kind(&other)
                )))
            }
        };

        let note = match object.remove("note") {
            Some(serde_json::Value::String(note)) => note,
            Some(other) => {
                return Err(EvaluationError::InvalidInput(format!(
                    "note must be a string, found {}",
                    profile::json_kind(&other)
                )))
            }
            None => return Err(EvaluationError::InvalidInput("note is required".to_string())),
        };

        let profile = match object.remove("profile") {
            None | Some(serde_json::Value::Null) => ProfileRecord::default(),
            Some(value) => ProfileRecord::from_json_value(value)?,
        };

        Ok(Self { note, profile })
    }

    /// Parse and validate a request from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, EvaluationError> {
        let path = path.as_ref();
        if !profile::is_json_path(path) {
            return Err(EvaluationError::InvalidInput(format!(
                "request file must be JSON: {}",
                path.display()
            )));
        }
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }
}

/// Evaluate a note against the rubric.
///
/// This is the main entry point. Uses the 300 character limit and the VADER
/// polarity scorer; build an [`Evaluator`] to change either.
///
/// # Arguments
///
/// * `note` - The candidate message
/// * `profile` - The profile the note was written for
///
/// # Returns
///
/// A `VerdictRecord` with one pass/fail-plus-evidence entry per criterion.
pub fn evaluate(note: &str, profile: &ProfileRecord) -> VerdictRecord {
    Evaluator::new().evaluate(note, profile)
}

/// Evaluate a parsed request.
pub fn evaluate_request(request: &EvaluationRequest) -> VerdictRecord {
    evaluate(&request.note, &request.profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_from_json() {
        let request = EvaluationRequest::from_json(
            r#"{"note": "Hello Developer", "profile": {"experience": ["Developer"]}}"#,
        )
        .unwrap();
        assert_eq!(request.note, "Hello Developer");
        assert_eq!(request.profile.experience, vec!["Developer"]);

        let verdict = evaluate_request(&request);
        assert!(verdict.specific_details_ok.passed);
    }

    #[test]
    fn test_request_without_profile_uses_empty_profile() {
        let request = EvaluationRequest::from_json(r#"{"note": "Hello"}"#).unwrap();
        assert_eq!(request.profile, ProfileRecord::default());
    }

    #[test]
    fn test_non_string_note_is_invalid_input() {
        let result = EvaluationRequest::from_json(r#"{"note": 42, "profile": {}}"#);
        assert!(matches!(result, Err(EvaluationError::InvalidInput(_))));

        let result = EvaluationRequest::from_json(r#"{"profile": {}}"#);
        assert!(matches!(result, Err(EvaluationError::InvalidInput(_))));
    }

    #[test]
    fn test_malformed_profile_rejected() {
        let result = EvaluationRequest::from_json(r#"{"note": "Hi", "profile": "Developer"}"#);
        assert!(matches!(
            result,
            Err(EvaluationError::Profile(ProfileError::InvalidInput(_)))
        ));
    }

    #[test]
    fn test_request_must_be_object() {
        let result = EvaluationRequest::from_json(r#""just a note""#);
        assert!(matches!(result, Err(EvaluationError::InvalidInput(_))));
    }
}
