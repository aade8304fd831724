//! Note generators.
//!
//! A [`NoteGenerator`] writes a connection note for a profile. Prompting a
//! language model lives behind this trait; the bundled
//! [`CannedNoteGenerator`] serves notes generated ahead of time.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use notegrade_core::{profile_id_from_url, ProfileRecord};

use crate::credentials::{ApiKey, AuthError};

/// Errors from note generation.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Generator unavailable: {0}")]
    Unavailable(String),

    #[error("No note available for {0}")]
    NotFound(String),

    #[error("Generator returned an empty note")]
    Empty,

    #[error("Note generation timed out")]
    Timeout,
}

impl GenerationError {
    /// Whether retrying the same request can succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, GenerationError::Unavailable(_) | GenerationError::Timeout)
    }
}

/// Everything a generator gets to write one note.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub profile_url: String,
    pub profile: ProfileRecord,
    pub api_key: Option<ApiKey>,
}

/// Writes connection notes.
#[async_trait]
pub trait NoteGenerator: Send + Sync {
    /// Generate a note for the profile in `request`.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;

    /// Generator name for logging.
    fn name(&self) -> &str;
}

/// Serves notes pre-generated into a JSON file.
///
/// The file maps a profile URL or profile id to the note text.
#[derive(Debug, Clone, Default)]
pub struct CannedNoteGenerator {
    notes: HashMap<String, String>,
    require_key: bool,
}

impl CannedNoteGenerator {
    pub fn new(notes: HashMap<String, String>) -> Self {
        Self {
            notes,
            require_key: false,
        }
    }

    /// Parse notes from JSON text.
    pub fn from_json(json: &str) -> Result<Self, GenerationError> {
        let notes: HashMap<String, String> = serde_json::from_str(json)
            .map_err(|e| GenerationError::Unavailable(format!("malformed notes file: {}", e)))?;
        Ok(Self::new(notes))
    }

    /// Load notes from a JSON file.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, GenerationError> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| GenerationError::Unavailable(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&contents)
    }

    /// Refuse requests that carry no API key, like a hosted generator would.
    pub fn requiring_api_key(mut self) -> Self {
        self.require_key = true;
        self
    }

    fn lookup(&self, profile_url: &str) -> Option<&String> {
        self.notes.get(profile_url).or_else(|| {
            profile_id_from_url(profile_url).and_then(|id| self.notes.get(&id))
        })
    }
}

#[async_trait]
impl NoteGenerator for CannedNoteGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        if self.require_key && request.api_key.is_none() {
            return Err(GenerationError::Auth(AuthError::MissingApiKey));
        }

        let note = self
            .lookup(&request.profile_url)
            .ok_or_else(|| GenerationError::NotFound(request.profile_url.clone()))?;

        let note = note.trim();
        if note.is_empty() {
            return Err(GenerationError::Empty);
        }
        Ok(note.to_string())
    }

    fn name(&self) -> &str {
        "canned"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(url: &str) -> GenerationRequest {
        GenerationRequest {
            profile_url: url.to_string(),
            profile: ProfileRecord::default(),
            api_key: None,
        }
    }

    fn generator() -> CannedNoteGenerator {
        CannedNoteGenerator::from_json(
            r#"{
                "https://www.linkedin.com/in/jane-doe": "  Loved your Python work!  ",
                "john-roe": "Your Analyst role stood out.",
                "blank": "   "
            }"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_lookup_by_url_trims_output() {
        let note = generator()
            .generate(&request("https://www.linkedin.com/in/jane-doe"))
            .await
            .unwrap();
        assert_eq!(note, "Loved your Python work!");
    }

    #[tokio::test]
    async fn test_lookup_by_profile_id() {
        let note = generator()
            .generate(&request("https://www.linkedin.com/in/john-roe/"))
            .await
            .unwrap();
        assert_eq!(note, "Your Analyst role stood out.");
    }

    #[tokio::test]
    async fn test_blank_note_is_empty_error() {
        let result = generator().generate(&request("blank")).await;
        assert!(matches!(result, Err(GenerationError::Empty)));
    }

    #[tokio::test]
    async fn test_unknown_profile() {
        let result = generator().generate(&request("nobody")).await;
        assert!(matches!(result, Err(GenerationError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_missing_key_rejected_when_required() {
        let generator = generator().requiring_api_key();
        let result = generator.generate(&request("john-roe")).await;
        assert!(matches!(
            result,
            Err(GenerationError::Auth(AuthError::MissingApiKey))
        ));

        let mut with_key = request("john-roe");
        with_key.api_key = Some(ApiKey::new("sk-test").unwrap());
        assert!(generator.generate(&with_key).await.is_ok());
    }

    #[test]
    fn test_transient_errors() {
        assert!(GenerationError::Timeout.is_transient());
        assert!(GenerationError::Unavailable("503".to_string()).is_transient());
        assert!(!GenerationError::Empty.is_transient());
        assert!(!GenerationError::Auth(AuthError::MissingApiKey).is_transient());
    }
}
