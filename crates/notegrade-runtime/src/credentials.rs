//! Credentials for the note generation service.

use std::env;
use std::fmt;
use thiserror::Error;

/// Environment variable holding the generation API key.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Errors raised when a credential is missing or refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("{API_KEY_VAR} must be set in the environment")]
    MissingApiKey,

    #[error("Credential rejected: {0}")]
    Rejected(String),
}

/// API key for the note generator. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a key, rejecting blank values.
    pub fn new(key: impl Into<String>) -> Result<Self, AuthError> {
        let key = key.into().trim().to_string();
        if key.is_empty() {
            return Err(AuthError::MissingApiKey);
        }
        Ok(Self(key))
    }

    /// Read the key from `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self, AuthError> {
        match env::var(API_KEY_VAR) {
            Ok(value) => Self::new(value),
            Err(_) => Err(AuthError::MissingApiKey),
        }
    }

    /// The raw key, for handing to a service client.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_key_is_missing() {
        assert_eq!(ApiKey::new("   "), Err(AuthError::MissingApiKey));
        assert_eq!(ApiKey::new(""), Err(AuthError::MissingApiKey));
    }

    #[test]
    fn test_key_is_trimmed() {
        let key = ApiKey::new("  sk-test \n").unwrap();
        assert_eq!(key.expose(), "sk-test");
    }

    #[test]
    fn test_debug_is_redacted() {
        let key = ApiKey::new("sk-very-secret").unwrap();
        let printed = format!("{:?}", key);
        assert!(!printed.contains("sk-very-secret"));
        assert!(printed.contains("redacted"));
    }

    #[test]
    fn test_missing_key_message_names_variable() {
        assert!(AuthError::MissingApiKey.to_string().contains("OPENAI_API_KEY"));
    }
}
