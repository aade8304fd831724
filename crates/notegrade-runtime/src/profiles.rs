//! Profile sources.
//!
//! A [`ProfileSource`] turns a profile URL into a [`ProfileRecord`]. The
//! bundled [`JsonProfileSource`] reads locally stored profiles; talking to a
//! remote profile service is left to other implementations of the trait.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use notegrade_core::{profile_id_from_url, ProfileError, ProfileRecord};

use crate::credentials::AuthError;

/// Errors from fetching a profile.
#[derive(Error, Debug)]
pub enum ProfileFetchError {
    #[error("Profile not found: {0}")]
    NotFound(String),

    #[error("Invalid profile URL: {0}")]
    InvalidUrl(String),

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Profile source error: {0}")]
    Source(String),

    #[error("Profile fetch timed out")]
    Timeout,
}

impl ProfileFetchError {
    /// Whether retrying the same fetch can succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, ProfileFetchError::Timeout)
    }
}

impl From<ProfileError> for ProfileFetchError {
    fn from(e: ProfileError) -> Self {
        ProfileFetchError::Source(e.to_string())
    }
}

/// Looks up profiles by URL.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// Fetch the profile behind `profile_url`.
    async fn fetch(&self, profile_url: &str) -> Result<ProfileRecord, ProfileFetchError>;

    /// Source name for logging.
    fn name(&self) -> &str;
}

#[derive(Debug)]
enum Layout {
    /// `<profile_id>.json` or `<profile_id>.yaml` per profile
    Directory(PathBuf),
    /// One JSON object mapping profile ids (or URLs) to profiles
    Bundle(HashMap<String, ProfileRecord>),
}

/// Profiles stored on disk, either one file per profile or a single bundle.
#[derive(Debug)]
pub struct JsonProfileSource {
    layout: Layout,
}

impl JsonProfileSource {
    /// Read profiles from a directory of `<profile_id>.json|.yaml` files.
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self {
            layout: Layout::Directory(path.into()),
        }
    }

    /// Load a bundle file mapping profile ids to profiles.
    pub async fn bundle(path: impl AsRef<Path>) -> Result<Self, ProfileFetchError> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ProfileFetchError::Source(format!("{}: {}", path.display(), e)))?;
        Self::from_bundle_json(&contents)
    }

    /// Parse a bundle from JSON text.
    pub fn from_bundle_json(json: &str) -> Result<Self, ProfileFetchError> {
        let raw: HashMap<String, serde_json::Value> = serde_json::from_str(json)
            .map_err(|e| ProfileFetchError::Source(format!("malformed profile bundle: {}", e)))?;

        let mut profiles = HashMap::with_capacity(raw.len());
        for (key, value) in raw {
            let profile = ProfileRecord::from_json_value(value)
                .map_err(|e| ProfileFetchError::Source(format!("profile {}: {}", key, e)))?;
            profiles.insert(key, profile.normalized());
        }

        Ok(Self {
            layout: Layout::Bundle(profiles),
        })
    }

    /// Open `path` as a directory or bundle depending on what it is.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, ProfileFetchError> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| ProfileFetchError::Source(format!("{}: {}", path.display(), e)))?;
        if metadata.is_dir() {
            Ok(Self::directory(path))
        } else {
            Self::bundle(path).await
        }
    }

    async fn read_from_directory(
        dir: &Path,
        profile_id: &str,
    ) -> Result<ProfileRecord, ProfileFetchError> {
        for extension in ["json", "yaml", "yml"] {
            let candidate = dir.join(format!("{}.{}", profile_id, extension));
            let contents = match tokio::fs::read_to_string(&candidate).await {
                Ok(contents) => contents,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(ProfileFetchError::Source(format!(
                        "{}: {}",
                        candidate.display(),
                        e
                    )))
                }
            };

            let profile = if extension == "json" {
                ProfileRecord::from_json(&contents)?
            } else {
                ProfileRecord::from_yaml(&contents)?
            };
            return Ok(profile);
        }

        Err(ProfileFetchError::NotFound(profile_id.to_string()))
    }
}

#[async_trait]
impl ProfileSource for JsonProfileSource {
    async fn fetch(&self, profile_url: &str) -> Result<ProfileRecord, ProfileFetchError> {
        let profile_id = profile_id_from_url(profile_url)
            .ok_or_else(|| ProfileFetchError::InvalidUrl(profile_url.to_string()))?;

        match &self.layout {
            Layout::Directory(dir) => {
                // Ids come from user input; keep lookups inside the directory
                if profile_id.contains('/') || profile_id.contains('\\') || profile_id == ".." {
                    return Err(ProfileFetchError::InvalidUrl(profile_url.to_string()));
                }
                Self::read_from_directory(dir, &profile_id).await
            }
            Layout::Bundle(profiles) => profiles
                .get(&profile_id)
                .or_else(|| profiles.get(profile_url))
                .cloned()
                .ok_or(ProfileFetchError::NotFound(profile_id)),
        }
    }

    fn name(&self) -> &str {
        match self.layout {
            Layout::Directory(_) => "profile-directory",
            Layout::Bundle(_) => "profile-bundle",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const BUNDLE: &str = r#"{
        "jane-doe": {
            "name": " Jane Doe ",
            "experience": ["Developer"],
            "skills": ["Python"]
        }
    }"#;

    #[tokio::test]
    async fn test_bundle_lookup_by_url() {
        let source = JsonProfileSource::from_bundle_json(BUNDLE).unwrap();
        let profile = source
            .fetch("https://www.linkedin.com/in/jane-doe/")
            .await
            .unwrap();
        assert_eq!(profile.name, "Jane Doe");
        assert_eq!(profile.experience, vec!["Developer"]);
    }

    #[tokio::test]
    async fn test_bundle_unknown_profile() {
        let source = JsonProfileSource::from_bundle_json(BUNDLE).unwrap();
        let result = source.fetch("https://www.linkedin.com/in/someone-else").await;
        assert!(matches!(result, Err(ProfileFetchError::NotFound(id)) if id == "someone-else"));
    }

    #[tokio::test]
    async fn test_empty_url_is_invalid() {
        let source = JsonProfileSource::from_bundle_json(BUNDLE).unwrap();
        let result = source.fetch("https://www.linkedin.com/in/").await;
        assert!(matches!(result, Err(ProfileFetchError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_bundle_keyed_by_full_url() {
        let source = JsonProfileSource::from_bundle_json(
            r#"{"https://example.com/jane": {"skills": ["Rust"]}}"#,
        )
        .unwrap();
        let profile = source.fetch("https://example.com/jane").await.unwrap();
        assert_eq!(profile.skills, vec!["Rust"]);
    }

    #[tokio::test]
    async fn test_directory_rejects_path_like_ids() {
        let dir = TempDir::new().unwrap();
        let source = JsonProfileSource::directory(dir.path());

        let result = source.fetch("https://example.com/jane").await;
        assert!(matches!(result, Err(ProfileFetchError::InvalidUrl(_))));

        let result = source.fetch("https://www.linkedin.com/in/..").await;
        assert!(matches!(result, Err(ProfileFetchError::InvalidUrl(_))));
    }

    #[test]
    fn test_malformed_bundle_rejected() {
        let result = JsonProfileSource::from_bundle_json(r#"{"jane": "Developer"}"#);
        assert!(matches!(result, Err(ProfileFetchError::Source(_))));
    }

    #[tokio::test]
    async fn test_directory_json_and_yaml() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("jane-doe.json"),
            r#"{"name": "Jane Doe", "skills": ["Rust"]}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("john-roe.yaml"),
            "name: John Roe\nexperience:\n  - Analyst\n",
        )
        .unwrap();

        let source = JsonProfileSource::open(dir.path()).await.unwrap();
        assert_eq!(source.name(), "profile-directory");

        let jane = source.fetch("https://www.linkedin.com/in/jane-doe").await.unwrap();
        assert_eq!(jane.skills, vec!["Rust"]);

        let john = source.fetch("john-roe").await.unwrap();
        assert_eq!(john.experience, vec!["Analyst"]);

        let missing = source.fetch("https://www.linkedin.com/in/nobody").await;
        assert!(matches!(missing, Err(ProfileFetchError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_open_bundle_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profiles.json");
        fs::write(&path, BUNDLE).unwrap();

        let source = JsonProfileSource::open(&path).await.unwrap();
        assert_eq!(source.name(), "profile-bundle");
        assert!(source.fetch("jane-doe").await.is_ok());
    }

    #[test]
    fn test_only_timeout_is_transient() {
        assert!(ProfileFetchError::Timeout.is_transient());
        assert!(!ProfileFetchError::NotFound("x".to_string()).is_transient());
        assert!(!ProfileFetchError::Auth(AuthError::MissingApiKey).is_transient());
    }
}
