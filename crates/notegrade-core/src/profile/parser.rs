//! Profile parsing from YAML/JSON.

use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when loading profiles.
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Failed to read profile file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid profile: {0}")]
    InvalidInput(String),
}

/// A professional profile as produced by a profile source.
///
/// Every field may be empty. A missing or `null` field reads as empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileRecord {
    /// Display name
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    /// One-line headline
    #[serde(default, deserialize_with = "null_as_default")]
    pub headline: String,

    /// Free-text summary
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,

    /// Job titles, most relevant first
    #[serde(default, deserialize_with = "null_as_default")]
    pub experience: Vec<String>,

    /// School names
    #[serde(default, deserialize_with = "null_as_default")]
    pub education: Vec<String>,

    /// Skill names
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: Vec<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ProfileRecord {
    /// Parse a profile from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ProfileError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_json_value(value)
    }

    /// Parse a profile from an already decoded JSON value.
    ///
    /// Anything other than an object is rejected as invalid input.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self, ProfileError> {
        if !value.is_object() {
            return Err(ProfileError::InvalidInput(format!(
                "expected a JSON object, found {}",
                json_kind(&value)
            )));
        }

        let profile: ProfileRecord = serde_json::from_value(value)?;
        Ok(profile.normalized())
    }

    /// Parse a profile from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ProfileError> {
        let value: serde_yaml::Value = serde_yaml::from_str(yaml)?;
        if !value.is_mapping() {
            return Err(ProfileError::InvalidInput(
                "expected a YAML mapping".to_string(),
            ));
        }

        let profile: ProfileRecord = serde_yaml::from_value(value)?;
        Ok(profile.normalized())
    }

    /// Parse a profile from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse a profile from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse a profile file, choosing the format by extension (`.json` or YAML).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let path = path.as_ref();
        if is_json_path(path) {
            Self::from_json_file(path)
        } else {
            Self::from_yaml_file(path)
        }
    }

    /// Trim surrounding whitespace from every field.
    ///
    /// Empty entries stay in place so first-entry sampling is unaffected.
    pub fn normalized(mut self) -> Self {
        trim_in_place(&mut self.name);
        trim_in_place(&mut self.headline);
        trim_in_place(&mut self.summary);
        for entry in self
            .experience
            .iter_mut()
            .chain(self.education.iter_mut())
            .chain(self.skills.iter_mut())
        {
            trim_in_place(entry);
        }
        self
    }

    /// True when none of the sampled list fields has a usable first entry.
    pub fn is_sparse(&self) -> bool {
        [&self.experience, &self.education, &self.skills]
            .iter()
            .all(|field| field.first().map_or(true, |entry| entry.trim().is_empty()))
    }
}

/// Extract the public profile identifier from a profile URL.
///
/// The identifier is the segment after `/in/` with slashes trimmed. Input
/// without `/in/` is treated as a bare identifier.
pub fn profile_id_from_url(url: &str) -> Option<String> {
    let tail = url.rsplit("/in/").next().unwrap_or(url);
    let id = tail.trim().trim_matches('/');
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

pub(crate) fn is_json_path(path: &Path) -> bool {
    path.extension().map(|e| e == "json").unwrap_or(false)
}

fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
