//! Fetch, generate, evaluate.
//!
//! The pipeline runs one profile URL through the collaborators and the
//! evaluator. It implements:
//! - A timeout around every collaborator call
//! - Exponential-backoff retries while the failure is transient
//! - Deterministic evaluation of whatever note comes back

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use notegrade_core::{Evaluator, ProfileRecord, VerdictRecord};

use crate::config::{ConfigError, RetryConfig, RuntimeConfig};
use crate::credentials::ApiKey;
use crate::generator::{GenerationError, GenerationRequest, NoteGenerator};
use crate::profiles::{ProfileFetchError, ProfileSource};

/// Errors from building or driving the runtime.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Pipeline not configured: {0}")]
    NotConfigured(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid batch input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize results: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The collaborator call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Generate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Fetch => f.write_str("fetch"),
            Stage::Generate => f.write_str("generate"),
        }
    }
}

/// A collaborator failure for one profile.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Profile fetch failed: {0}")]
    Profile(#[from] ProfileFetchError),

    #[error("Note generation failed: {0}")]
    Generation(#[from] GenerationError),
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Profile(_) => Stage::Fetch,
            PipelineError::Generation(_) => Stage::Generate,
        }
    }
}

/// One profile taken through the whole pipeline.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub profile_url: String,
    pub profile: ProfileRecord,
    pub note: String,
    pub verdict: VerdictRecord,
}

/// Runs profile URLs through a profile source, a note generator and the
/// evaluator.
pub struct Pipeline {
    profiles: Arc<dyn ProfileSource>,
    generator: Arc<dyn NoteGenerator>,
    api_key: Option<ApiKey>,
    evaluator: Evaluator,
    timeout: Duration,
    retry: RetryConfig,
}

impl Pipeline {
    /// Fetch the profile, generate a note for it and evaluate the note.
    pub async fn run(&self, profile_url: &str) -> Result<PipelineRun, PipelineError> {
        let profile = self.fetch_profile(profile_url).await?;
        if profile.is_sparse() {
            tracing::debug!(profile_url = %profile_url, "Profile has no sampled details");
        }

        let note = self.generate_note(profile_url, &profile).await?;
        let verdict = self.evaluator.evaluate(&note, &profile);

        Ok(PipelineRun {
            profile_url: profile_url.to_string(),
            profile,
            note,
            verdict,
        })
    }

    /// Fetch a profile with timeout and retry.
    pub async fn fetch_profile(&self, profile_url: &str) -> Result<ProfileRecord, ProfileFetchError> {
        let profiles = &self.profiles;
        self.call_with_retry(
            Stage::Fetch,
            profile_url,
            move || profiles.fetch(profile_url),
            || ProfileFetchError::Timeout,
            ProfileFetchError::is_transient,
        )
        .await
    }

    /// Generate a note with timeout and retry.
    pub async fn generate_note(
        &self,
        profile_url: &str,
        profile: &ProfileRecord,
    ) -> Result<String, GenerationError> {
        let request = GenerationRequest {
            profile_url: profile_url.to_string(),
            profile: profile.clone(),
            api_key: self.api_key.clone(),
        };
        let (generator, request) = (&self.generator, &request);
        self.call_with_retry(
            Stage::Generate,
            profile_url,
            move || generator.generate(request),
            || GenerationError::Timeout,
            GenerationError::is_transient,
        )
        .await
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    async fn call_with_retry<T, E, F, Fut>(
        &self,
        stage: Stage,
        profile_url: &str,
        mut call: F,
        timed_out: fn() -> E,
        is_transient: fn(&E) -> bool,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let mut attempt = 0;
        loop {
            let result = match tokio::time::timeout(self.timeout, call()).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(
                        stage = %stage,
                        profile_url = %profile_url,
                        timeout = ?self.timeout,
                        "Collaborator call timed out"
                    );
                    Err(timed_out())
                }
            };

            match result {
                Ok(value) => return Ok(value),
                Err(e) if is_transient(&e) && attempt < self.retry.max_retries => {
                    let delay = self.retry.backoff(attempt);
                    tracing::warn!(
                        stage = %stage,
                        profile_url = %profile_url,
                        attempt = attempt + 1,
                        delay = ?delay,
                        error = %e,
                        "Transient failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Builder for Pipeline.
pub struct PipelineBuilder {
    profiles: Option<Arc<dyn ProfileSource>>,
    generator: Option<Arc<dyn NoteGenerator>>,
    api_key: Option<ApiKey>,
    config: RuntimeConfig,
    evaluator: Option<Evaluator>,
}

impl PipelineBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            profiles: None,
            generator: None,
            api_key: None,
            config: RuntimeConfig::default(),
            evaluator: None,
        }
    }

    /// Set the profile source.
    pub fn profiles(mut self, profiles: Arc<dyn ProfileSource>) -> Self {
        self.profiles = Some(profiles);
        self
    }

    /// Set the note generator.
    pub fn generator(mut self, generator: Arc<dyn NoteGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Set the API key passed along with generation requests.
    pub fn api_key(mut self, api_key: Option<ApiKey>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Set the configuration.
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the evaluator built from the configuration.
    pub fn evaluator(mut self, evaluator: Evaluator) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    /// Build the pipeline.
    pub fn build(self) -> Result<Pipeline, RuntimeError> {
        self.config.validate()?;

        let profiles = self
            .profiles
            .ok_or_else(|| RuntimeError::NotConfigured("No profile source set".to_string()))?;
        let generator = self
            .generator
            .ok_or_else(|| RuntimeError::NotConfigured("No note generator set".to_string()))?;
        let evaluator = self.evaluator.unwrap_or_else(|| self.config.evaluator());

        Ok(Pipeline {
            profiles,
            generator,
            api_key: self.api_key,
            evaluator,
            timeout: self.config.timeouts.collaborator,
            retry: self.config.retry,
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
