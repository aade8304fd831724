//! Batch driver: many profile URLs in, one results file out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;

use notegrade_core::{CriterionType, VerdictRecord};

use crate::pipeline::{Pipeline, RuntimeError};
use crate::results::{BatchRecord, ResultsWriter};

/// Profile URLs to process.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchInput {
    #[serde(default)]
    pub profile_urls: Vec<String>,
}

// Input files are either `{"profile_urls": [...]}` or a bare list of URLs
#[derive(Deserialize)]
#[serde(untagged)]
enum RawBatchInput {
    Object(BatchInput),
    List(Vec<String>),
}

impl From<RawBatchInput> for BatchInput {
    fn from(raw: RawBatchInput) -> Self {
        match raw {
            RawBatchInput::Object(input) => input,
            RawBatchInput::List(profile_urls) => BatchInput { profile_urls },
        }
    }
}

impl BatchInput {
    pub fn new(profile_urls: Vec<String>) -> Self {
        Self { profile_urls }
    }

    pub fn from_json(json: &str) -> Result<Self, RuntimeError> {
        let raw: RawBatchInput = serde_json::from_str(json)
            .map_err(|e| RuntimeError::InvalidInput(format!("malformed batch input: {}", e)))?;
        Ok(raw.into())
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, RuntimeError> {
        let raw: RawBatchInput = serde_yaml::from_str(yaml)
            .map_err(|e| RuntimeError::InvalidInput(format!("malformed batch input: {}", e)))?;
        Ok(raw.into())
    }

    /// Load from a file, choosing the format by extension (`.json` or YAML).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RuntimeError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            Self::from_json(&contents)
        } else {
            Self::from_yaml(&contents)
        }
    }

    pub fn len(&self) -> usize {
        self.profile_urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profile_urls.is_empty()
    }
}

/// Per-criterion pass counts over the processed profiles.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PassTally {
    pub processed: usize,
    pub length_ok: usize,
    pub specific_details_ok: usize,
    pub tone: usize,
    pub professional_text: usize,
}

impl PassTally {
    /// Count one verdict.
    pub fn record(&mut self, verdict: &VerdictRecord) {
        self.processed += 1;
        for (criterion, passed) in verdict.outcomes() {
            if passed {
                *self.slot(criterion) += 1;
            }
        }
    }

    pub fn passed_for(&self, criterion: CriterionType) -> usize {
        match criterion {
            CriterionType::Length => self.length_ok,
            CriterionType::SpecificDetails => self.specific_details_ok,
            CriterionType::Tone => self.tone,
            CriterionType::ProfessionalText => self.professional_text,
        }
    }

    pub fn failed_for(&self, criterion: CriterionType) -> usize {
        self.processed - self.passed_for(criterion)
    }

    fn slot(&mut self, criterion: CriterionType) -> &mut usize {
        match criterion {
            CriterionType::Length => &mut self.length_ok,
            CriterionType::SpecificDetails => &mut self.specific_details_ok,
            CriterionType::Tone => &mut self.tone,
            CriterionType::ProfessionalText => &mut self.professional_text,
        }
    }
}

/// A profile the batch could not process.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkippedProfile {
    pub profile_url: String,
    /// Failing stage; `None` when the task itself died
    pub stage: Option<String>,
    pub reason: String,
}

/// Everything a batch run produced.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// Processed profiles, in input order
    pub records: Vec<BatchRecord>,
    pub skipped: Vec<SkippedProfile>,
    pub tally: PassTally,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchOutcome {
    /// True when every processed note passed every criterion.
    pub fn all_passed(&self) -> bool {
        self.records.iter().all(|r| r.evaluation.success.all_passed())
    }

    /// Write the processed records to `path`.
    pub fn write_results(&self, path: impl AsRef<Path>) -> Result<(), RuntimeError> {
        ResultsWriter::write(path, &self.records)
    }
}

/// Runs a batch of profile URLs through the pipeline.
pub struct BatchDriver {
    pipeline: Arc<Pipeline>,
    concurrency: usize,
}

impl BatchDriver {
    pub fn new(pipeline: Arc<Pipeline>, concurrency: usize) -> Self {
        Self {
            pipeline,
            concurrency: concurrency.max(1),
        }
    }

    /// Process every URL. Failures are logged and skipped; the output keeps
    /// input order whatever order the work finishes in.
    pub async fn run(&self, input: &BatchInput) -> BatchOutcome {
        let started_at = Utc::now();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));

        let handles: Vec<_> = input
            .profile_urls
            .iter()
            .map(|url| {
                let semaphore = Arc::clone(&semaphore);
                let pipeline = Arc::clone(&self.pipeline);
                let url = url.clone();
                tokio::spawn(async move {
                    let _permit = semaphore.acquire_owned().await.ok();
                    pipeline.run(&url).await
                })
            })
            .collect();

        let mut records = Vec::with_capacity(input.len());
        let mut skipped = Vec::new();
        let mut tally = PassTally::default();

        for (url, handle) in input.profile_urls.iter().zip(handles) {
            match handle.await {
                Ok(Ok(run)) => {
                    tally.record(&run.verdict);
                    records.push(BatchRecord::from(run));
                }
                Ok(Err(e)) => {
                    tracing::warn!(
                        profile_url = %url,
                        stage = %e.stage(),
                        error = %e,
                        "Error processing profile, skipping"
                    );
                    skipped.push(SkippedProfile {
                        profile_url: url.clone(),
                        stage: Some(e.stage().to_string()),
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    tracing::warn!(profile_url = %url, error = %e, "Profile task failed, skipping");
                    skipped.push(SkippedProfile {
                        profile_url: url.clone(),
                        stage: None,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let outcome = BatchOutcome {
            records,
            skipped,
            tally,
            started_at,
            finished_at: Utc::now(),
        };
        log_summary(&outcome);
        outcome
    }
}

fn log_summary(outcome: &BatchOutcome) {
    let tally = &outcome.tally;
    let elapsed_ms = (outcome.finished_at - outcome.started_at).num_milliseconds();

    tracing::info!(
        processed = tally.processed,
        skipped = outcome.skipped.len(),
        elapsed_ms,
        "Processed {} profiles",
        tally.processed
    );
    tracing::info!(
        length_ok = tally.passed_for(CriterionType::Length),
        specific_details_ok = tally.passed_for(CriterionType::SpecificDetails),
        tone = tally.passed_for(CriterionType::Tone),
        professional_text = tally.passed_for(CriterionType::ProfessionalText),
        "Successful evaluations"
    );
    tracing::info!(
        length_ok = tally.failed_for(CriterionType::Length),
        specific_details_ok = tally.failed_for(CriterionType::SpecificDetails),
        tone = tally.failed_for(CriterionType::Tone),
        professional_text = tally.failed_for(CriterionType::ProfessionalText),
        "Failed evaluations"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{GenerationError, GenerationRequest, NoteGenerator};
    use crate::pipeline::PipelineBuilder;
    use crate::profiles::{ProfileFetchError, ProfileSource};
    use crate::RuntimeConfig;
    use async_trait::async_trait;
    use notegrade_core::ProfileRecord;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const GOOD_NOTE: &str =
        "Hello, your Developer work with Python caught my eye and I would love to connect!";

    struct TestProfiles;

    #[async_trait]
    impl ProfileSource for TestProfiles {
        async fn fetch(&self, profile_url: &str) -> Result<ProfileRecord, ProfileFetchError> {
            if profile_url.contains("private") {
                return Err(ProfileFetchError::NotFound(profile_url.to_string()));
            }
            Ok(ProfileRecord {
                experience: vec!["Developer".to_string()],
                skills: vec!["Python".to_string()],
                ..Default::default()
            })
        }

        fn name(&self) -> &str {
            "test"
        }
    }

    // Later URLs finish first; tracks how many calls overlap
    #[derive(Default)]
    struct StaggeredGenerator {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl NoteGenerator for StaggeredGenerator {
        async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            let index: u64 = request
                .profile_url
                .rsplit('-')
                .next()
                .and_then(|n| n.parse().ok())
                .unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(40u64.saturating_sub(index * 10))).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            if request.profile_url.contains("emoji") {
                Ok("Your Python work is great \u{1F600}".to_string())
            } else {
                Ok(GOOD_NOTE.to_string())
            }
        }

        fn name(&self) -> &str {
            "staggered"
        }
    }

    fn driver(generator: Arc<StaggeredGenerator>, concurrency: usize) -> BatchDriver {
        let mut config = RuntimeConfig::default();
        config.retry.max_retries = 0;
        let pipeline = PipelineBuilder::new()
            .profiles(Arc::new(TestProfiles))
            .generator(generator)
            .config(config)
            .build()
            .unwrap();
        BatchDriver::new(Arc::new(pipeline), concurrency)
    }

    fn urls(names: &[&str]) -> BatchInput {
        BatchInput::new(
            names
                .iter()
                .map(|n| format!("https://www.linkedin.com/in/{}", n))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_output_keeps_input_order() {
        let input = urls(&["user-0", "user-1", "user-2", "user-3"]);
        let outcome = driver(Arc::new(StaggeredGenerator::default()), 4).run(&input).await;

        let order: Vec<&str> = outcome.records.iter().map(|r| r.profile_url.as_str()).collect();
        let expected: Vec<&str> = input.profile_urls.iter().map(|u| u.as_str()).collect();
        assert_eq!(order, expected);
        assert!(outcome.all_passed());
        assert!(outcome.finished_at >= outcome.started_at);
    }

    #[tokio::test]
    async fn test_failures_are_skipped() {
        let input = urls(&["user-0", "private-1", "user-2"]);
        let outcome = driver(Arc::new(StaggeredGenerator::default()), 2).run(&input).await;

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].profile_url, "https://www.linkedin.com/in/private-1");
        assert_eq!(outcome.skipped[0].stage.as_deref(), Some("fetch"));
        assert_eq!(outcome.tally.processed, 2);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let generator = Arc::new(StaggeredGenerator::default());
        let input = urls(&["a-0", "b-0", "c-0", "d-0", "e-0", "f-0"]);
        let outcome = driver(generator.clone(), 2).run(&input).await;

        assert_eq!(outcome.records.len(), 6);
        assert!(generator.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_tally_counts_failures() {
        let input = urls(&["user-0", "emoji-1"]);
        let outcome = driver(Arc::new(StaggeredGenerator::default()), 1).run(&input).await;

        let tally = outcome.tally;
        assert_eq!(tally.processed, 2);
        assert_eq!(tally.passed_for(CriterionType::Length), 2);
        assert_eq!(tally.failed_for(CriterionType::ProfessionalText), 1);
        assert!(!outcome.all_passed());
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let outcome = driver(Arc::new(StaggeredGenerator::default()), 4)
            .run(&BatchInput::default())
            .await;
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.tally, PassTally::default());
    }

    #[test]
    fn test_input_accepts_both_shapes() {
        let object = BatchInput::from_json(r#"{"profile_urls": ["a", "b"]}"#).unwrap();
        let list = BatchInput::from_json(r#"["a", "b"]"#).unwrap();
        assert_eq!(object, list);

        let yaml = BatchInput::from_yaml("profile_urls:\n  - a\n  - b\n").unwrap();
        assert_eq!(yaml, object);

        assert!(matches!(
            BatchInput::from_json(r#"{"profile_urls": "a"}"#),
            Err(RuntimeError::InvalidInput(_))
        ));
    }
}
