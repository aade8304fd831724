//! # notegrade-runtime
//!
//! Drivers around the notegrade evaluator.
//!
//! The evaluator in `notegrade-core` is pure. This crate supplies what
//! surrounds it in practice:
//! - Profile sources and note generators behind async traits
//! - A pipeline with timeouts and retries for those collaborators
//! - A concurrent batch driver and a results file writer
//! - An interactive single-profile driver
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use notegrade_runtime::{
//!     BatchDriver, BatchInput, CannedNoteGenerator, JsonProfileSource, PipelineBuilder,
//!     RuntimeConfig,
//! };
//!
//! let config = RuntimeConfig::from_file("notegrade.yaml")?;
//! let pipeline = PipelineBuilder::new()
//!     .profiles(Arc::new(JsonProfileSource::open("profiles/").await?))
//!     .generator(Arc::new(CannedNoteGenerator::from_file("notes.json").await?))
//!     .config(config.clone())
//!     .build()?;
//!
//! let driver = BatchDriver::new(Arc::new(pipeline), config.concurrency);
//! let outcome = driver.run(&BatchInput::from_file("linkedin_profiles.json")?).await;
//! outcome.write_results(&config.results_path)?;
//! ```

pub mod batch;
pub mod config;
pub mod credentials;
pub mod generator;
pub mod interactive;
pub mod pipeline;
pub mod profiles;
pub mod results;

pub use batch::{BatchDriver, BatchInput, BatchOutcome, PassTally, SkippedProfile};
pub use config::{ConfigError, RetryConfig, RuntimeConfig, SourceConfig, TimeoutConfig};
pub use credentials::{ApiKey, AuthError};
pub use generator::{CannedNoteGenerator, GenerationError, GenerationRequest, NoteGenerator};
pub use interactive::{
    explained_verdict_lines, verdict_lines, InteractiveDriver, InteractiveError,
};
pub use pipeline::{Pipeline, PipelineBuilder, PipelineError, PipelineRun, RuntimeError, Stage};
pub use profiles::{JsonProfileSource, ProfileFetchError, ProfileSource};
pub use results::{BatchRecord, EvaluationEnvelope, ResultsWriter};
