//! Interactive driver: one URL from the user, one scored note back.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use thiserror::Error;

use notegrade_core::{CriterionType, VerdictRecord};

use crate::pipeline::{Pipeline, PipelineError, PipelineRun};

pub const URL_PROMPT: &str = "Enter LinkedIn profile URL: ";

/// Errors that end an interactive session.
#[derive(Error, Debug)]
pub enum InteractiveError {
    #[error("Profile URL cannot be empty")]
    EmptyUrl,

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// One `<criterion>: Pass|Fail (Details: <evidence>)` line per criterion.
pub fn verdict_lines(verdict: &VerdictRecord) -> Vec<String> {
    CriterionType::ALL
        .iter()
        .map(|&criterion| {
            let outcome = if verdict.passed(criterion) { "Pass" } else { "Fail" };
            let evidence = match verdict.evidence_json(criterion) {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            format!("{}: {} (Details: {})", criterion.key(), outcome, evidence)
        })
        .collect()
}

/// [`verdict_lines`] with each criterion's rubric question above its line.
pub fn explained_verdict_lines(verdict: &VerdictRecord) -> Vec<String> {
    CriterionType::ALL
        .iter()
        .zip(verdict_lines(verdict))
        .flat_map(|(criterion, line)| [criterion.question().to_string(), format!("  {}", line)])
        .collect()
}

/// Prompts for a profile URL and reports on the note generated for it.
pub struct InteractiveDriver {
    pipeline: Arc<Pipeline>,
}

impl InteractiveDriver {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self { pipeline }
    }

    /// Run one session. Collaborator failures end the session with an error.
    pub async fn run<R: BufRead, W: Write>(
        &self,
        mut input: R,
        mut out: W,
    ) -> Result<PipelineRun, InteractiveError> {
        write!(out, "{}", URL_PROMPT)?;
        out.flush()?;

        let mut line = String::new();
        input.read_line(&mut line)?;
        let profile_url = line.trim();
        if profile_url.is_empty() {
            tracing::error!("No profile URL provided");
            return Err(InteractiveError::EmptyUrl);
        }

        let run = self.pipeline.run(profile_url).await?;
        tracing::debug!(profile = ?run.profile, "Profile fetched");

        writeln!(out, "\nGenerated Connection Note:")?;
        writeln!(out, "{}", run.note)?;
        writeln!(out, "\nEvaluation Results:")?;
        for line in verdict_lines(&run.verdict) {
            writeln!(out, "{}", line)?;
        }
        out.flush()?;

        Ok(run)
    }
}
