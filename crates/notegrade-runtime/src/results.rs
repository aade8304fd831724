//! Results persistence for batch runs.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;

use notegrade_core::{ProfileRecord, VerdictRecord};

use crate::pipeline::{PipelineRun, RuntimeError};

/// Wrapper keeping the `{"success": ...}` nesting of results files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvaluationEnvelope {
    pub success: VerdictRecord,
}

/// One processed profile as written to the results file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchRecord {
    pub profile_url: String,
    pub profile_info: ProfileRecord,
    pub generated_note: String,
    pub evaluation: EvaluationEnvelope,
}

impl From<PipelineRun> for BatchRecord {
    fn from(run: PipelineRun) -> Self {
        Self {
            profile_url: run.profile_url,
            profile_info: run.profile,
            generated_note: run.note,
            evaluation: EvaluationEnvelope {
                success: run.verdict,
            },
        }
    }
}

/// Writes batch results as pretty JSON with 4-space indentation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultsWriter;

impl ResultsWriter {
    /// Render records the way they are written to disk.
    pub fn to_json(records: &[BatchRecord]) -> Result<String, RuntimeError> {
        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        records.serialize(&mut serializer)?;
        String::from_utf8(buffer)
            .map_err(|e| RuntimeError::InvalidInput(format!("results are not UTF-8: {}", e)))
    }

    /// Write records to `path`, replacing any previous results.
    ///
    /// The file is written next to its destination and renamed into place,
    /// so readers never see a half-written results file.
    pub fn write(path: impl AsRef<Path>, records: &[BatchRecord]) -> Result<(), RuntimeError> {
        let path = path.as_ref();
        let json = Self::to_json(records)?;

        let file_name = path
            .file_name()
            .ok_or_else(|| {
                RuntimeError::InvalidInput(format!("results path has no file name: {}", path.display()))
            })?
            .to_string_lossy();
        let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));

        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        drop(file);

        if let Err(e) = fs::rename(&tmp_path, path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        tracing::debug!(path = %path.display(), records = records.len(), "Results written");
        Ok(())
    }

    /// Read a results file back.
    pub fn read(path: impl AsRef<Path>) -> Result<Vec<BatchRecord>, RuntimeError> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}
