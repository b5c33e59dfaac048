//! Results of a conversion: the converter outcome and the session report.

use crate::error::File2MdError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What happened when the converter was run. Produced once per session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// Exit status 0; holds the staged file's bytes as the converter left them.
    Success(Vec<u8>),
    /// No executable could be found (before or at spawn time).
    ToolNotFound,
    /// The converter ran and failed. `exit_code` is `None` when it was killed
    /// by a signal; the streams are `None` when output was not captured.
    ToolFailed {
        exit_code: Option<i32>,
        stdout: Option<String>,
        stderr: Option<String>,
    },
    /// The converter could not be launched, waited on, or its result re-read.
    IoFailure(String),
}

impl ConversionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ConversionOutcome::Success(_))
    }

    /// Convert into the result bytes, or the fatal error for this outcome.
    ///
    /// `tool` names the converter in [`File2MdError::ToolNotFound`];
    /// `staged` is attached to every error so the user can recover the work.
    pub fn into_result(self, tool: &str, staged: &Path) -> Result<Vec<u8>, File2MdError> {
        let staged = staged.to_path_buf();
        match self {
            ConversionOutcome::Success(bytes) => Ok(bytes),
            ConversionOutcome::ToolNotFound => Err(File2MdError::ToolNotFound {
                tool: tool.to_string(),
                staged,
            }),
            ConversionOutcome::ToolFailed {
                exit_code,
                stdout,
                stderr,
            } => Err(File2MdError::ToolFailed {
                exit_code,
                stdout,
                stderr,
                staged,
            }),
            ConversionOutcome::IoFailure(reason) => Err(File2MdError::IoFailure { reason, staged }),
        }
    }
}

/// How the content was provided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    File,
    Pasted,
}

/// Summary of a completed session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub source: SourceKind,
    /// Input file, when the content came from one.
    pub source_path: Option<PathBuf>,
    /// File the converter worked on.
    pub staged_path: PathBuf,
    pub output_path: PathBuf,
    pub bytes_written: usize,
    /// The requested output extension was replaced with `.md`.
    pub extension_forced: bool,
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_yields_bytes() {
        let out = ConversionOutcome::Success(b"# Title\n".to_vec());
        assert!(out.is_success());
        assert_eq!(
            out.into_result("tool", Path::new("s.md")).unwrap(),
            b"# Title\n"
        );
    }

    #[test]
    fn failure_carries_diagnostics_and_staged_path() {
        let out = ConversionOutcome::ToolFailed {
            exit_code: Some(1),
            stdout: Some("partial".into()),
            stderr: Some("bad things".into()),
        };
        match out.into_result("tool", Path::new("s.md")).unwrap_err() {
            File2MdError::ToolFailed {
                exit_code,
                stderr,
                staged,
                ..
            } => {
                assert_eq!(exit_code, Some(1));
                assert_eq!(stderr.as_deref(), Some("bad things"));
                assert_eq!(staged, PathBuf::from("s.md"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn not_found_names_the_tool() {
        let err = ConversionOutcome::ToolNotFound
            .into_result("run-aider", Path::new("s.md"))
            .unwrap_err();
        assert!(matches!(err, File2MdError::ToolNotFound { ref tool, .. } if tool == "run-aider"));
    }

    #[test]
    fn report_serialises_snake_case_source() {
        let report = SessionReport {
            source: SourceKind::Pasted,
            source_path: None,
            staged_path: PathBuf::from("/w/scratch-pad/s.md"),
            output_path: PathBuf::from("/w/out.md"),
            bytes_written: 8,
            extension_forced: true,
            duration_ms: 12,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["source"], "pasted");
        assert_eq!(json["bytes_written"], 8);
        assert!(json["source_path"].is_null());
    }
}
