//! Error types for the file2md library.
//!
//! Errors fall into two groups, and the group decides what the pipeline does
//! with them:
//!
//! * **Interactive**: raised while the user is answering a prompt
//!   ([`File2MdError::InputAmbiguous`], [`File2MdError::EmptyInput`],
//!   [`File2MdError::EmptyOutputPath`], [`File2MdError::InvalidOutputPath`],
//!   and read/write failures while probing input or creating output
//!   directories). The prompt loops report them and ask again.
//!
//! * **Fatal**: everything from staging onwards. These end the run. Once
//!   content has been staged, each fatal variant carries the staged path so
//!   the user can pick their work back up by hand.
//!
//! [`File2MdError::Cancelled`] and [`File2MdError::InputClosed`] unwind from
//! any interactive phase.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// All errors returned by the file2md library.
#[derive(Debug, Error)]
pub enum File2MdError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The first line named an existing directory.
    #[error("'{path}' is a directory.\nProvide a file path or paste content.")]
    InputAmbiguous { path: PathBuf },

    /// Paste mode finished without any non-blank content.
    #[error("No content provided.")]
    EmptyInput,

    /// The output path prompt was answered with a blank line.
    #[error("Output file path cannot be empty.")]
    EmptyOutputPath,

    /// The output path names no file (`.`, `..`, a root or `dir/..`).
    #[error("'{path}' does not name a file.\nEnter a file path such as output/my_doc.md.")]
    InvalidOutputPath { path: PathBuf },

    /// Input ended before a prompt could be answered.
    #[error("Input stream closed before a value was provided")]
    InputClosed,

    /// The user interrupted an interactive prompt.
    #[error("Operation cancelled by user")]
    Cancelled,

    // ── I/O errors ────────────────────────────────────────────────────────
    /// A source file (or the terminal) could not be read or decoded as UTF-8.
    #[error("Failed to read '{path}': {source}")]
    IoReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The scratch area or an output directory could not be created or written.
    #[error("Failed to write '{path}': {source}")]
    IoWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Converter errors ──────────────────────────────────────────────────
    /// The external converter could not be found.
    #[error(
        "Converter '{tool}' not found.\n\
Place it next to the file2md executable, in the current directory, or on PATH.\n\
Staged content is in '{staged}'."
    )]
    ToolNotFound { tool: String, staged: PathBuf },

    /// The converter ran and exited unsuccessfully.
    #[error(
        "Converter failed ({}).\nStaged file '{staged}' might contain partial results.",
        describe_exit(.exit_code)
    )]
    ToolFailed {
        exit_code: Option<i32>,
        stdout: Option<String>,
        stderr: Option<String>,
        staged: PathBuf,
    },

    /// The converter could not be launched or waited on.
    #[error("Could not run converter: {reason}\nStaged content is in '{staged}'.")]
    IoFailure { reason: String, staged: PathBuf },

    /// Conversion succeeded but the result could not be written to the output.
    #[error(
        "Failed to write output file '{path}': {source}\n\
The converted content is still in '{staged}'."
    )]
    PublishFailed {
        path: PathBuf,
        staged: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl File2MdError {
    /// The staged file a fatal error left behind, if staging had happened.
    pub fn staged_path(&self) -> Option<&Path> {
        match self {
            File2MdError::ToolNotFound { staged, .. }
            | File2MdError::ToolFailed { staged, .. }
            | File2MdError::IoFailure { staged, .. }
            | File2MdError::PublishFailed { staged, .. } => Some(staged),
            _ => None,
        }
    }

    /// Whether the user interrupted the run.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, File2MdError::Cancelled)
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {c}"),
        None => "terminated by signal".to_string(),
    }
}
