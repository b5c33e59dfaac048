//! Output path normalization: force a `.md` extension and make sure the
//! parent directory exists.

use crate::config::PipelineConfig;
use crate::error::File2MdError;
use crate::pipeline::lines::{LineRead, LineSource};
use crate::progress::callback_or_noop;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A validated output destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    path: PathBuf,
    extension_forced: bool,
}

impl OutputTarget {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the requested path's extension was replaced with `.md`.
    pub fn extension_forced(&self) -> bool {
        self.extension_forced
    }
}

/// Normalize a user-supplied output path.
///
/// * blank input → [`File2MdError::EmptyOutputPath`]
/// * a path with no file name (`.`, `..`, `/`, `out/..`) →
///   [`File2MdError::InvalidOutputPath`]
/// * any extension other than `md` (case-insensitive) is replaced:
///   `notes` → `notes.md`, `notes.txt` → `notes.md`, `notes.MD` is kept
/// * missing parent directories are created; failure is
///   [`File2MdError::IoWriteError`]
pub async fn normalize_output(raw: &str) -> Result<OutputTarget, File2MdError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(File2MdError::EmptyOutputPath);
    }

    let mut path = PathBuf::from(raw);
    if path.file_name().is_none() {
        return Err(File2MdError::InvalidOutputPath { path });
    }
    let is_md = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"));
    if !is_md {
        if !path.set_extension("md") {
            return Err(File2MdError::InvalidOutputPath { path });
        }
        info!("Appending .md extension. Output: {}", path.display());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| File2MdError::IoWriteError {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    Ok(OutputTarget {
        path,
        extension_forced: !is_md,
    })
}

/// Prompt for the output path until a usable one is given.
///
/// Blank answers, paths without a file name and directory-creation failures
/// are reported and asked again. Ctrl-C is [`File2MdError::Cancelled`]; end of input is
/// [`File2MdError::InputClosed`].
pub async fn prompt_output_target<S: LineSource>(
    lines: &mut S,
    config: &PipelineConfig,
) -> Result<OutputTarget, File2MdError> {
    let progress = callback_or_noop(&config.progress_callback);
    loop {
        progress.on_output_prompt();
        let raw = match lines.next_line(None).await {
            LineRead::Line(line) => line,
            LineRead::TimedOut => continue,
            LineRead::Eof => return Err(File2MdError::InputClosed),
            LineRead::Interrupted => return Err(File2MdError::Cancelled),
            LineRead::Failed(source) => {
                let e = File2MdError::IoReadError {
                    path: PathBuf::from("<stdin>"),
                    source,
                };
                progress.on_output_rejected(&e);
                continue;
            }
        };

        match normalize_output(&raw).await {
            Ok(target) => {
                if target.extension_forced() {
                    progress.on_extension_forced(target.path());
                }
                return Ok(target);
            }
            Err(
                e @ (File2MdError::EmptyOutputPath
                | File2MdError::InvalidOutputPath { .. }
                | File2MdError::IoWriteError { .. }),
            ) => {
                warn!("{}", e);
                progress.on_output_rejected(&e);
            }
            Err(e) => return Err(e),
        }
    }
}
