//! Staging: write resolved content to the fixed scratch file.
//!
//! The converter edits a file in place, so it needs a stable path to work
//! on. The scratch file is overwritten on every run and never cleaned up;
//! it is a work area, not a store of record.

use crate::error::File2MdError;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A file handed to the converter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// Bytes the file held when it was handed over.
    pub content: Vec<u8>,
}

impl StagedFile {
    /// Use an existing file as-is (path passthrough), without copying it.
    pub fn existing(path: &Path, content: impl Into<Vec<u8>>) -> Result<Self, File2MdError> {
        Ok(Self {
            path: absolute(path)?,
            content: content.into(),
        })
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Write `content` to `scratch_dir/file_name`, replacing whatever was there.
///
/// Missing directories are created. Any failure is
/// [`File2MdError::IoWriteError`].
pub async fn stage(
    content: &[u8],
    scratch_dir: &Path,
    file_name: &str,
) -> Result<StagedFile, File2MdError> {
    tokio::fs::create_dir_all(scratch_dir)
        .await
        .map_err(|source| File2MdError::IoWriteError {
            path: scratch_dir.to_path_buf(),
            source,
        })?;

    let path = absolute(&scratch_dir.join(file_name))?;
    tokio::fs::write(&path, content)
        .await
        .map_err(|source| File2MdError::IoWriteError {
            path: path.clone(),
            source,
        })?;

    info!("Source content written to: {}", path.display());
    let staged = StagedFile {
        path,
        content: content.to_vec(),
    };
    if staged.is_empty() {
        warn!("Staged file '{}' is empty", staged.path.display());
    }
    Ok(staged)
}

fn absolute(path: &Path) -> Result<PathBuf, File2MdError> {
    std::path::absolute(path).map_err(|source| File2MdError::IoWriteError {
        path: path.to_path_buf(),
        source,
    })
}
