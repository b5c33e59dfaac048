//! Configuration for a file2md session.
//!
//! Every name the pipeline depends on (scratch directory, staged file name,
//! converter executable, instruction text) lives in [`PipelineConfig`] instead
//! of process-wide constants, so tests can point a whole session at a temp
//! directory and a stub converter.
//!
//! Built via [`PipelineConfig::builder()`], which validates on `build()`.

use crate::error::File2MdError;
use crate::progress::ProgressCallback;
use crate::prompts::DEFAULT_INSTRUCTION;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Scratch directory created under the working directory.
pub const DEFAULT_SCRATCH_DIR: &str = "scratch-pad";

/// Name of the staged file inside the scratch directory.
pub const DEFAULT_STAGED_FILE_NAME: &str = "file_to_markdown_source.md";

/// Converter wrapper the tool looks for by default.
#[cfg(windows)]
pub const DEFAULT_TOOL_NAME: &str = "run-aider.bat";
/// Converter wrapper the tool looks for by default.
#[cfg(not(windows))]
pub const DEFAULT_TOOL_NAME: &str = "run-aider";

/// Idle gap that ends a paste.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(2);

/// Configuration for one interactive (or scripted) conversion session.
///
/// # Example
/// ```rust
/// use file2md::PipelineConfig;
/// use std::time::Duration;
///
/// let config = PipelineConfig::builder()
///     .scratch_dir("/tmp/file2md")
///     .tool_name("my-converter")
///     .idle_timeout(Duration::from_millis(1500))
///     .build()
///     .unwrap();
/// assert_eq!(config.tool_name, "my-converter");
/// ```
#[derive(Clone)]
pub struct PipelineConfig {
    /// Directory the staged file is written to. Created on demand. Default: `scratch-pad`.
    pub scratch_dir: PathBuf,

    /// File name of the staged copy inside `scratch_dir`.
    ///
    /// Overwritten on every run. Give each instance its own name if several
    /// sessions share a working directory.
    pub staged_file_name: String,

    /// Converter executable name, or a path to it.
    pub tool_name: String,

    /// Directories searched for `tool_name` before `PATH`.
    ///
    /// Empty means: the directory holding the running executable, then the
    /// current working directory.
    pub tool_dirs: Vec<PathBuf>,

    /// How long paste mode waits for another line before finalizing. Default: 2 s.
    pub idle_timeout: Duration,

    /// Instruction passed to the converter as its second argument.
    /// If None, uses [`DEFAULT_INSTRUCTION`].
    pub instruction: Option<String>,

    /// Capture the converter's stdout/stderr (true) or let it write to the
    /// terminal (false). Default: true.
    pub capture_output: bool,

    /// Whether file inputs are copied to the scratch area first.
    pub staging: StagingMode,

    /// Output path to use instead of prompting for one.
    pub output_path: Option<PathBuf>,

    /// Receives prompt and status events. If None, events are dropped.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            scratch_dir: PathBuf::from(DEFAULT_SCRATCH_DIR),
            staged_file_name: DEFAULT_STAGED_FILE_NAME.to_string(),
            tool_name: DEFAULT_TOOL_NAME.to_string(),
            tool_dirs: Vec::new(),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            instruction: None,
            capture_output: true,
            staging: StagingMode::default(),
            output_path: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("scratch_dir", &self.scratch_dir)
            .field("staged_file_name", &self.staged_file_name)
            .field("tool_name", &self.tool_name)
            .field("tool_dirs", &self.tool_dirs)
            .field("idle_timeout", &self.idle_timeout)
            .field("instruction", &self.instruction.as_ref().map(|_| "<custom>"))
            .field("capture_output", &self.capture_output)
            .field("staging", &self.staging)
            .field("output_path", &self.output_path)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn SessionProgressCallback>"),
            )
            .finish()
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }

    /// Full path of the staged file.
    pub fn staged_path(&self) -> PathBuf {
        self.scratch_dir.join(&self.staged_file_name)
    }

    /// Instruction text handed to the converter.
    pub fn instruction(&self) -> &str {
        self.instruction.as_deref().unwrap_or(DEFAULT_INSTRUCTION)
    }

    /// Directories searched for the converter before `PATH`.
    pub fn tool_search_dirs(&self) -> Vec<PathBuf> {
        if !self.tool_dirs.is_empty() {
            return self.tool_dirs.clone();
        }
        let mut dirs = Vec::with_capacity(2);
        if let Some(exe_dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            dirs.push(exe_dir);
        }
        if let Ok(cwd) = std::env::current_dir() {
            if !dirs.contains(&cwd) {
                dirs.push(cwd);
            }
        }
        dirs
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.scratch_dir = dir.into();
        self
    }

    pub fn staged_file_name(mut self, name: impl Into<String>) -> Self {
        self.config.staged_file_name = name.into();
        self
    }

    pub fn tool_name(mut self, name: impl Into<String>) -> Self {
        self.config.tool_name = name.into();
        self
    }

    /// Add a directory to search for the converter. May be called repeatedly.
    pub fn tool_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.tool_dirs.push(dir.into());
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = timeout;
        self
    }

    pub fn instruction(mut self, text: impl Into<String>) -> Self {
        self.config.instruction = Some(text.into());
        self
    }

    pub fn capture_output(mut self, v: bool) -> Self {
        self.config.capture_output = v;
        self
    }

    pub fn staging(mut self, mode: StagingMode) -> Self {
        self.config.staging = mode;
        self
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_path = Some(path.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, File2MdError> {
        let c = &self.config;
        if c.tool_name.trim().is_empty() {
            return Err(File2MdError::InvalidConfig(
                "Converter name must not be empty".into(),
            ));
        }
        let name = Path::new(&c.staged_file_name);
        if c.staged_file_name.trim().is_empty() || name.components().count() != 1 {
            return Err(File2MdError::InvalidConfig(format!(
                "Staged file name must be a plain file name, got '{}'",
                c.staged_file_name
            )));
        }
        if c.idle_timeout.is_zero() {
            return Err(File2MdError::InvalidConfig(
                "Idle timeout must be greater than zero".into(),
            ));
        }
        Ok(self.config)
    }
}

/// Whether file inputs go through the scratch area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StagingMode {
    /// Always copy content to the staged file; the user's file is never touched. (default)
    #[default]
    Always,
    /// Hand an existing input file to the converter directly. The converter
    /// rewrites that file in place; pasted text is still staged.
    PassthroughFiles,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let c = PipelineConfig::default();
        assert_eq!(c.scratch_dir, PathBuf::from("scratch-pad"));
        assert_eq!(c.staged_file_name, "file_to_markdown_source.md");
        assert_eq!(c.idle_timeout, Duration::from_secs(2));
        assert!(c.capture_output);
        assert_eq!(c.staging, StagingMode::Always);
        assert_eq!(c.instruction(), DEFAULT_INSTRUCTION);
    }

    #[test]
    fn staged_path_joins_dir_and_name() {
        let c = PipelineConfig::builder()
            .scratch_dir("work")
            .staged_file_name("in.md")
            .build()
            .unwrap();
        assert_eq!(c.staged_path(), PathBuf::from("work").join("in.md"));
    }

    #[test]
    fn rejects_empty_tool_name() {
        let err = PipelineConfig::builder().tool_name("  ").build().unwrap_err();
        assert!(matches!(err, File2MdError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_staged_name_with_directories() {
        let err = PipelineConfig::builder()
            .staged_file_name("nested/source.md")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("plain file name"), "got: {err}");
    }

    #[test]
    fn rejects_zero_idle_timeout() {
        assert!(PipelineConfig::builder()
            .idle_timeout(Duration::ZERO)
            .build()
            .is_err());
    }

    #[test]
    fn explicit_tool_dirs_replace_defaults() {
        let c = PipelineConfig::builder()
            .tool_dir("/opt/tools")
            .tool_dir("/usr/local/tools")
            .build()
            .unwrap();
        assert_eq!(
            c.tool_search_dirs(),
            vec![PathBuf::from("/opt/tools"), PathBuf::from("/usr/local/tools")]
        );
    }

    #[test]
    fn default_tool_dirs_include_cwd() {
        let c = PipelineConfig::default();
        let cwd = std::env::current_dir().unwrap();
        assert!(c.tool_search_dirs().contains(&cwd));
    }

    #[test]
    fn custom_instruction_overrides_default() {
        let c = PipelineConfig::builder()
            .instruction("Convert to markdown.")
            .build()
            .unwrap();
        assert_eq!(c.instruction(), "Convert to markdown.");
        assert!(format!("{c:?}").contains("<custom>"));
    }
}
