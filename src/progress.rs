//! Progress-callback trait for session events.
//!
//! The library never prints. Every prompt and state change of a session is
//! reported through an [`Arc<dyn SessionProgressCallback>`] injected via
//! [`crate::config::PipelineConfigBuilder::progress_callback`]; the CLI turns
//! those events into prompts, status lines and a spinner.
//!
//! # Example
//!
//! ```rust
//! use file2md::{PipelineConfig, SessionProgressCallback};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! struct Announce;
//!
//! impl SessionProgressCallback for Announce {
//!     fn on_staged(&self, path: &Path, bytes: usize) {
//!         eprintln!("staged {bytes} bytes at {}", path.display());
//!     }
//! }
//!
//! let config = PipelineConfig::builder()
//!     .progress_callback(Arc::new(Announce) as Arc<dyn SessionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::error::File2MdError;
use crate::output::ConversionOutcome;
use crate::pipeline::input::PasteEnd;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Called by the pipeline at each prompt and state change.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Events arrive in pipeline order from a single task.
pub trait SessionProgressCallback: Send + Sync {
    /// The source prompt is about to block for the first line.
    ///
    /// # Arguments
    /// * `idle_timeout`: gap that will end a paste
    fn on_source_prompt(&self, idle_timeout: Duration) {
        let _ = idle_timeout;
    }

    /// The first line resolved to a readable file.
    fn on_file_selected(&self, path: &Path, bytes: usize) {
        let _ = (path, bytes);
    }

    /// Paste mode started.
    ///
    /// # Arguments
    /// * `has_first_line`: the first line was kept as pasted content
    fn on_paste_started(&self, has_first_line: bool) {
        let _ = has_first_line;
    }

    /// Paste mode is waiting for another line.
    ///
    /// # Arguments
    /// * `lines_so_far`: lines accumulated before this read
    fn on_paste_prompt(&self, lines_so_far: usize) {
        let _ = lines_so_far;
    }

    /// Paste mode finalized.
    fn on_paste_finished(&self, end: PasteEnd, line_count: usize) {
        let _ = (end, line_count);
    }

    /// The source prompt produced nothing usable and will be asked again.
    fn on_input_rejected(&self, error: &File2MdError) {
        let _ = error;
    }

    /// Content was written to the staged file.
    fn on_staged(&self, path: &Path, bytes: usize) {
        let _ = (path, bytes);
    }

    /// The output path prompt is about to block.
    fn on_output_prompt(&self) {}

    /// The output path was rejected and will be asked again.
    fn on_output_rejected(&self, error: &File2MdError) {
        let _ = error;
    }

    /// The output path's extension was replaced with `.md`.
    fn on_extension_forced(&self, path: &Path) {
        let _ = path;
    }

    /// The converter is about to be spawned.
    fn on_tool_start(&self, tool: &Path, staged: &Path) {
        let _ = (tool, staged);
    }

    /// The converter finished (or could not be run).
    fn on_tool_finished(&self, outcome: &ConversionOutcome) {
        let _ = outcome;
    }

    /// Converted content was written to the output file.
    fn on_published(&self, path: &Path, bytes: usize) {
        let _ = (path, bytes);
    }
}

/// A no-op implementation for callers that don't need events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl SessionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::PipelineConfig`].
pub type ProgressCallback = Arc<dyn SessionProgressCallback>;

/// The configured callback, or a no-op one.
pub(crate) fn callback_or_noop(cb: &Option<ProgressCallback>) -> ProgressCallback {
    match cb {
        Some(cb) => Arc::clone(cb),
        None => Arc::new(NoopProgressCallback),
    }
}
