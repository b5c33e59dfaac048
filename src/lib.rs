//! # file2md
//!
//! Turn a file, or text pasted straight into the terminal, into Markdown by
//! handing it to an external converter.
//!
//! ## Why a paste-aware front end?
//!
//! The converter (typically an AI coding assistant behind a small wrapper
//! script) edits a file in place. Users rarely have their content in a file
//! already, so the front end accepts either a path or the pasted text itself,
//! and works out which one it got. Pasted text ends when the terminal goes
//! quiet for a moment; there is no terminator to remember.
//!
//! ## Pipeline Overview
//!
//! ```text
//! terminal
//!  │
//!  ├─ 1. Input    path or paste? (idle timeout ends a paste)
//!  ├─ 2. Stage    write content to scratch-pad/file_to_markdown_source.md
//!  ├─ 3. Target   ask for the output path, force .md, create parents
//!  ├─ 4. Convert  run `<tool> <staged file> <instruction>` (no shell)
//!  └─ 5. Publish  copy the rewritten staged file to the output
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use file2md::{run_session, ChannelLines, PipelineConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipelineConfig::default();
//!     let mut lines = ChannelLines::stdin()?;
//!     let report = run_session(&mut lines, &config).await?;
//!     eprintln!("wrote {} bytes to {}", report.bytes_written, report.output_path.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `file2md` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{PipelineConfig, PipelineConfigBuilder, StagingMode};
pub use convert::{convert_content, publish, run_session};
pub use error::File2MdError;
pub use output::{ConversionOutcome, SessionReport, SourceKind};
pub use pipeline::input::{acquire_content, resolve_source, ContentSource, PasteEnd};
pub use pipeline::lines::{ChannelLines, LineRead, LineSource};
pub use pipeline::stage::{stage, StagedFile};
pub use pipeline::target::{normalize_output, prompt_output_target, OutputTarget};
pub use pipeline::tool::{convert, locate_tool};
pub use progress::{NoopProgressCallback, ProgressCallback, SessionProgressCallback};
