//! Session entry points.
//!
//! [`run_session`] drives the whole interactive pipeline from a
//! [`LineSource`]; [`convert_content`] skips the prompts for callers that
//! already have the content and the output path.

use crate::config::{PipelineConfig, StagingMode};
use crate::error::File2MdError;
use crate::output::{ConversionOutcome, SessionReport, SourceKind};
use crate::pipeline::input::{acquire_content, ContentSource};
use crate::pipeline::lines::LineSource;
use crate::pipeline::stage::{stage, StagedFile};
use crate::pipeline::target::{normalize_output, prompt_output_target, OutputTarget};
use crate::pipeline::tool;
use crate::progress::callback_or_noop;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Run one complete session: acquire content, stage it, get the output path,
/// run the converter and publish its result.
///
/// # Errors
/// Interactive problems (a directory as input, an empty paste, a blank
/// output path) are re-prompted and never returned. Returns:
/// - [`File2MdError::Cancelled`] / [`File2MdError::InputClosed`] from a prompt
/// - [`File2MdError::IoWriteError`] if staging fails
/// - the converter errors of [`ConversionOutcome::into_result`]
/// - [`File2MdError::PublishFailed`] if the output cannot be written
pub async fn run_session<S: LineSource>(
    lines: &mut S,
    config: &PipelineConfig,
) -> Result<SessionReport, File2MdError> {
    let total_start = Instant::now();
    info!("Starting file2md session");

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let source = acquire_content(lines, config).await?;

    // ── Step 2: Stage ────────────────────────────────────────────────────
    let staged = stage_source(&source, config).await?;

    // ── Step 3: Output path ──────────────────────────────────────────────
    let target = match &config.output_path {
        Some(path) => configured_target(path, config).await?,
        None => prompt_output_target(lines, config).await?,
    };

    // ── Step 4: Convert and publish ──────────────────────────────────────
    let bytes_written = convert_and_publish(&staged, &target, config).await?;

    Ok(report(&source, &staged, &target, bytes_written, total_start))
}

/// Convert `content` to `output_path` without prompting.
///
/// `content` is staged exactly like pasted text; the output path gets the
/// same `.md` and parent-directory treatment as an interactive answer.
pub async fn convert_content(
    content: &str,
    output_path: impl AsRef<Path>,
    config: &PipelineConfig,
) -> Result<SessionReport, File2MdError> {
    let total_start = Instant::now();
    let source = ContentSource::LiteralText(content.lines().map(str::to_string).collect());
    let staged = stage_bytes(content.as_bytes(), config).await?;
    let target = configured_target(output_path.as_ref(), config).await?;
    let bytes_written = convert_and_publish(&staged, &target, config).await?;
    Ok(report(&source, &staged, &target, bytes_written, total_start))
}

/// Write a successful outcome's bytes to `target`.
///
/// Uses atomic write (temp file + rename) so a failed write never leaves a
/// truncated output behind. Any non-success outcome becomes its error and
/// the target is not touched.
pub async fn publish(
    outcome: ConversionOutcome,
    target: &OutputTarget,
    staged: &StagedFile,
    config: &PipelineConfig,
) -> Result<usize, File2MdError> {
    let bytes = outcome.into_result(&config.tool_name, &staged.path)?;
    let path = target.path();

    write_atomic(path, &bytes)
        .await
        .map_err(|source| File2MdError::PublishFailed {
            path: path.to_path_buf(),
            staged: staged.path.clone(),
            source,
        })?;

    info!("Markdown content written to: {}", path.display());
    callback_or_noop(&config.progress_callback).on_published(path, bytes.len());
    Ok(bytes.len())
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn convert_and_publish(
    staged: &StagedFile,
    target: &OutputTarget,
    config: &PipelineConfig,
) -> Result<usize, File2MdError> {
    let outcome = tool::convert(staged, config).await;
    publish(outcome, target, staged, config).await
}

async fn stage_source(
    source: &ContentSource,
    config: &PipelineConfig,
) -> Result<StagedFile, File2MdError> {
    match (source, config.staging) {
        (ContentSource::FilePath { path, content }, StagingMode::PassthroughFiles) => {
            warn!("Converting '{}' in place", path.display());
            let staged = StagedFile::existing(path, content.as_bytes())?;
            callback_or_noop(&config.progress_callback).on_staged(&staged.path, staged.len());
            Ok(staged)
        }
        _ => stage_bytes(source.text().as_bytes(), config).await,
    }
}

async fn stage_bytes(content: &[u8], config: &PipelineConfig) -> Result<StagedFile, File2MdError> {
    let staged = stage(content, &config.scratch_dir, &config.staged_file_name).await?;
    callback_or_noop(&config.progress_callback).on_staged(&staged.path, staged.len());
    Ok(staged)
}

/// Normalize an output path that was supplied up front. Failures are fatal
/// here since there is nobody to re-prompt.
async fn configured_target(
    path: &Path,
    config: &PipelineConfig,
) -> Result<OutputTarget, File2MdError> {
    let target = normalize_output(&path.to_string_lossy()).await?;
    if target.extension_forced() {
        callback_or_noop(&config.progress_callback).on_extension_forced(target.path());
    }
    Ok(target)
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp_path = path.with_extension("md.tmp");
    tokio::fs::write(&tmp_path, bytes).await?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(e);
    }
    Ok(())
}

fn report(
    source: &ContentSource,
    staged: &StagedFile,
    target: &OutputTarget,
    bytes_written: usize,
    started: Instant,
) -> SessionReport {
    let duration_ms = started.elapsed().as_millis() as u64;
    info!(
        "Session complete: {} bytes → {} in {}ms",
        bytes_written,
        target.path().display(),
        duration_ms
    );
    SessionReport {
        source: match source {
            ContentSource::FilePath { .. } => SourceKind::File,
            ContentSource::LiteralText(_) => SourceKind::Pasted,
        },
        source_path: source.path().map(Path::to_path_buf),
        staged_path: staged.path.clone(),
        output_path: target.path().to_path_buf(),
        bytes_written,
        extension_forced: target.extension_forced(),
        duration_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn staged_in(dir: &Path) -> StagedFile {
        stage(b"raw", &dir.join("scratch"), "s.md").await.unwrap()
    }

    #[tokio::test]
    async fn publish_writes_success_bytes_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let staged = staged_in(dir.path()).await;
        let target = normalize_output(dir.path().join("out/doc").to_str().unwrap())
            .await
            .unwrap();

        let n = publish(
            ConversionOutcome::Success(b"# Title\n".to_vec()),
            &target,
            &staged,
            &PipelineConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(n, 8);
        assert_eq!(std::fs::read(target.path()).unwrap(), b"# Title\n");
        assert!(!target.path().with_extension("md.tmp").exists());
    }

    #[tokio::test]
    async fn publish_failure_leaves_target_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let staged = staged_in(dir.path()).await;
        let target = normalize_output(dir.path().join("doc.md").to_str().unwrap())
            .await
            .unwrap();

        let err = publish(
            ConversionOutcome::ToolFailed {
                exit_code: Some(1),
                stdout: None,
                stderr: None,
            },
            &target,
            &staged,
            &PipelineConfig::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, File2MdError::ToolFailed { exit_code: Some(1), .. }));
        assert_eq!(err.staged_path(), Some(staged.path.as_path()));
        assert!(!target.path().exists());
    }

    #[tokio::test]
    async fn publish_write_error_is_distinct() {
        let dir = tempfile::tempdir().unwrap();
        let staged = staged_in(dir.path()).await;
        let target = normalize_output(dir.path().join("doc.md").to_str().unwrap())
            .await
            .unwrap();
        // A directory where the file should go makes the rename fail.
        std::fs::create_dir(target.path()).unwrap();

        let err = publish(
            ConversionOutcome::Success(b"x".to_vec()),
            &target,
            &staged,
            &PipelineConfig::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, File2MdError::PublishFailed { .. }), "got: {err}");
        assert!(!target.path().with_extension("md.tmp").exists());
    }

    #[tokio::test]
    async fn passthrough_uses_the_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        std::fs::write(&input, "body").unwrap();
        let config = PipelineConfig::builder()
            .scratch_dir(dir.path().join("scratch"))
            .staging(StagingMode::PassthroughFiles)
            .build()
            .unwrap();
        let source = ContentSource::FilePath {
            path: input.clone(),
            content: "body".into(),
        };

        let staged = stage_source(&source, &config).await.unwrap();
        assert_eq!(staged.path, input);
        assert!(!dir.path().join("scratch").exists());
    }

    #[tokio::test]
    async fn file_sources_are_copied_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::builder()
            .scratch_dir(dir.path().join("scratch"))
            .build()
            .unwrap();
        let source = ContentSource::FilePath {
            path: dir.path().join("in.txt"),
            content: "body".into(),
        };

        let staged = stage_source(&source, &config).await.unwrap();
        assert_eq!(staged.path, dir.path().join("scratch").join(&config.staged_file_name));
        assert_eq!(std::fs::read(&staged.path).unwrap(), b"body");
    }
}
