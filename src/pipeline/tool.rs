//! Converter invocation: find the executable, run it on the staged file and
//! classify what happened.
//!
//! The converter is spawned directly with an argument vector, never through a
//! shell, so neither the staged path nor the instruction can inject commands.
//! It is expected to rewrite the staged file in place; on exit status 0 the
//! file is read back as the result.
//!
//! There are no retries. Every outcome is returned to the caller once.

use crate::config::PipelineConfig;
use crate::output::ConversionOutcome;
use crate::pipeline::stage::StagedFile;
use crate::progress::callback_or_noop;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Find the converter executable.
///
/// A name containing a path separator is checked as given. Otherwise the
/// configured tool directories are searched first (regular files), then
/// `PATH` (executable regular files).
pub fn locate_tool(config: &PipelineConfig) -> Option<PathBuf> {
    let name = Path::new(&config.tool_name);
    if name.components().count() > 1 || name.is_absolute() {
        return name.is_file().then(|| name.to_path_buf());
    }

    for dir in config.tool_search_dirs() {
        let candidate = dir.join(name);
        if candidate.is_file() {
            debug!("Found converter next to us: {}", candidate.display());
            return Some(candidate);
        }
    }

    let found = search_path(name);
    match &found {
        Some(p) => debug!("Found converter on PATH: {}", p.display()),
        None => debug!("Converter '{}' not found", config.tool_name),
    }
    found
}

fn search_path(name: &Path) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .flat_map(|dir| candidates(&dir, name))
        .find(|p| is_executable(p))
}

#[cfg(windows)]
fn candidates(dir: &Path, name: &Path) -> Vec<PathBuf> {
    let mut out = vec![dir.join(name)];
    if name.extension().is_none() {
        for ext in ["exe", "bat", "cmd"] {
            out.push(dir.join(name).with_extension(ext));
        }
    }
    out
}

#[cfg(not(windows))]
fn candidates(dir: &Path, name: &Path) -> Vec<PathBuf> {
    vec![dir.join(name)]
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Run the converter on `staged` and classify the result.
///
/// Returns [`ConversionOutcome::ToolNotFound`] without spawning anything if
/// [`locate_tool`] finds nothing.
pub async fn convert(staged: &StagedFile, config: &PipelineConfig) -> ConversionOutcome {
    let progress = callback_or_noop(&config.progress_callback);
    let outcome = match locate_tool(config) {
        Some(tool) => {
            progress.on_tool_start(&tool, &staged.path);
            invoke_tool(&tool, staged, config).await
        }
        None => {
            warn!(
                "Converter '{}' not found in {:?} or on PATH",
                config.tool_name,
                config.tool_search_dirs()
            );
            ConversionOutcome::ToolNotFound
        }
    };
    progress.on_tool_finished(&outcome);
    outcome
}

/// Spawn `tool <staged path> <instruction>` and wait for it.
pub async fn invoke_tool(
    tool: &Path,
    staged: &StagedFile,
    config: &PipelineConfig,
) -> ConversionOutcome {
    info!("Running converter: {} {}", tool.display(), staged.path.display());

    let mut cmd = Command::new(tool);
    cmd.arg(&staged.path)
        .arg(config.instruction())
        .stdin(Stdio::null());

    let result = if config.capture_output {
        cmd.output()
            .await
            .map(|out| (out.status, Some(lossy(&out.stdout)), Some(lossy(&out.stderr))))
    } else {
        cmd.stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map(|status| (status, None, None))
    };

    match result {
        Ok((status, _, _)) if status.success() => {
            info!("Converter processed '{}'", staged.path.display());
            match tokio::fs::read(&staged.path).await {
                Ok(bytes) => ConversionOutcome::Success(bytes),
                Err(e) => ConversionOutcome::IoFailure(format!(
                    "converter succeeded but '{}' could not be read back: {e}",
                    staged.path.display()
                )),
            }
        }
        Ok((status, stdout, stderr)) => {
            warn!("Converter failed: {}", status);
            ConversionOutcome::ToolFailed {
                exit_code: status.code(),
                stdout,
                stderr,
            }
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("Converter disappeared before launch: {}", e);
            ConversionOutcome::ToolNotFound
        }
        Err(e) => ConversionOutcome::IoFailure(format!(
            "failed to launch '{}': {e}",
            tool.display()
        )),
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &Path, tool: &str) -> PipelineConfig {
        PipelineConfig::builder()
            .tool_name(tool)
            .tool_dir(dir)
            .build()
            .unwrap()
    }

    #[test]
    fn finds_tool_in_configured_dir() {
        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("my-converter");
        std::fs::write(&tool, "").unwrap();

        let found = locate_tool(&config_in(dir.path(), "my-converter"));
        assert_eq!(found, Some(tool));
    }

    #[test]
    fn missing_tool_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let found = locate_tool(&config_in(dir.path(), "file2md-no-such-converter-7f3a"));
        assert_eq!(found, None);
    }

    #[test]
    fn explicit_path_is_checked_as_given() {
        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("conv");
        let cfg = PipelineConfig::builder()
            .tool_name(tool.to_str().unwrap())
            .build()
            .unwrap();
        assert_eq!(locate_tool(&cfg), None);

        std::fs::write(&tool, "").unwrap();
        assert_eq!(locate_tool(&cfg), Some(tool));
    }

    #[test]
    fn directories_named_like_the_tool_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("file2md-dir-not-tool")).unwrap();
        assert_eq!(
            locate_tool(&config_in(dir.path(), "file2md-dir-not-tool")),
            None
        );
    }

    #[tokio::test]
    async fn convert_without_tool_does_not_spawn() {
        let dir = tempfile::tempdir().unwrap();
        let staged = crate::pipeline::stage::stage(b"body", dir.path(), "s.md")
            .await
            .unwrap();
        let outcome = convert(&staged, &config_in(dir.path(), "file2md-missing-9c1e")).await;
        assert_eq!(outcome, ConversionOutcome::ToolNotFound);
        assert_eq!(std::fs::read(&staged.path).unwrap(), b"body");
    }

    #[tokio::test]
    async fn vanished_tool_at_spawn_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let staged = crate::pipeline::stage::stage(b"body", dir.path(), "s.md")
            .await
            .unwrap();
        let cfg = config_in(dir.path(), "x");
        let outcome = invoke_tool(&dir.path().join("gone"), &staged, &cfg).await;
        assert_eq!(outcome, ConversionOutcome::ToolNotFound);
    }
}
