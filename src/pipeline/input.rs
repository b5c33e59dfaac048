//! Input resolution: decide whether the first line is a file path or the
//! start of pasted text, and find where a paste ends.
//!
//! ## Where does a paste end?
//!
//! There is no terminator to type. A terminal paste delivers its lines
//! back-to-back, while a user who has finished pasting leaves the terminal
//! idle, so the first read that sees no line within
//! [`crate::config::PipelineConfig::idle_timeout`] finalizes the paste.
//! End of input finalizes it too. The first line is always read without a
//! deadline so nobody is rushed while deciding what to paste.
//!
//! ## States
//!
//! ```text
//! first line ─┬─ regular file ──▶ FilePath (done)
//!             ├─ directory ─────▶ InputAmbiguous (re-prompt)
//!             └─ blank / other ─▶ paste ──┬─ line ──▶ paste
//!                                         ├─ idle / EOF ──▶ LiteralText | EmptyInput
//!                                         └─ Ctrl-C ──▶ Cancelled
//! ```

use crate::config::PipelineConfig;
use crate::error::File2MdError;
use crate::pipeline::lines::{LineRead, LineSource};
use crate::progress::{callback_or_noop, SessionProgressCallback};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Where the session's content came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    /// An existing regular file, read as UTF-8 text.
    FilePath { path: PathBuf, content: String },
    /// Lines pasted into the terminal, in order.
    LiteralText(Vec<String>),
}

impl ContentSource {
    /// The content as a single string; pasted lines are joined with `\n`.
    pub fn text(&self) -> String {
        match self {
            ContentSource::FilePath { content, .. } => content.clone(),
            ContentSource::LiteralText(lines) => lines.join("\n"),
        }
    }

    /// The source file, if the content came from one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ContentSource::FilePath { path, .. } => Some(path),
            ContentSource::LiteralText(_) => None,
        }
    }
}

/// Why paste mode stopped reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasteEnd {
    /// No line arrived within the idle timeout.
    IdleTimeout,
    /// The input stream closed (or failed).
    EndOfInput,
}

/// What the first line turned out to be.
enum FirstLine {
    File(PathBuf),
    Directory(PathBuf),
    Text,
}

/// Resolve one round of the source prompt.
///
/// Returns [`File2MdError::InputAmbiguous`], [`File2MdError::EmptyInput`] or
/// [`File2MdError::IoReadError`] for answers worth asking again about (see
/// [`acquire_content`]); [`File2MdError::Cancelled`] and
/// [`File2MdError::InputClosed`] are final.
pub async fn resolve_source<S: LineSource>(
    lines: &mut S,
    config: &PipelineConfig,
) -> Result<ContentSource, File2MdError> {
    let progress = callback_or_noop(&config.progress_callback);
    progress.on_source_prompt(config.idle_timeout);

    let first = match lines.next_line(None).await {
        LineRead::Line(line) => line,
        LineRead::TimedOut => String::new(),
        LineRead::Eof => return Err(File2MdError::InputClosed),
        LineRead::Interrupted => return Err(File2MdError::Cancelled),
        LineRead::Failed(source) => {
            return Err(File2MdError::IoReadError {
                path: PathBuf::from("<stdin>"),
                source,
            })
        }
    };

    let mut pasted = Vec::new();
    let candidate = first.trim();
    if !candidate.is_empty() {
        match probe_path(candidate).await {
            FirstLine::File(path) => {
                let content = read_source_file(&path).await?;
                info!("Reading from file: {}", path.display());
                progress.on_file_selected(&path, content.len());
                return Ok(ContentSource::FilePath { path, content });
            }
            FirstLine::Directory(path) => return Err(File2MdError::InputAmbiguous { path }),
            FirstLine::Text => pasted.push(first),
        }
    }

    progress.on_paste_started(!pasted.is_empty());
    let end = collect_paste(lines, config, progress.as_ref(), &mut pasted).await?;
    progress.on_paste_finished(end, pasted.len());
    info!("Paste finalized ({:?}) with {} lines", end, pasted.len());

    if pasted.iter().all(|l| l.trim().is_empty()) {
        return Err(File2MdError::EmptyInput);
    }
    Ok(ContentSource::LiteralText(pasted))
}

/// Ask for the source until something usable is provided.
///
/// Unusable answers are reported through
/// [`SessionProgressCallback::on_input_rejected`] and the prompt starts over.
pub async fn acquire_content<S: LineSource>(
    lines: &mut S,
    config: &PipelineConfig,
) -> Result<ContentSource, File2MdError> {
    let progress = callback_or_noop(&config.progress_callback);
    loop {
        match resolve_source(lines, config).await {
            Ok(source) => return Ok(source),
            Err(
                e @ (File2MdError::InputAmbiguous { .. }
                | File2MdError::EmptyInput
                | File2MdError::IoReadError { .. }),
            ) => {
                warn!("{}", e);
                progress.on_input_rejected(&e);
            }
            Err(e) => return Err(e),
        }
    }
}

/// Read paste lines into `pasted` until the idle timeout or end of input.
async fn collect_paste<S: LineSource>(
    lines: &mut S,
    config: &PipelineConfig,
    progress: &dyn SessionProgressCallback,
    pasted: &mut Vec<String>,
) -> Result<PasteEnd, File2MdError> {
    loop {
        progress.on_paste_prompt(pasted.len());
        match lines.next_line(Some(config.idle_timeout)).await {
            LineRead::Line(line) => pasted.push(line),
            LineRead::TimedOut => return Ok(PasteEnd::IdleTimeout),
            LineRead::Eof => return Ok(PasteEnd::EndOfInput),
            LineRead::Interrupted => return Err(File2MdError::Cancelled),
            LineRead::Failed(e) => {
                warn!("Error during input: {}. Finalizing paste.", e);
                return Ok(PasteEnd::EndOfInput);
            }
        }
    }
}

/// Classify the trimmed first line.
///
/// Anything the host refuses to stat (missing, NUL bytes, name too long, …)
/// is text.
async fn probe_path(candidate: &str) -> FirstLine {
    let path = PathBuf::from(candidate);
    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => FirstLine::File(path),
        Ok(meta) if meta.is_dir() => FirstLine::Directory(path),
        Ok(_) => {
            debug!("'{}' exists but is not a regular file", candidate);
            FirstLine::Text
        }
        Err(e) => {
            debug!("'{}' is not a path ({}); treating as pasted text", candidate, e);
            FirstLine::Text
        }
    }
}

async fn read_source_file(path: &Path) -> Result<String, File2MdError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| File2MdError::IoReadError {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::time::Duration;

    /// Replays a fixed sequence of reads and records the deadlines it saw.
    struct Scripted {
        reads: VecDeque<LineRead>,
        deadlines: Vec<Option<Duration>>,
    }

    impl Scripted {
        fn new(reads: Vec<LineRead>) -> Self {
            Self {
                reads: reads.into(),
                deadlines: Vec::new(),
            }
        }
    }

    impl LineSource for Scripted {
        async fn next_line(&mut self, idle: Option<Duration>) -> LineRead {
            self.deadlines.push(idle);
            self.reads.pop_front().unwrap_or(LineRead::Eof)
        }
    }

    fn line(s: &str) -> LineRead {
        LineRead::Line(s.to_string())
    }

    fn config() -> PipelineConfig {
        PipelineConfig::default()
    }

    #[tokio::test]
    async fn existing_file_short_circuits_paste_mode() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        std::fs::write(&file, "alpha\nbeta\n").unwrap();

        let mut src = Scripted::new(vec![
            line(&format!("  {}  ", file.display())),
            line("never read"),
        ]);
        let got = resolve_source(&mut src, &config()).await.unwrap();

        assert_eq!(
            got,
            ContentSource::FilePath {
                path: file.clone(),
                content: "alpha\nbeta\n".into()
            }
        );
        assert_eq!(src.deadlines, vec![None], "only the first line is read");
    }

    #[tokio::test]
    async fn directory_is_ambiguous() {
        let dir = tempfile::tempdir().unwrap();
        let mut src = Scripted::new(vec![line(dir.path().to_str().unwrap())]);
        let err = resolve_source(&mut src, &config()).await.unwrap_err();
        assert!(matches!(err, File2MdError::InputAmbiguous { .. }));
    }

    #[tokio::test]
    async fn non_path_first_line_starts_paste() {
        let mut src = Scripted::new(vec![
            line("# Shopping list"),
            line("- eggs"),
            line("  - free range"),
            LineRead::TimedOut,
        ]);
        let got = resolve_source(&mut src, &config()).await.unwrap();
        assert_eq!(got.text(), "# Shopping list\n- eggs\n  - free range");
        assert_eq!(
            src.deadlines,
            vec![
                None,
                Some(Duration::from_secs(2)),
                Some(Duration::from_secs(2)),
                Some(Duration::from_secs(2)),
            ]
        );
    }

    #[tokio::test]
    async fn empty_first_line_starts_paste_without_recording_it() {
        let mut src = Scripted::new(vec![line(""), line("a"), line("b"), LineRead::TimedOut]);
        let got = resolve_source(&mut src, &config()).await.unwrap();
        assert_eq!(got, ContentSource::LiteralText(vec!["a".into(), "b".into()]));
    }

    #[tokio::test]
    async fn timeout_right_after_first_line_keeps_first_line() {
        let mut src = Scripted::new(vec![line("just one line"), LineRead::TimedOut]);
        let got = resolve_source(&mut src, &config()).await.unwrap();
        assert_eq!(got.text(), "just one line");
        assert_eq!(got.path(), None);
    }

    #[tokio::test]
    async fn eof_mid_paste_keeps_accumulated_lines() {
        let mut src = Scripted::new(vec![line(""), line("kept 1"), line("kept 2"), LineRead::Eof]);
        let got = resolve_source(&mut src, &config()).await.unwrap();
        assert_eq!(got.text(), "kept 1\nkept 2");
    }

    #[tokio::test]
    async fn interrupt_during_paste_cancels() {
        let mut src = Scripted::new(vec![line("start"), line("more"), LineRead::Interrupted]);
        let err = resolve_source(&mut src, &config()).await.unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn blank_paste_is_empty_input() {
        let mut src = Scripted::new(vec![line(""), line("   "), line(""), LineRead::TimedOut]);
        let err = resolve_source(&mut src, &config()).await.unwrap_err();
        assert!(matches!(err, File2MdError::EmptyInput));
    }

    #[tokio::test]
    async fn closed_input_on_first_line() {
        let mut src = Scripted::new(vec![]);
        let err = resolve_source(&mut src, &config()).await.unwrap_err();
        assert!(matches!(err, File2MdError::InputClosed));
    }

    #[tokio::test]
    async fn read_failure_mid_paste_finalizes() {
        let mut src = Scripted::new(vec![
            line("text"),
            LineRead::Failed(std::io::Error::new(std::io::ErrorKind::InvalidData, "bad utf-8")),
            line("not reached"),
        ]);
        let got = resolve_source(&mut src, &config()).await.unwrap();
        assert_eq!(got.text(), "text");
    }

    #[tokio::test]
    async fn nul_byte_first_line_is_text() {
        let mut src = Scripted::new(vec![line("weird\0name"), LineRead::TimedOut]);
        let got = resolve_source(&mut src, &config()).await.unwrap();
        assert_eq!(got.text(), "weird\0name");
    }

    #[tokio::test]
    async fn undecodable_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("blob.bin");
        std::fs::write(&file, [0xff, 0xfe, 0x00]).unwrap();

        let mut src = Scripted::new(vec![line(file.to_str().unwrap())]);
        let err = resolve_source(&mut src, &config()).await.unwrap_err();
        assert!(matches!(err, File2MdError::IoReadError { path, .. } if path == file));
    }

    #[tokio::test]
    async fn acquire_reprompts_after_directory_and_empty_paste() {
        let dir = tempfile::tempdir().unwrap();
        let mut src = Scripted::new(vec![
            // round 1: a directory
            line(dir.path().to_str().unwrap()),
            // round 2: empty paste
            line(""),
            LineRead::TimedOut,
            // round 3: real content
            line("hello"),
            LineRead::TimedOut,
        ]);
        let got = acquire_content(&mut src, &config()).await.unwrap();
        assert_eq!(got.text(), "hello");
    }

    #[tokio::test]
    async fn acquire_stops_on_cancel() {
        let mut src = Scripted::new(vec![line(""), LineRead::TimedOut, LineRead::Interrupted]);
        let err = acquire_content(&mut src, &config()).await.unwrap_err();
        assert!(err.is_cancelled());
    }
}
