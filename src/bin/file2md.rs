//! CLI binary for file2md.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `PipelineConfig`, renders session events as prompts and status lines,
//! and turns library errors into exit codes.

use anyhow::{Context, Result};
use clap::Parser;
use file2md::config::{DEFAULT_SCRATCH_DIR, DEFAULT_STAGED_FILE_NAME, DEFAULT_TOOL_NAME};
use file2md::{
    run_session, ChannelLines, ConversionOutcome, File2MdError, PasteEnd, PipelineConfig,
    ProgressCallback, SessionProgressCallback, StagingMode,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

/// Exit status for a run interrupted with Ctrl-C (128 + SIGINT).
const EXIT_CANCELLED: u8 = 130;

// ── CLI session callback ─────────────────────────────────────────────────────

/// Terminal front end: prompts go to stdout (stderr under `--json`), status
/// lines to stderr, and an [indicatif] spinner runs while the converter works.
struct CliProgressCallback {
    /// Suppress status lines (prompts are always shown).
    quiet: bool,
    /// Keep stdout free for the JSON report.
    prompts_to_stderr: bool,
    /// Show a spinner while the converter runs. Off when the converter
    /// writes to the terminal itself.
    spinner: bool,
    /// The active spinner, between `on_tool_start` and `on_tool_finished`.
    bar: Mutex<Option<ProgressBar>>,
}

impl CliProgressCallback {
    fn new(quiet: bool, prompts_to_stderr: bool, spinner: bool) -> Arc<Self> {
        Arc::new(Self {
            quiet,
            prompts_to_stderr,
            spinner,
            bar: Mutex::new(None),
        })
    }

    fn prompt(&self, text: &str) {
        if self.prompts_to_stderr {
            write_prompt(&mut io::stderr().lock(), text);
        } else {
            write_prompt(&mut io::stdout().lock(), text);
        }
    }

    fn status(&self, line: String) {
        if !self.quiet {
            eprintln!("{line}");
        }
    }

    fn take_bar(&self) -> Option<ProgressBar> {
        self.bar.lock().ok().and_then(|mut bar| bar.take())
    }
}

impl SessionProgressCallback for CliProgressCallback {
    fn on_source_prompt(&self, idle_timeout: Duration) {
        self.status(dim(&format!(
            "Enter a file path OR paste content (pasting ends after {:.1}s without input).",
            idle_timeout.as_secs_f64()
        )));
        self.prompt(&bold("File path or first line of content: "));
    }

    fn on_file_selected(&self, path: &Path, bytes: usize) {
        self.status(format!(
            "{} Reading from file: {}  {}",
            cyan("◆"),
            path.display(),
            dim(&format!("{bytes} bytes"))
        ));
    }

    fn on_paste_started(&self, has_first_line: bool) {
        if has_first_line {
            self.status(dim("Paste mode active. End the paste by pausing input."));
        } else {
            self.status(dim("Empty first line. Waiting for a multi-line paste…"));
        }
    }

    fn on_paste_prompt(&self, lines_so_far: usize) {
        self.prompt(&dim(if lines_so_far == 0 { "> " } else { ".. " }));
    }

    fn on_paste_finished(&self, end: PasteEnd, line_count: usize) {
        // Finish the dangling paste prompt.
        self.prompt("\n");
        let why = match end {
            PasteEnd::IdleTimeout => "input paused",
            PasteEnd::EndOfInput => "input stream ended",
        };
        self.status(dim(&format!("--- Input finalized ({why}, {line_count} lines) ---")));
    }

    fn on_input_rejected(&self, error: &File2MdError) {
        self.status(format!("{} {}", yellow("⚠"), error));
    }

    fn on_staged(&self, path: &Path, bytes: usize) {
        self.status(format!(
            "{} Source content staged: {}  {}",
            green("✓"),
            path.display(),
            dim(&format!("{bytes} bytes"))
        ));
    }

    fn on_output_prompt(&self) {
        self.prompt(&bold(
            "Path for the output markdown file (e.g. output/my_doc.md): ",
        ));
    }

    fn on_output_rejected(&self, error: &File2MdError) {
        self.status(format!("{} {}", yellow("⚠"), error));
    }

    fn on_extension_forced(&self, path: &Path) {
        self.status(format!(
            "{} Using .md extension: {}",
            cyan("ℹ"),
            path.display()
        ));
    }

    fn on_tool_start(&self, tool: &Path, _staged: &Path) {
        if self.quiet || !self.spinner {
            self.status(format!("{} Running {}", cyan("◆"), tool.display()));
            return;
        }
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Converting");
        bar.set_message(tool.display().to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        if let Ok(mut slot) = self.bar.lock() {
            *slot = Some(bar);
        }
    }

    fn on_tool_finished(&self, outcome: &ConversionOutcome) {
        if let Some(bar) = self.take_bar() {
            bar.finish_and_clear();
        }
        if outcome.is_success() {
            self.status(format!("{} Converter finished", green("✓")));
        } else {
            self.status(format!("{} Converter did not succeed", red("✗")));
        }
    }

    fn on_published(&self, path: &Path, bytes: usize) {
        self.status(format!(
            "{} Markdown written to {}  {}",
            green("✔"),
            bold(&path.display().to_string()),
            dim(&format!("{bytes} bytes"))
        ));
    }
}

fn write_prompt(out: &mut impl Write, text: &str) {
    let _ = write!(out, "{text}");
    let _ = out.flush();
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Interactive: type a path, or paste text and pause for two seconds
  file2md

  # Skip the output prompt
  file2md -o notes/meeting.md

  # Use a different converter and watch its output live
  file2md --tool ./my-converter.sh --no-capture

  # Rewrite an existing file in place instead of copying it first
  file2md --in-place

CONVERTER CONTRACT:
  <tool> <absolute staged file path> <instruction>
  The tool must rewrite the staged file with the Markdown result and exit 0.
  It is run directly, never through a shell. Lookup order: --tool-dir
  directories (default: next to file2md, then the current directory), then PATH.

ENVIRONMENT VARIABLES:
  FILE2MD_OUTPUT          Output path (skips the prompt)
  FILE2MD_TOOL            Converter executable
  FILE2MD_SCRATCH_DIR     Scratch directory
  FILE2MD_IDLE_TIMEOUT    Seconds of silence that end a paste
  RUST_LOG                Override log filtering (e.g. file2md=debug)
"#;

/// Convert a file or pasted text to Markdown with an external converter.
#[derive(Parser, Debug)]
#[command(
    name = "file2md",
    version,
    about = "Convert a file or pasted text to Markdown with an external converter",
    long_about = "Reads a file path or pasted text from the terminal, stages it in a scratch \
file, runs an external converter on it, and writes the converted Markdown to the path you choose.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Write Markdown to this file instead of prompting for a path.
    #[arg(short, long, env = "FILE2MD_OUTPUT")]
    output: Option<PathBuf>,

    /// Converter executable name or path.
    #[arg(long, env = "FILE2MD_TOOL", default_value = DEFAULT_TOOL_NAME)]
    tool: String,

    /// Directory to search for the converter before PATH (repeatable).
    #[arg(long = "tool-dir")]
    tool_dirs: Vec<PathBuf>,

    /// Scratch directory for the staged file.
    #[arg(long, env = "FILE2MD_SCRATCH_DIR", default_value = DEFAULT_SCRATCH_DIR)]
    scratch_dir: PathBuf,

    /// File name of the staged file inside the scratch directory.
    #[arg(long, env = "FILE2MD_STAGED_NAME", default_value = DEFAULT_STAGED_FILE_NAME)]
    staged_name: String,

    /// Seconds without input that end a paste.
    #[arg(long, env = "FILE2MD_IDLE_TIMEOUT", default_value = "2", value_parser = parse_seconds)]
    idle_timeout: Duration,

    /// Path to a text file containing a custom converter instruction.
    #[arg(long, env = "FILE2MD_INSTRUCTION")]
    instruction_file: Option<PathBuf>,

    /// Let the converter write to the terminal instead of capturing its output.
    #[arg(long, env = "FILE2MD_NO_CAPTURE")]
    no_capture: bool,

    /// Hand an input file to the converter directly (it is rewritten in place).
    #[arg(long, env = "FILE2MD_IN_PLACE")]
    in_place: bool,

    /// Print a JSON session report on stdout when done. Prompts move to stderr.
    #[arg(long, env = "FILE2MD_JSON")]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "FILE2MD_VERBOSE")]
    verbose: bool,

    /// Suppress status lines (prompts are still shown).
    #[arg(short, long, env = "FILE2MD_QUIET")]
    quiet: bool,
}

fn parse_seconds(s: &str) -> Result<Duration, String> {
    let secs: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{s}' is not a number of seconds"))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(format!("idle timeout must be a positive number, got {s}"));
    }
    Ok(Duration::from_secs_f64(secs))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Library logs would interleave with the prompts, so only warnings and
    // errors are shown unless asked for.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report_failure(&err),
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let callback = CliProgressCallback::new(cli.quiet, cli.json, !cli.no_capture);
    let config = build_config(cli, callback).await?;

    let mut lines =
        ChannelLines::stdin().context("Failed to start reading from the terminal")?;

    if !cli.quiet {
        eprintln!("{}", bold("--- file2md ---"));
    }
    let report = run_session(&mut lines, &config).await?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    } else if !cli.quiet {
        eprintln!("{}", dim(&format!("Done in {}ms", report.duration_ms)));
    }
    Ok(())
}

/// Map CLI args to `PipelineConfig`.
async fn build_config(cli: &Cli, progress: Arc<CliProgressCallback>) -> Result<PipelineConfig> {
    let mut builder = PipelineConfig::builder()
        .tool_name(cli.tool.as_str())
        .scratch_dir(cli.scratch_dir.as_path())
        .staged_file_name(cli.staged_name.as_str())
        .idle_timeout(cli.idle_timeout)
        .capture_output(!cli.no_capture)
        .staging(if cli.in_place {
            StagingMode::PassthroughFiles
        } else {
            StagingMode::Always
        })
        .progress_callback(progress as ProgressCallback);

    for dir in &cli.tool_dirs {
        builder = builder.tool_dir(dir.as_path());
    }
    if let Some(ref path) = cli.instruction_file {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read instruction from {:?}", path))?;
        builder = builder.instruction(text.trim());
    }
    if let Some(ref output) = cli.output {
        builder = builder.output_path(output.as_path());
    }

    builder.build().context("Invalid configuration")
}

/// Print a failure with everything needed to recover by hand, and pick the
/// exit status.
fn report_failure(err: &anyhow::Error) -> ExitCode {
    let Some(lib_err) = err.downcast_ref::<File2MdError>() else {
        eprintln!("{} {:#}", red("✘"), err);
        return ExitCode::FAILURE;
    };

    if lib_err.is_cancelled() {
        eprintln!("\n{}", yellow("Operation cancelled. Exiting."));
        return ExitCode::from(EXIT_CANCELLED);
    }

    eprintln!("{} {}", red("✘"), lib_err);
    if let File2MdError::ToolFailed { stdout, stderr, .. } = lib_err {
        eprintln!("{}", bold("Stdout:"));
        eprintln!("{}", stream_or_placeholder(stdout.as_deref(), "[No standard output]"));
        eprintln!("{}", bold("Stderr:"));
        eprintln!("{}", stream_or_placeholder(stderr.as_deref(), "[No standard error]"));
    }
    ExitCode::FAILURE
}

fn stream_or_placeholder<'a>(captured: Option<&'a str>, empty: &'a str) -> &'a str {
    match captured {
        None => "[not captured]",
        Some(s) if s.trim().is_empty() => empty,
        Some(s) => s,
    }
}
