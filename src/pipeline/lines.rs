//! Deadline-aware line reads.
//!
//! Paste detection needs "give me the next line, or tell me nothing arrived
//! within N seconds". Blocking stdin reads cannot be abandoned, so terminal
//! input is read on a dedicated OS thread that forwards each line over a
//! bounded tokio channel. A read is then a `recv()` wrapped in
//! `tokio::time::timeout`, optionally raced against Ctrl-C.
//!
//! `recv()` is cancel-safe: a line that arrives after a read timed out is
//! delivered to the next read rather than lost.

use std::future::Future;
use std::io::{self, BufRead};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// Lines buffered between the reader thread and the pipeline.
const CHANNEL_CAPACITY: usize = 256;

/// Result of a single line read.
#[derive(Debug)]
pub enum LineRead {
    /// A complete line, without its trailing newline.
    Line(String),
    /// No line arrived before the deadline.
    TimedOut,
    /// The input stream is closed.
    Eof,
    /// The user pressed Ctrl-C.
    Interrupted,
    /// The underlying read failed (e.g. the line was not valid UTF-8).
    Failed(io::Error),
}

/// A source of interactive input lines.
///
/// `idle` is the read deadline; `None` blocks until a line, end of input or
/// an interrupt.
pub trait LineSource {
    fn next_line(&mut self, idle: Option<Duration>) -> impl Future<Output = LineRead> + Send;
}

/// [`LineSource`] fed by a background reader thread.
pub struct ChannelLines {
    rx: mpsc::Receiver<io::Result<String>>,
    interruptible: bool,
}

impl ChannelLines {
    /// Read lines from the process's standard input.
    ///
    /// Ctrl-C during a read yields [`LineRead::Interrupted`]; turn that off
    /// with [`ChannelLines::interruptible`].
    pub fn stdin() -> io::Result<Self> {
        Ok(Self::from_reader(io::BufReader::new(io::stdin()))?.interruptible(true))
    }

    /// Read lines from any blocking reader on a dedicated thread.
    ///
    /// The thread exits when the reader is exhausted or the returned source is
    /// dropped (after its next send fails).
    pub fn from_reader<R>(reader: R) -> io::Result<Self>
    where
        R: BufRead + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        std::thread::Builder::new()
            .name("file2md-input".into())
            .spawn(move || forward_lines(reader, tx))?;
        Ok(Self::from_channel(rx))
    }

    /// Wrap an existing channel. Closing every sender signals end of input.
    /// Not interruptible unless [`ChannelLines::interruptible`] says so.
    pub fn from_channel(rx: mpsc::Receiver<io::Result<String>>) -> Self {
        Self {
            rx,
            interruptible: false,
        }
    }

    /// Return [`LineRead::Interrupted`] when Ctrl-C arrives during a read.
    pub fn interruptible(mut self, v: bool) -> Self {
        self.interruptible = v;
        self
    }
}

impl LineSource for ChannelLines {
    async fn next_line(&mut self, idle: Option<Duration>) -> LineRead {
        let interruptible = self.interruptible;
        let rx = &mut self.rx;
        let read = async move {
            let next = match idle {
                Some(deadline) => match tokio::time::timeout(deadline, rx.recv()).await {
                    Ok(next) => next,
                    Err(_) => return LineRead::TimedOut,
                },
                None => rx.recv().await,
            };
            match next {
                Some(Ok(line)) => LineRead::Line(line),
                Some(Err(e)) => LineRead::Failed(e),
                None => LineRead::Eof,
            }
        };

        if !interruptible {
            return read.await;
        }
        tokio::select! {
            biased;
            Ok(()) = tokio::signal::ctrl_c() => LineRead::Interrupted,
            r = read => r,
        }
    }
}

fn forward_lines<R: BufRead>(reader: R, tx: mpsc::Sender<io::Result<String>>) {
    for line in reader.lines() {
        // Undecodable lines are consumed by the failed read; anything else
        // would fail again on the next call.
        let stop = matches!(&line, Err(e) if e.kind() != io::ErrorKind::InvalidData);
        if tx.blocking_send(line).is_err() || stop {
            break;
        }
    }
    debug!("input reader finished");
}
