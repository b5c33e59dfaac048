//! Pipeline stages for a file2md session.
//!
//! Each submodule implements exactly one step, so each can be tested against
//! scripted input and temp directories.
//!
//! ## Data Flow
//!
//! ```text
//! lines ──▶ input ──▶ stage ──▶ tool ──▶ publish
//!                      target ───────────▲
//! ```
//!
//! 1. [`lines`] : deadline-aware line reads (reader thread + channel)
//! 2. [`input`] : file path vs. pasted text; idle-timeout paste detection
//! 3. [`stage`] : write content to the fixed scratch file
//! 4. [`target`]: force `.md`, create parent directories, re-prompt
//! 5. [`tool`]  : locate and spawn the converter, classify the outcome

pub mod input;
pub mod lines;
pub mod stage;
pub mod target;
pub mod tool;
