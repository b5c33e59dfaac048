//! Instruction text handed to the external converter.
//!
//! The converter receives the staged file and this instruction, and is
//! expected to rewrite the file in place. Callers can override the text via
//! [`crate::config::PipelineConfig::instruction`].

/// Default instruction passed as the converter's second argument.
pub const DEFAULT_INSTRUCTION: &str = "Convert the entire content of this file into \
well-formatted Markdown. Replace the existing content of this file with only the \
generated Markdown. Do not add conversational text, commentary, introductions, or summaries.";
