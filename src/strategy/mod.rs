//! Decompose and compose transforms.
//!
//! Both directions are pure text-to-text functions behind the [`Strategy`]
//! trait; reading and writing files is left to [`crate::decomposer`] and
//! [`crate::builder`]. Three strategies are provided:
//!
//! - [`TreeStrategy`] parses documents with [`crate::yaml`] and moves whole
//!   key blocks around, lines untouched.
//! - [`TextStrategy`] classifies raw lines with a small state machine. It is
//!   simpler but assumes entries are indented by exactly two spaces, and a
//!   block scalar line that looks like a key will confuse it.
//! - [`FormatStrategy`] deserializes the documents and writes them back in
//!   `serde_yaml`'s layout. Comments are dropped.
//!
//! Entry texts produced by any strategy have the entry key at column zero,
//! so entry files can be built by any of them.

mod format;
mod text;
mod tree;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::yaml::keeps_trailing_blanks;

pub use format::FormatStrategy;
pub use text::TextStrategy;
pub use tree::TreeStrategy;

/// A document together with the file it was read from, for error messages.
#[derive(Debug, Clone, Copy)]
pub struct Source<'a> {
    pub path: &'a Path,
    pub text: &'a str,
}

impl<'a> Source<'a> {
    pub fn new(path: &'a Path, text: &'a str) -> Self {
        Self { path, text }
    }
}

/// One decomposed entry: its key and the text of its single-entry document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub content: String,
}

/// Result of splitting a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decomposition {
    /// The source with the section's entries replaced by the placeholder.
    pub template: String,
    /// Entries in source order.
    pub entries: Vec<Entry>,
}

/// A decompose/compose algorithm.
pub trait Strategy {
    /// Split the entries of `section` out of `source`.
    fn decompose(&self, source: Source<'_>, section: &str) -> Result<Decomposition>;

    /// Merge `entries` into the placeholder of `section` in `template`.
    /// Entries are used in the order given.
    fn compose(&self, template: Source<'_>, entries: &[Source<'_>], section: &str)
        -> Result<String>;
}

/// Which strategy to run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Parse documents into a comment-preserving tree.
    #[default]
    Tree,
    /// Line-oriented text processing.
    Text,
    /// Reformat through `serde_yaml`, dropping comments.
    Format,
}

impl Mode {
    pub fn strategy(self) -> &'static dyn Strategy {
        match self {
            Mode::Tree => &TreeStrategy,
            Mode::Text => &TextStrategy,
            Mode::Format => &FormatStrategy,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Tree => f.write_str("tree"),
            Mode::Text => f.write_str("text"),
            Mode::Format => f.write_str("format"),
        }
    }
}

/// Ensure `text` ends with exactly one newline, or is empty. Blank lines
/// that close a keep-chomped block scalar are part of its value and stay.
pub(crate) fn finish_text(text: &str) -> String {
    let core = text.trim_end();
    if core.is_empty() {
        return String::new();
    }
    let lines: Vec<&str> = core.lines().collect();
    if keeps_trailing_blanks(&lines) {
        let newlines = text[core.len()..].matches('\n').count().max(1);
        return format!("{core}{}", "\n".repeat(newlines));
    }
    format!("{core}\n")
}

/// [`finish_text`] over lines without their newlines.
pub(crate) fn finish_lines<S: AsRef<str>>(lines: &[S]) -> String {
    let text: String = lines.iter().map(|l| format!("{}\n", l.as_ref())).collect();
    finish_text(&text)
}
