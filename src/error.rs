//! # Error Handling
//!
//! One `thiserror` enum covers every failure the library reports, with a
//! `Result<T>` alias used throughout the crate.
//!
//! Variants carry the file they concern and, where it helps, the operation
//! that failed, so the command layer can print them without adding context
//! of its own. [`Error::UserCancelled`] is not a failure: the binary turns it
//! into a clean exit.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::yaml::ParseError;

/// Main error type for dcm operations
#[derive(Error, Debug)]
pub enum Error {
    /// A required file or directory does not exist.
    #[error("{what} not found: {}", path.display())]
    NotFound { what: String, path: PathBuf },

    /// A document could not be parsed.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    /// The named section is absent from a source document or template.
    #[error("section '{section}' not found in {}", path.display())]
    SectionMissing { section: String, path: PathBuf },

    /// The section exists but holds something other than a mapping of entries.
    #[error("section '{section}' in {} is not a mapping", path.display())]
    InvalidSection { section: String, path: PathBuf },

    /// A template has no placeholder marker to substitute.
    #[error("placeholder '{placeholder}' not found in {}", path.display())]
    PlaceholderMissing { placeholder: String, path: PathBuf },

    /// An entry is not a single key holding a mapping.
    #[error("malformed entry in {}: {message}", path.display())]
    MalformedEntry { path: PathBuf, message: String },

    /// Two entry files define the same entry.
    #[error("entry '{name}' is defined in both {} and {}", first.display(), second.display())]
    DuplicateEntry {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// An entry name cannot be used as a file name.
    #[error("entry name '{name}' cannot be used as a file name")]
    InvalidEntryName { name: String },

    /// Reading a file or directory failed.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing, renaming or creating a file or directory failed.
    #[error("failed to {operation} {}: {source}", path.display())]
    Write {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The user declined to overwrite an existing file.
    #[error("operation cancelled by user")]
    UserCancelled,

    /// The project configuration file is invalid.
    #[error("configuration error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    Config {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML deserialization error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl Error {
    pub(crate) fn not_found(what: &str, path: &Path) -> Self {
        Error::NotFound {
            what: what.to_string(),
            path: path.to_path_buf(),
        }
    }

    pub(crate) fn read(path: &Path, source: std::io::Error) -> Self {
        Error::Read {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn write(operation: &'static str, path: &Path, source: std::io::Error) -> Self {
        Error::Write {
            operation,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
