//! Default values for dcm configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

/// Template document written by decompose and read by build.
pub const TEMPLATE_FILE: &str = "docker-compose-dcm.yml";

/// Merged document written by build and read by decompose.
pub const COMPOSE_FILE: &str = "docker-compose.yml";

/// Directory holding one file per entry.
pub const ENTRY_DIR: &str = "services";

/// Top-level key whose children are split into entry files.
pub const SECTION: &str = "services";

/// Extension of entry files, without the dot.
pub const ENTRY_EXTENSION: &str = "yml";

/// Optional project configuration file in the working directory.
pub const CONFIG_FILE: &str = ".dcm.yaml";

/// Marker standing in for the entries of the default section.
pub const PLACEHOLDER: &str = r"<dcm: include services\>";

/// Number of spaces entries are indented by inside the section.
pub const ENTRY_INDENT: usize = 2;

/// Placeholder marker for `section`.
///
/// Always starts at column zero in a template, so it reads as a root key
/// (`<dcm`) rather than as part of the section value.
pub fn placeholder(section: &str) -> String {
    format!(r"<dcm: include {section}\>")
}
