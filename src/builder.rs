//! Compose a merged document from a template and entry files.
//!
//! Order of work: check inputs exist, ask before overwriting an existing
//! output, read everything, merge, back up the old output, write. Nothing is
//! written when any earlier step fails.

use std::path::PathBuf;

use crate::backup;
use crate::config::Config;
use crate::error::Result;
use crate::path;
use crate::prompt::{confirm_overwrite, Prompter};
use crate::strategy::Source;

/// What a build wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub output: PathBuf,
    /// Entry files merged, in merge order.
    pub entries: Vec<PathBuf>,
    /// Where the previous output was moved, if it existed and backups are on.
    pub backup: Option<PathBuf>,
}

/// Build the compose file described by `config`.
pub fn build(config: &Config, prompter: &dyn Prompter) -> Result<BuildReport> {
    path::require("build directory", &config.directory)?;
    let template_path = config.template_path();
    path::require("template file", &template_path)?;
    let entry_dir = config.entry_dir_path();
    path::require("entry directory", &entry_dir)?;

    let output = config.compose_path();
    let output_exists = path::exists(&output)?;
    if output_exists {
        confirm_overwrite(prompter, config.is_forced(), "Compose file", &output)?;
    }

    let template = path::read_text(&template_path)?;
    let entries = path::discover_entries(&entry_dir, &config.entry_extension)?;
    if entries.is_empty() {
        log::warn!("No entry files found in {}", entry_dir.display());
    }
    let texts = entries
        .iter()
        .map(|p| path::read_text(p))
        .collect::<Result<Vec<_>>>()?;
    let sources: Vec<Source<'_>> = entries
        .iter()
        .zip(&texts)
        .map(|(p, text)| Source::new(p, text))
        .collect();

    log::debug!(
        "Composing {} entries with the {} strategy",
        sources.len(),
        config.mode
    );
    let merged = config.mode.strategy().compose(
        Source::new(&template_path, &template),
        &sources,
        &config.section,
    )?;

    let backup = if output_exists && config.backup {
        Some(backup::backup(&output)?)
    } else {
        None
    };
    path::write_text(&output, &merged)?;

    Ok(BuildReport {
        output,
        entries,
        backup,
    })
}
