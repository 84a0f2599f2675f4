//! Split a compose file into a template and one file per entry.
//!
//! The source is parsed and split in memory first, so a missing section or
//! a malformed document leaves the disk untouched. Entry files are written
//! before the template; a failure part way through leaves the files already
//! written in place.

use std::path::PathBuf;

use crate::backup;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::path;
use crate::prompt::{confirm_overwrite, Prompter};
use crate::strategy::Source;

/// What a decompose run wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecomposeReport {
    pub template: PathBuf,
    /// Entry files in source order.
    pub entries: Vec<PathBuf>,
    /// Previous template and entry directory, where they were moved.
    pub backups: Vec<PathBuf>,
}

/// Decompose the compose file described by `config`.
pub fn decompose(config: &Config, prompter: &dyn Prompter) -> Result<DecomposeReport> {
    path::require("working directory", &config.directory)?;
    let source_path = config.compose_path();
    path::require("compose file", &source_path)?;

    let template_path = config.template_path();
    let template_exists = path::exists(&template_path)?;
    if template_exists {
        confirm_overwrite(prompter, config.is_forced(), "Template file", &template_path)?;
    }

    let text = path::read_text(&source_path)?;
    log::debug!("Decomposing {} with the {} strategy", source_path.display(), config.mode);
    let split = config
        .mode
        .strategy()
        .decompose(Source::new(&source_path, &text), &config.section)?;
    for entry in &split.entries {
        path::validate_entry_name(&entry.name)?;
    }

    let entry_dir = config.entry_dir_path();
    let mut backups = Vec::new();
    if config.backup {
        if template_exists {
            backups.push(backup::backup(&template_path)?);
        }
        if path::is_non_empty_dir(&entry_dir)? {
            backups.push(backup::backup(&entry_dir)?);
        }
    } else if path::is_non_empty_dir(&entry_dir)? {
        log::warn!(
            "{} is not empty; files of entries no longer in {} are kept",
            entry_dir.display(),
            source_path.display()
        );
    }

    std::fs::create_dir_all(&entry_dir).map_err(|e| Error::write("create", &entry_dir, e))?;

    let mut entries = Vec::with_capacity(split.entries.len());
    for entry in &split.entries {
        let file = config.entry_path(&entry.name);
        path::write_text(&file, &entry.content)?;
        entries.push(file);
    }
    path::write_text(&template_path, &split.template)?;

    Ok(DecomposeReport {
        template: template_path,
        entries,
        backups,
    })
}
