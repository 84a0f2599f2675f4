//! # Configuration
//!
//! [`Config`] is the explicit set of names and policies every operation runs
//! with. It is built from the defaults in [`crate::defaults`], then an
//! optional `.dcm.yaml` project file in the working directory, then the
//! command-line flags, each layer overriding the one before.
//!
//! ```yaml
//! # .dcm.yaml
//! template: compose-template.yml
//! entry-dir: stack
//! mode: text
//! backup: false
//! ```
//!
//! Every key is optional; an unknown key is rejected so typos do not go
//! unnoticed.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::{Error, Result};
use crate::strategy::Mode;

/// What to do when an output file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverwritePolicy {
    /// Ask before overwriting.
    #[default]
    Prompt,
    /// Overwrite without asking.
    Force,
}

/// Settings for one build or decompose run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory all other paths are relative to.
    pub directory: PathBuf,
    /// Template file name.
    pub template: String,
    /// Merged compose file name.
    pub compose: String,
    /// Entry directory name.
    pub entry_dir: String,
    /// Top-level key that is split into entries.
    pub section: String,
    /// Entry file extension, without the dot.
    pub entry_extension: String,
    pub overwrite: OverwritePolicy,
    /// Rename existing outputs aside before replacing them.
    pub backup: bool,
    pub mode: Mode,
}

/// Contents of the `.dcm.yaml` project file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub template: Option<String>,
    pub compose: Option<String>,
    pub entry_dir: Option<String>,
    pub section: Option<String>,
    pub entry_extension: Option<String>,
    pub overwrite: Option<OverwritePolicy>,
    pub backup: Option<bool>,
    pub mode: Option<Mode>,
}

impl Config {
    /// Built-in defaults rooted at `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            template: defaults::TEMPLATE_FILE.to_string(),
            compose: defaults::COMPOSE_FILE.to_string(),
            entry_dir: defaults::ENTRY_DIR.to_string(),
            section: defaults::SECTION.to_string(),
            entry_extension: defaults::ENTRY_EXTENSION.to_string(),
            overwrite: OverwritePolicy::default(),
            backup: true,
            mode: Mode::default(),
        }
    }

    /// Defaults overridden by the project file in `directory`, if there is one.
    pub fn load(directory: impl Into<PathBuf>) -> Result<Self> {
        let mut config = Self::new(directory);
        let path = config.directory.join(defaults::CONFIG_FILE);
        if path.is_file() {
            log::debug!("Loading configuration from {}", path.display());
            let text = std::fs::read_to_string(&path).map_err(|e| Error::read(&path, e))?;
            config.apply_file(parse_file_config(&text)?);
        }
        Ok(config)
    }

    /// Override every setting the project file provides.
    pub fn apply_file(&mut self, file: FileConfig) {
        let FileConfig {
            template,
            compose,
            entry_dir,
            section,
            entry_extension,
            overwrite,
            backup,
            mode,
        } = file;
        if let Some(template) = template {
            self.template = template;
        }
        if let Some(compose) = compose {
            self.compose = compose;
        }
        if let Some(entry_dir) = entry_dir {
            self.entry_dir = entry_dir;
        }
        if let Some(section) = section {
            self.section = section;
        }
        if let Some(ext) = entry_extension {
            self.entry_extension = ext.trim_start_matches('.').to_string();
        }
        if let Some(overwrite) = overwrite {
            self.overwrite = overwrite;
        }
        if let Some(backup) = backup {
            self.backup = backup;
        }
        if let Some(mode) = mode {
            self.mode = mode;
        }
    }

    pub fn template_path(&self) -> PathBuf {
        self.directory.join(&self.template)
    }

    pub fn compose_path(&self) -> PathBuf {
        self.directory.join(&self.compose)
    }

    pub fn entry_dir_path(&self) -> PathBuf {
        self.directory.join(&self.entry_dir)
    }

    /// Placeholder marker for the configured section.
    pub fn placeholder(&self) -> String {
        defaults::placeholder(&self.section)
    }

    /// Path of the entry file for `name` inside the entry directory.
    pub fn entry_path(&self, name: &str) -> PathBuf {
        self.entry_dir_path()
            .join(format!("{name}.{}", self.entry_extension))
    }

    pub fn is_forced(&self) -> bool {
        self.overwrite == OverwritePolicy::Force
    }
}

/// Parse the text of a project file. An empty file yields no overrides.
pub fn parse_file_config(text: &str) -> Result<FileConfig> {
    let value: serde_yaml::Value = serde_yaml::from_str(text).map_err(config_error)?;
    if value.is_null() {
        return Ok(FileConfig::default());
    }
    serde_yaml::from_value(value).map_err(config_error)
}

fn config_error(err: serde_yaml::Error) -> Error {
    Error::Config {
        message: format!("{}: {}", defaults::CONFIG_FILE, err),
        hint: Some(
            "valid keys are template, compose, entry-dir, section, entry-extension, overwrite, backup and mode"
                .to_string(),
        ),
    }
}

/// Resolve `directory` the way the commands do: relative paths stay relative
/// to the process working directory.
pub fn resolve_directory(directory: Option<&Path>) -> PathBuf {
    directory
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}
