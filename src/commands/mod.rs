//! # CLI Command Implementations
//!
//! One file per subcommand of the `dcm` tool. Each holds an `Args` struct
//! derived with `clap` and an `execute` function that calls into the `dcm`
//! library.
//!
//! `build` and `decompose` share [`ProjectArgs`], the flags that locate the
//! project files and pick the overwrite, backup and strategy policies.

pub mod build;
pub mod completions;
pub mod decompose;
pub mod version;

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use dcm::config::{self, Config, OverwritePolicy};
use dcm::strategy::Mode;

/// Flags shared by `build` and `decompose`.
#[derive(Args, Debug, Default)]
pub struct ProjectArgs {
    /// Working directory holding the compose file, template and entry directory
    #[arg(short, long, value_name = "DIR", env = "DCM_DIRECTORY")]
    pub directory: Option<PathBuf>,

    /// Template file name (default: docker-compose-dcm.yml)
    #[arg(short, long, value_name = "FILE")]
    pub template: Option<String>,

    /// Compose file name (default: docker-compose.yml)
    #[arg(short, long, value_name = "FILE")]
    pub compose: Option<String>,

    /// Overwrite existing files without asking
    #[arg(short, long)]
    pub force: bool,

    /// Strategy used to split or merge the section
    #[arg(long, value_enum, value_name = "MODE")]
    pub mode: Option<Mode>,

    /// Do not keep a dated copy of files being replaced
    #[arg(long)]
    pub no_backup: bool,

    /// Top-level key holding the entries (default: services)
    #[arg(long, value_name = "NAME")]
    pub section: Option<String>,
}

impl ProjectArgs {
    /// Defaults, then `.dcm.yaml`, then these flags.
    pub fn to_config(&self) -> Result<Config> {
        let directory = config::resolve_directory(self.directory.as_deref());
        let mut config = Config::load(directory)?;
        if let Some(template) = &self.template {
            config.template = template.clone();
        }
        if let Some(compose) = &self.compose {
            config.compose = compose.clone();
        }
        if let Some(section) = &self.section {
            config.section = section.clone();
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if self.force {
            config.overwrite = OverwritePolicy::Force;
        }
        if self.no_backup {
            config.backup = false;
        }
        Ok(config)
    }
}
