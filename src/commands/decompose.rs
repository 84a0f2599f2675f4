//! # Decompose Command Implementation
//!
//! `dcm decompose` splits the compose file into a template, in which the
//! section is replaced by the placeholder marker, and one file per entry in
//! the entry directory. `--format` picks the formatting strategy, which
//! rewrites every file without comments.

use anyhow::Result;
use clap::Args;

use dcm::decomposer;
use dcm::error::Error;
use dcm::output::OutputConfig;
use dcm::prompt::TerminalPrompter;
use dcm::strategy::Mode;

use super::ProjectArgs;

/// Split the compose file into a template and entry files
#[derive(Args, Debug)]
pub struct DecomposeArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Format the output and delete comments (same as --mode format)
    #[arg(long, conflicts_with = "mode")]
    pub format: bool,
}

/// Execute the `decompose` command.
pub fn execute(args: DecomposeArgs, out: &OutputConfig) -> Result<()> {
    let mut config = args.project.to_config()?;
    if args.format {
        config.mode = Mode::Format;
    }
    println!(
        "{} Decomposing {} ({} strategy)",
        out.emoji("✂️", "=>"),
        out.value(config.compose_path().display()),
        config.mode
    );

    let report = match decomposer::decompose(&config, &TerminalPrompter) {
        Ok(report) => report,
        Err(Error::UserCancelled) => {
            println!("Operation canceled");
            return Ok(());
        }
        Err(e @ Error::NotFound { .. }) => {
            println!("{}", out.warning(e.to_string()));
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    for backup in &report.backups {
        println!("Previous version kept as {}", out.value(backup.display()));
    }
    for entry in &report.entries {
        println!("  {}", entry.display());
    }
    println!(
        "{}",
        out.success(format!(
            "Template '{}' and {} entry files written",
            report.template.display(),
            report.entries.len()
        ))
    );
    Ok(())
}
