//! # Build Command Implementation
//!
//! `dcm build` merges the template and every entry file in the entry
//! directory back into one compose file. The entry files are merged in file
//! name order.
//!
//! An existing compose file is only replaced after confirmation (or with
//! `--force`), and the previous version is renamed to a dated backup first
//! unless `--no-backup` is given. Declining the prompt is not an error, and
//! neither is a missing input: the message is printed and the command exits
//! cleanly.

use anyhow::Result;
use clap::Args;

use dcm::builder;
use dcm::config::Config;
use dcm::error::Error;
use dcm::output::OutputConfig;
use dcm::prompt::TerminalPrompter;

use super::ProjectArgs;

/// Build the compose file from the template and entry files
#[derive(Args, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
}

/// Execute the `build` command.
pub fn execute(args: BuildArgs, out: &OutputConfig) -> Result<()> {
    let config = args.project.to_config()?;
    print_parameters(&config, out);

    match builder::build(&config, &TerminalPrompter) {
        Ok(report) => {
            if let Some(backup) = &report.backup {
                println!("Previous compose file kept as {}", out.value(backup.display()));
            }
            println!(
                "{}",
                out.success(format!(
                    "Compose file '{}' built from {} entries",
                    report.output.display(),
                    report.entries.len()
                ))
            );
            Ok(())
        }
        Err(Error::UserCancelled) => {
            println!("Operation canceled");
            Ok(())
        }
        Err(e @ Error::NotFound { .. }) => {
            println!("{}", out.warning(e.to_string()));
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn print_parameters(config: &Config, out: &OutputConfig) {
    println!("{} Building compose file", out.emoji("🔨", "=>"));
    println!("  directory: {}", out.value(config.directory.display()));
    println!("  template:  {}", out.value(&config.template));
    println!("  entries:   {}", out.value(&config.entry_dir));
    println!("  output:    {}", out.value(&config.compose));
    println!("  mode:      {}", out.value(config.mode));
    println!("  force:     {}", out.value(config.is_forced()));
}
