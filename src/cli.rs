//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use dcm::output::{ColorChoice, OutputConfig};

use crate::commands;

/// Docker Compose Make - split a compose file into per-service files and build it back
#[derive(Parser, Debug)]
#[command(name = "dcm")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output
    #[arg(long, global = true, value_enum, value_name = "WHEN", default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    /// Set log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the compose file from the template and the service files
    Build(commands::build::BuildArgs),

    /// Split the compose file into a template and one file per service
    Decompose(commands::decompose::DecomposeArgs),

    /// Show version information
    Version,

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        self.init_logging();
        let out = OutputConfig::new(self.color);

        match self.command {
            Commands::Build(args) => commands::build::execute(args, &out),
            Commands::Decompose(args) => commands::decompose::execute(args, &out),
            Commands::Version => commands::version::execute(&out),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }

    fn init_logging(&self) {
        let mut builder = env_logger::Builder::new();
        builder
            .parse_filters(&self.log_level)
            .format_timestamp(None)
            .format_target(false);
        if let Ok(filters) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filters);
        }
        if let Err(e) = builder.try_init() {
            log::debug!("Keeping the existing logger: {e}");
        }
    }
}
