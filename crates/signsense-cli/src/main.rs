//! Signsense CLI
//!
//! Offline tooling for the exemplar dataset. The runtime never mutates the
//! dataset; everything that regenerates or inspects it lives here, built on
//! the same format helpers and synonym table as the classifier so the two
//! paths cannot diverge.
//!
//! # Commands
//!
//! - `dataset validate`: load a dataset file and report kept/skipped rows
//! - `dataset mirror`: append handedness-mirrored copies of every row
//! - `dataset stats`: per-label counts and nearest-neighbor spread

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

/// Signsense dataset tooling
#[derive(Parser)]
#[command(name = "signsense-cli")]
#[command(version = "0.1.0")]
#[command(about = "Offline dataset tooling for the signsense classifier")]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Exemplar dataset commands
    Dataset {
        #[command(subcommand)]
        action: commands::dataset::DatasetCommands,
    },
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    fmt().with_env_filter(filter).with_target(false).init();

    let result = match cli.command {
        Commands::Dataset { action } => commands::dataset::run(action),
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "command failed");
            std::process::ExitCode::FAILURE
        }
    }
}
