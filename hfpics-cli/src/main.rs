//! HFPics CLI - Command-line interface
//!
//! Thin wrapper over the `hfpics` library for fetching single images from a
//! sharded dataset and inspecting the local cache.

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use commands::cache::CacheAction;
use commands::config::ConfigCommands;
use commands::get::GetArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "hfpics", version, about = "Fetch images from sharded Hugging Face datasets")]
struct Cli {
    /// Dataset repository (owner/name), overrides the config file
    #[arg(long, global = true)]
    repo: Option<String>,

    /// Cache directory, overrides the config file
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch an image by ID, printing its cache path
    Get(GetArgs),

    /// Show the shard key and remote URLs for an ID
    Shard {
        /// Image ID
        id: u64,
    },

    /// Look an ID up in its shard manifest without downloading the image
    Locate {
        /// Image ID
        id: u64,
    },

    /// Inspect the local image cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// View or change configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    hfpics::logging::init_logging(cli.verbose);

    let overrides = commands::common::Overrides {
        repo: cli.repo,
        cache_dir: cli.cache_dir,
    };

    let result = match cli.command {
        Commands::Get(args) => commands::get::run(args, &overrides),
        Commands::Shard { id } => commands::shard::run_shard(id, &overrides),
        Commands::Locate { id } => commands::shard::run_locate(id, &overrides),
        Commands::Cache { action } => commands::cache::run(action, &overrides),
        Commands::Config { command } => commands::config::run(command),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(error = ?e, "Command failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
