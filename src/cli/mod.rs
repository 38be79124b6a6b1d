//! CLI parser and command dispatch.

mod commands;
mod icons;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use jobscroll::config::Config;

use commands::run_cmd::RunOptions;

#[derive(Parser)]
#[command(name = "jobscroll")]
#[command(about = "Harvest job listings from infinitely scrolling search results")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Open the search in a browser and harvest listings while scrolling
    Run(RunOptions),

    /// Print the listings stored in a harvest file
    Show {
        /// Harvest file written by `run`
        file: PathBuf,
        /// Show at most this many listings (0 = all)
        #[arg(short, long, default_value = "0")]
        limit: usize,
        /// Print the raw JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Config::load_from_path(path).await?
        }
        None => Config::load().await,
    };

    match cli.command {
        Commands::Run(options) => commands::run_cmd::cmd_run(config, options).await,
        Commands::Show { file, limit, json } => commands::show::cmd_show(&file, limit, json),
        Commands::Config => commands::config_cmd::cmd_config(&config),
    }
}
