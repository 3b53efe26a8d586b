//! facecluster CLI - groups the faces of a video into persons.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod replay;

use commands::{ConfigCommand, RunCommand, ShowCommand};

/// facecluster CLI - groups the faces of a video into persons.
///
/// Faces are read as precomputed detections (box + embedding per face,
/// one JSON line per frame) and clustered online. Results persist in the
/// data directory, so later runs keep recognising earlier persons.
///
/// Configuration is stored in ~/.facecluster/facecluster/config.yaml.
#[derive(Parser)]
#[command(name = "facecluster")]
#[command(about = "Online face clustering CLI tool")]
#[command(version)]
pub struct Cli {
    /// Config file (default is ~/.facecluster/facecluster/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short = 'o', long, global = true)]
    pub output: Option<String>,

    /// Output as JSON (for piping)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Cluster the faces of a detections file
    Run(RunCommand),
    /// Show the persisted persons
    Show(ShowCommand),
    /// Manage CLI configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Run(cmd) => cmd.run(&cli).await,
        Commands::Show(cmd) => cmd.run(&cli),
        Commands::Config(cmd) => cmd.run(&cli),
    }
}
