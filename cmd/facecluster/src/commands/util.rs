//! Utility functions for CLI commands.

use std::path::Path;

use facecluster::FileStore;
use facecluster_cli::{Config, Output, OutputFormat, Paths, load_config};

use crate::Cli;

pub const APP_NAME: &str = "facecluster";

/// Gets the global configuration.
pub fn get_config(cli: &Cli) -> anyhow::Result<Config> {
    load_config(APP_NAME, cli.config.as_deref())
}

/// Opens the snapshot directory, preferring an explicit override.
pub fn snapshot_store(cfg: &Config, dir: Option<&Path>) -> anyhow::Result<FileStore> {
    let dir = match dir {
        Some(d) => d.to_path_buf(),
        None => cfg.data_dir(&Paths::new(APP_NAME)?),
    };
    Ok(FileStore::new(dir))
}

/// Output honouring the global `--json` and `-o` flags.
pub fn output(cli: &Cli) -> Output {
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Yaml
    };
    Output::new(format, cli.output.clone())
}

/// Prints success message.
pub fn print_success(msg: &str) {
    eprintln!("\x1b[32m✓\x1b[0m {}", msg);
}

/// Prints info message.
pub fn print_info(msg: &str) {
    eprintln!("\x1b[34mℹ\x1b[0m {}", msg);
}

/// Prints warning message.
pub fn print_warning(msg: &str) {
    eprintln!("\x1b[33m⚠\x1b[0m {}", msg);
}
