//! Configuration management commands.

use clap::{Args, Subcommand};

use super::{get_config, output, print_success};
use crate::Cli;

/// Manage CLI configuration.
#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    /// Show the effective configuration
    Show,
    /// Set a configuration value (threshold, capture, frame_rate, stop, dim, metric, data_dir)
    Set {
        key: String,
        value: String,
    },
    /// Print the config file path
    Path,
}

impl ConfigCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let mut cfg = get_config(cli)?;
        match &self.command {
            ConfigSubcommand::Show => output(cli).write(&cfg),
            ConfigSubcommand::Set { key, value } => {
                cfg.set(key, value)?;
                // Reject values the classifier would refuse at run time.
                cfg.classifier()?;
                cfg.save()?;
                print_success(&format!("{key} = {value}"));
                Ok(())
            }
            ConfigSubcommand::Path => {
                println!("{}", cfg.path().display());
                Ok(())
            }
        }
    }
}
