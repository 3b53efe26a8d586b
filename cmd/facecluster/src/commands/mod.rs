//! CLI commands module.

mod config;
mod run;
mod show;
mod util;

pub use config::ConfigCommand;
pub use run::RunCommand;
pub use show::ShowCommand;

// Re-export utils for use in commands
pub(crate) use util::*;
