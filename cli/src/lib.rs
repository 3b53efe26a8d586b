//! CLI utilities for facecluster.
//!
//! This crate provides the config file, directory layout and output
//! formatting shared by the command-line tools.

pub mod config;
pub mod output;
pub mod paths;

pub use config::{Config, Metric, load_config};
pub use output::{Output, OutputFormat};
pub use paths::Paths;
