//! Shows the persisted persons.

use std::path::PathBuf;

use clap::Args;
use facecluster::load_store;

use super::{get_config, output, snapshot_store};
use crate::Cli;

#[derive(Args)]
pub struct ShowCommand {
    /// Include the distance matrix between person representatives
    #[arg(long)]
    matrix: bool,

    /// Snapshot directory (overrides config file)
    #[arg(long)]
    store: Option<PathBuf>,
}

impl ShowCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let cfg = get_config(cli)?;
        let classifier = cfg.classifier()?;
        let snapshots = snapshot_store(&cfg, self.store.as_deref())?;
        let store = load_store(&snapshots, &classifier)?;

        let mut report = store.report();
        if self.matrix {
            report.distances = Some(store.distance_matrix(classifier.distance())?);
        }
        output(cli).write(&report)
    }
}
