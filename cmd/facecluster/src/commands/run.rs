//! Clusters the faces of a detections file.

use std::path::PathBuf;
use std::sync::atomic::Ordering;

use chrono::Utc;
use clap::Args;
use facecluster::{Ingest, Sampler, SnapshotStore, load_store};

use super::{get_config, output, print_info, print_success, print_warning, snapshot_store};
use crate::Cli;
use crate::replay::{self, ReplayProvider};

#[derive(Args)]
pub struct RunCommand {
    /// Detections file (JSON lines, one frame per line)
    #[arg(short = 'i', long)]
    input: PathBuf,

    /// Frames to analyse per second of video (overrides config file)
    #[arg(short = 'c', long)]
    capture: Option<u32>,

    /// Stop after this many seconds of video, 0 = run to the end
    #[arg(short = 's', long)]
    stop: Option<f64>,

    /// Similarity threshold (overrides config file)
    #[arg(short = 't', long)]
    threshold: Option<f32>,

    /// Frame rate when the input has no header (overrides config file)
    #[arg(long)]
    frame_rate: Option<f64>,

    /// Snapshot directory (overrides config file)
    #[arg(long)]
    store: Option<PathBuf>,
}

impl RunCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let mut cfg = get_config(cli)?;
        if let Some(c) = self.capture {
            cfg.captures_per_second = c;
        }
        if let Some(s) = self.stop {
            cfg.stop_after = (s > 0.0).then_some(s);
        }
        if let Some(t) = self.threshold {
            cfg.threshold = t;
        }
        let classifier = cfg.classifier()?;

        let (declared_rate, frames) = replay::open(&self.input)?;
        let frame_rate = self
            .frame_rate
            .or(declared_rate)
            .unwrap_or(cfg.frame_rate);
        let sampler = Sampler::new(frame_rate, cfg.captures_per_second, cfg.stop_after)?;

        let snapshots = snapshot_store(&cfg, self.store.as_deref())?;
        let mut store = load_store(&snapshots, &classifier)?;

        print_info(&format!("source {}", self.input.display()));
        print_info(&format!(
            "{frame_rate} frame/sec, capture every {} frame",
            sampler.every()
        ));
        print_info(&format!(
            "similarity threshold: {} ({})",
            classifier.threshold(),
            classifier.distance().name()
        ));
        if let Some(s) = cfg.stop_after {
            print_info(&format!("will stop after {s} seconds"));
        }
        print_info(&format!("loaded {} from {}", store, snapshots.dir().display()));
        print_info("press ^C to stop detecting immediately");

        let ingest = Ingest::new(sampler);
        let cancel = ingest.cancel_handle();
        let mut task = tokio::task::spawn_blocking(move || {
            let stats = ingest.run(frames, &mut ReplayProvider, &classifier, &mut store);
            (stats, store)
        });

        let (stats, store) = tokio::select! {
            joined = &mut task => joined?,
            _ = tokio::signal::ctrl_c() => {
                print_warning("interrupted, stopping after the current frame");
                cancel.store(true, Ordering::Relaxed);
                task.await?
            }
        };

        // Persist whatever was classified, even if the run failed midway.
        let mut snap = store.snapshot();
        snap.saved_at = Some(Utc::now());
        snapshots.save(&snap)?;
        print_success(&format!("saved {} to {}", store, snapshots.path().display()));

        let stats = stats?;
        output(cli).write(&stats)?;
        Ok(())
    }
}
