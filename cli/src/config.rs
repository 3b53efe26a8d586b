//! Configuration management for CLI tools.
//!
//! Configuration is stored in ~/.facecluster/{app_name}/config.yaml.
//! Command-line flags override individual fields per invocation.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use facecluster::{Classifier, Cosine, Distance, Euclidean};
use serde::{Deserialize, Serialize};

use crate::paths::Paths;

/// Distance used to compare face embeddings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Euclidean,
    Cosine,
}

impl Metric {
    pub fn distance(self) -> Box<dyn Distance> {
        match self {
            Self::Euclidean => Box::new(Euclidean),
            Self::Cosine => Box::new(Cosine),
        }
    }
}

impl FromStr for Metric {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "euclidean" | "l2" => Ok(Self::Euclidean),
            "cosine" => Ok(Self::Cosine),
            other => anyhow::bail!("unknown metric '{other}' (want euclidean or cosine)"),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Euclidean => write!(f, "euclidean"),
            Self::Cosine => write!(f, "cosine"),
        }
    }
}

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum embedding distance for two faces to count as one person.
    pub threshold: f32,

    /// Frames analysed per second of video.
    pub captures_per_second: u32,

    /// Frame rate assumed when the input does not declare one.
    pub frame_rate: f64,

    /// Stop after this many seconds of video.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_after: Option<f64>,

    /// Embedding dimension produced by the face model.
    pub dim: usize,

    pub metric: Metric,

    /// Where the cluster snapshot is kept (default: app data dir).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Path to the config file (not serialized).
    #[serde(skip)]
    config_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            captures_per_second: 1,
            frame_rate: 30.0,
            stop_after: None,
            dim: 128,
            metric: Metric::Euclidean,
            data_dir: None,
            config_path: PathBuf::new(),
        }
    }
}

impl Config {
    /// Returns the config file path.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Saves the configuration to disk.
    pub fn save(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(&self.config_path, content)?;
        Ok(())
    }

    /// Sets a single field from its string form.
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "threshold" => self.threshold = value.parse()?,
            "captures_per_second" | "capture" => self.captures_per_second = value.parse()?,
            "frame_rate" => self.frame_rate = value.parse()?,
            "stop_after" | "stop" => {
                let s: f64 = value.parse()?;
                self.stop_after = (s > 0.0).then_some(s);
            }
            "dim" => self.dim = value.parse()?,
            "metric" => self.metric = value.parse()?,
            "data_dir" => {
                self.data_dir = (!value.is_empty()).then(|| PathBuf::from(value));
            }
            _ => anyhow::bail!("unknown config key '{key}'"),
        }
        Ok(())
    }

    /// Resolves the snapshot directory.
    pub fn data_dir(&self, paths: &Paths) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| paths.data_dir())
    }

    /// Builds the classifier described by this config.
    pub fn classifier(&self) -> anyhow::Result<Classifier> {
        let cfg = facecluster::Config {
            dim: self.dim,
            threshold: self.threshold,
        };
        Ok(Classifier::with_distance(cfg, self.metric.distance())?)
    }
}

/// Loads configuration for the specified app.
///
/// A missing file is created with default values.
pub fn load_config(app_name: &str, custom_path: Option<&Path>) -> anyhow::Result<Config> {
    let config_path = match custom_path {
        Some(p) => p.to_path_buf(),
        None => Paths::new(app_name)?.config_file(),
    };

    let mut cfg = if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        serde_yaml::from_str(&content)?
    } else {
        Config::default()
    };
    cfg.config_path = config_path;

    if !cfg.config_path.exists() {
        cfg.save()?;
    }
    Ok(cfg)
}
