use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::distance::{Distance, Euclidean};
use crate::error::{FaceClusterError, Result};
use crate::observation::{Embedding, Observation};
use crate::person::PersonId;
use crate::store::ClusterStore;

/// Controls classifier behavior.
///
/// Both fields are required; there are no fallback values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Embedding dimension (128 for dlib face encodings).
    pub dim: usize,

    /// Maximum distance, exclusive, at which two embeddings count as the
    /// same face. Smaller = stricter.
    pub threshold: f32,
}

impl Config {
    fn validate(&self) -> Result<()> {
        if self.dim == 0 {
            return Err(FaceClusterError::InvalidConfig(
                "dim must be positive".into(),
            ));
        }
        validate_threshold(self.threshold)
    }
}

fn validate_threshold(t: f32) -> Result<()> {
    if !t.is_finite() || t <= 0.0 {
        return Err(FaceClusterError::InvalidConfig(format!(
            "threshold must be a positive number, got {t}"
        )));
    }
    Ok(())
}

/// Outcome of classifying one observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Appended to an existing person.
    Matched(PersonId),
    /// Paired with an unresolved observation to found a new person.
    Created(PersonId),
    /// Left unresolved.
    Deferred,
}

impl Decision {
    pub fn person(&self) -> Option<PersonId> {
        match *self {
            Self::Matched(id) | Self::Created(id) => Some(id),
            Self::Deferred => None,
        }
    }
}

/// Online single-pass face matcher.
///
/// Each observation is compared first against every known person's
/// representative embedding, then against every unresolved observation.
/// Known persons always win over unresolved pairs, so an already resolved
/// face never seeds a duplicate person.
///
/// The classifier owns no cluster state. It decides, and the
/// [`ClusterStore`] passed to [`Classifier::classify`] applies the change.
pub struct Classifier {
    cfg: Config,
    distance: Box<dyn Distance>,
}

impl Classifier {
    /// Creates a classifier using Euclidean distance.
    pub fn new(cfg: Config) -> Result<Self> {
        Self::with_distance(cfg, Box::new(Euclidean))
    }

    pub fn with_distance(cfg: Config, distance: Box<dyn Distance>) -> Result<Self> {
        cfg.validate()?;
        Ok(Self { cfg, distance })
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn threshold(&self) -> f32 {
        self.cfg.threshold
    }

    /// Adjusts matching strictness between observations.
    pub fn set_threshold(&mut self, t: f32) -> Result<()> {
        validate_threshold(t)?;
        self.cfg.threshold = t;
        Ok(())
    }

    pub fn distance(&self) -> &dyn Distance {
        self.distance.as_ref()
    }

    /// Creates an empty store sized for this classifier.
    pub fn new_store(&self) -> ClusterStore {
        match ClusterStore::new(self.cfg.dim) {
            Ok(store) => store,
            // dim was validated at construction.
            Err(_) => unreachable!("validated dim is positive"),
        }
    }

    /// Assigns `obs` to a person, founds a new person with it, or leaves it
    /// unresolved.
    ///
    /// On error the store is left exactly as it was and `obs` is dropped.
    pub fn classify(&self, store: &mut ClusterStore, obs: Observation) -> Result<Decision> {
        if store.dim() != self.cfg.dim {
            return Err(FaceClusterError::DimensionMismatch {
                expected: self.cfg.dim,
                got: store.dim(),
            });
        }
        store.check_dim(&obs.embedding)?;
        if !obs.timestamp.is_finite() {
            return Err(FaceClusterError::InvalidObservation(format!(
                "{}: timestamp {} is not finite",
                obs.label, obs.timestamp
            )));
        }

        let persons = store.persons().iter().map(|p| p.representative());
        if let Some((i, d)) = self.nearest(&obs.embedding, persons)? {
            if d < self.cfg.threshold {
                let id = store.persons()[i].id();
                debug!(label = %obs.label, person = %id, distance = d, "matched");
                store.append_to(id, obs)?;
                return Ok(Decision::Matched(id));
            }
        }

        let unresolved = store.unresolved().iter().map(|o| &o.embedding);
        match self.nearest(&obs.embedding, unresolved)? {
            Some((i, d)) if d < self.cfg.threshold => {
                let label = obs.label.clone();
                let id = store.promote(i, obs)?;
                debug!(label = %label, person = %id, distance = d, "created");
                Ok(Decision::Created(id))
            }
            nearest => {
                debug!(
                    label = %obs.label,
                    nearest = nearest.map(|(_, d)| d),
                    "deferred"
                );
                store.push_unresolved(obs)?;
                Ok(Decision::Deferred)
            }
        }
    }

    /// Returns the index and distance of the closest candidate. Ties keep
    /// the earliest candidate.
    fn nearest<'a>(
        &self,
        query: &Embedding,
        candidates: impl Iterator<Item = &'a Embedding>,
    ) -> Result<Option<(usize, f32)>> {
        let mut best: Option<(usize, f32)> = None;
        for (i, c) in candidates.enumerate() {
            let d = self.distance.distance(query.as_slice(), c.as_slice())?;
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((i, d));
            }
        }
        Ok(best)
    }
}
