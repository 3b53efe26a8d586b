use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::distance::Distance;
use crate::error::{FaceClusterError, Result};
use crate::observation::{Embedding, Observation};
use crate::person::{Person, PersonId};

/// Current [`Snapshot`] format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Owns the resolved persons and the unresolved observations.
///
/// Every ingested observation lives in exactly one place: some person's
/// observation list or the unresolved list. Only the crate mutates the
/// store, through the matching policy in [`crate::Classifier`].
#[derive(Clone)]
pub struct ClusterStore {
    dim: usize,
    persons: Vec<Person>,
    unresolved: Vec<Observation>,
    next_id: u32,
}

/// Serializable form of a [`ClusterStore`], exchanged with a
/// [`crate::SnapshotStore`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub dim: usize,
    pub next_id: u32,
    pub persons: Vec<Person>,
    pub unresolved: Vec<Observation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

/// Pairwise representative-embedding distances between persons, in
/// identifier order.
#[derive(Debug, Clone, Serialize)]
pub struct DistanceMatrix {
    pub metric: &'static str,
    pub ids: Vec<PersonId>,
    pub distances: Vec<Vec<f32>>,
}

impl DistanceMatrix {
    pub fn get(&self, a: PersonId, b: PersonId) -> Option<f32> {
        let i = self.ids.iter().position(|&id| id == a)?;
        let j = self.ids.iter().position(|&id| id == b)?;
        Some(self.distances[i][j])
    }
}

/// Read-only summary of a store.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub dim: usize,
    pub persons: usize,
    pub unresolved: usize,
    pub observations: usize,
    pub members: Vec<PersonSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distances: Option<DistanceMatrix>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PersonSummary {
    pub id: String,
    pub observations: usize,
    pub first_seen: f64,
    pub last_seen: f64,
}

impl ClusterStore {
    /// Creates an empty store for embeddings of dimension `dim`.
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(FaceClusterError::InvalidConfig(
                "embedding dimension must be positive".into(),
            ));
        }
        Ok(Self {
            dim,
            persons: Vec::new(),
            unresolved: Vec::new(),
            next_id: 1,
        })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Persons in creation order.
    pub fn persons(&self) -> &[Person] {
        &self.persons
    }

    /// Persons in identifier order.
    pub fn persons_by_id(&self) -> Vec<&Person> {
        let mut v: Vec<&Person> = self.persons.iter().collect();
        v.sort_by_key(|p| p.id);
        v
    }

    pub fn person(&self, id: PersonId) -> Option<&Person> {
        self.persons.iter().find(|p| p.id == id)
    }

    /// Unresolved observations in insertion order.
    pub fn unresolved(&self) -> &[Observation] {
        &self.unresolved
    }

    pub fn person_count(&self) -> usize {
        self.persons.len()
    }

    pub fn unresolved_count(&self) -> usize {
        self.unresolved.len()
    }

    /// Total observations held, resolved or not.
    pub fn observation_count(&self) -> usize {
        self.persons.iter().map(Person::len).sum::<usize>() + self.unresolved.len()
    }

    /// `(id, observation count)` per person, in identifier order.
    pub fn person_sizes(&self) -> Vec<(PersonId, usize)> {
        self.persons_by_id()
            .into_iter()
            .map(|p| (p.id, p.len()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty() && self.unresolved.is_empty()
    }

    pub(crate) fn check_dim(&self, e: &Embedding) -> Result<()> {
        if e.dim() != self.dim {
            return Err(FaceClusterError::DimensionMismatch {
                expected: self.dim,
                got: e.dim(),
            });
        }
        Ok(())
    }

    pub(crate) fn push_unresolved(&mut self, obs: Observation) -> Result<()> {
        self.check_dim(&obs.embedding)?;
        self.unresolved.push(obs);
        Ok(())
    }

    pub(crate) fn append_to(&mut self, id: PersonId, obs: Observation) -> Result<()> {
        self.check_dim(&obs.embedding)?;
        let person = self
            .persons
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(FaceClusterError::PersonNotFound(id))?;
        person.observations.push(obs);
        Ok(())
    }

    /// Moves the unresolved observation at `index` and `obs` into a new
    /// person, in that order.
    ///
    /// Fails with `IdsExhausted`, leaving the store untouched, once every
    /// identifier has been handed out. Panics if `index` is out of range.
    pub(crate) fn promote(&mut self, index: usize, obs: Observation) -> Result<PersonId> {
        self.check_dim(&obs.embedding)?;
        let next = self
            .next_id
            .checked_add(1)
            .ok_or(FaceClusterError::IdsExhausted)?;
        let first = self.unresolved.remove(index);
        let id = PersonId(self.next_id);
        self.next_id = next;
        self.persons.push(Person::found(id, first, obs));
        Ok(id)
    }

    /// Computes the distance between every pair of person representatives.
    pub fn distance_matrix(&self, metric: &dyn Distance) -> Result<DistanceMatrix> {
        let persons = self.persons_by_id();
        let n = persons.len();
        let mut distances = vec![vec![0.0f32; n]; n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = metric.distance(
                    persons[i].representative().as_slice(),
                    persons[j].representative().as_slice(),
                )?;
                distances[i][j] = d;
                distances[j][i] = d;
            }
        }
        Ok(DistanceMatrix {
            metric: metric.name(),
            ids: persons.iter().map(|p| p.id).collect(),
            distances,
        })
    }

    pub fn report(&self) -> Report {
        Report {
            dim: self.dim,
            persons: self.person_count(),
            unresolved: self.unresolved_count(),
            observations: self.observation_count(),
            members: self
                .persons_by_id()
                .into_iter()
                .map(|p| PersonSummary {
                    id: p.id.to_string(),
                    observations: p.len(),
                    first_seen: p.first_seen(),
                    last_seen: p.last_seen(),
                })
                .collect(),
            distances: None,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            dim: self.dim,
            next_id: self.next_id,
            persons: self.persons.clone(),
            unresolved: self.unresolved.clone(),
            saved_at: None,
        }
    }

    /// Rebuilds a store from a snapshot, checking every store invariant.
    ///
    /// Persons are restored in identifier order, which is their creation
    /// order.
    pub fn from_snapshot(mut snap: Snapshot) -> Result<Self> {
        let corrupt = |msg: String| -> Result<Self> { Err(FaceClusterError::CorruptSnapshot(msg)) };

        if snap.version != SNAPSHOT_VERSION {
            return corrupt(format!("unsupported version {}", snap.version));
        }
        let mut store = match Self::new(snap.dim) {
            Ok(s) => s,
            Err(_) => return corrupt("dimension is 0".into()),
        };

        let mut seen = HashSet::new();
        for p in &snap.persons {
            if p.len() < 2 {
                return corrupt(format!("{} has {} observations", p.id, p.len()));
            }
            if !seen.insert(p.id) {
                return corrupt(format!("duplicate id {}", p.id));
            }
            if p.id.0 == 0 || p.id.0 >= snap.next_id {
                return corrupt(format!("{} is outside 1..{}", p.id, snap.next_id));
            }
        }
        let embeddings = snap
            .persons
            .iter()
            .flat_map(|p| p.observations.iter())
            .chain(snap.unresolved.iter())
            .map(|o| &o.embedding);
        for e in embeddings {
            if e.dim() != snap.dim {
                return corrupt(format!(
                    "embedding of dimension {} in a store of dimension {}",
                    e.dim(),
                    snap.dim
                ));
            }
        }

        snap.persons.sort_by_key(|p| p.id);
        store.persons = snap.persons;
        store.unresolved = snap.unresolved;
        store.next_id = snap.next_id;
        Ok(store)
    }
}

impl fmt::Display for ClusterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} persons, {} unknown faces",
            self.persons.len(),
            self.unresolved.len()
        )
    }
}

impl fmt::Debug for ClusterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterStore")
            .field("dim", &self.dim)
            .field("persons", &self.persons)
            .field("unresolved", &self.unresolved.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}
