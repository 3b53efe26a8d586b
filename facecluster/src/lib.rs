//! Online single-pass clustering of face embeddings into persons.
//!
//! Faces arrive one at a time, in detection order. Each is matched against
//! the persons seen so far, paired with an earlier unmatched face to found a
//! new person, or held back as unresolved until a later face matches it.
//! The number of distinct people is never known in advance.
//!
//! # Usage
//!
//! ```
//! use facecluster::{Classifier, Config, Decision, Embedding, Observation};
//!
//! let classifier = Classifier::new(Config { dim: 2, threshold: 0.5 }).unwrap();
//! let mut store = classifier.new_store();
//!
//! let face = |t: f64, v: [f32; 2]| {
//!     Observation::new(t, format!("t{t}"), Embedding::new(v.to_vec()).unwrap())
//! };
//!
//! assert_eq!(classifier.classify(&mut store, face(0.0, [0.0, 0.0])).unwrap(), Decision::Deferred);
//! let created = classifier.classify(&mut store, face(1.0, [0.1, 0.0])).unwrap();
//! assert!(matches!(created, Decision::Created(_)));
//! assert_eq!(store.to_string(), "1 persons, 0 unknown faces");
//! ```
//!
//! # Design
//!
//! A person is only created from two similar faces, never from one. Its
//! representative embedding is its first face's and never moves, so each
//! comparison against a person costs one distance evaluation and results
//! do not drift as the person grows. All state lives in a [`ClusterStore`]
//! owned by the caller; [`SnapshotStore`] carries it between runs.

mod classifier;
mod distance;
mod error;
pub mod ingest;
mod observation;
mod persist;
mod person;
pub mod region;
mod store;

pub use classifier::{Classifier, Config, Decision};
pub use distance::{Cosine, Distance, Euclidean, euclidean};
pub use error::{FaceClusterError, Result};
pub use ingest::{Detection, EmbeddingProvider, FrameInfo, Ingest, IngestStats, Sampler};
pub use observation::{Embedding, Observation};
pub use persist::{FileStore, MemoryStore, SNAPSHOT_FILE, SnapshotStore, load_store};
pub use person::{Person, PersonId};
pub use region::{CropPlan, FaceBox, Padding, Rect};
pub use store::{ClusterStore, DistanceMatrix, PersonSummary, Report, SNAPSHOT_VERSION, Snapshot};
