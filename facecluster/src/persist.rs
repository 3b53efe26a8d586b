use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::classifier::Classifier;
use crate::error::{FaceClusterError, Result};
use crate::store::{ClusterStore, Snapshot};

/// File name of the snapshot inside a [`FileStore`] directory.
pub const SNAPSHOT_FILE: &str = "persons.json";

/// Persists cluster state between runs.
///
/// Implementations must be safe for concurrent use.
/// Use [`MemoryStore`] for in-memory storage (testing/ephemeral).
pub trait SnapshotStore: Send + Sync {
    /// Returns the last saved snapshot, or `None` if nothing was saved yet.
    fn load(&self) -> Result<Option<Snapshot>>;

    /// Replaces the saved snapshot.
    fn save(&self, snap: &Snapshot) -> Result<()>;
}

/// In-memory [`SnapshotStore`] implementation.
/// Data is lost on restart. Suitable for testing or ephemeral use.
pub struct MemoryStore {
    inner: Mutex<Option<Snapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<Snapshot>> {
        let inner = self
            .inner
            .lock()
            .map_err(|e| FaceClusterError::Storage(e.to_string()))?;
        Ok(inner.clone())
    }

    fn save(&self, snap: &Snapshot) -> Result<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|e| FaceClusterError::Storage(e.to_string()))?;
        *inner = Some(snap.clone());
        Ok(())
    }
}

/// Stores the snapshot as pretty JSON in `<dir>/persons.json`.
///
/// Saves write a sibling temp file and rename it into place, so a crash
/// mid-save leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(SNAPSHOT_FILE)
    }
}

impl SnapshotStore for FileStore {
    fn load(&self) -> Result<Option<Snapshot>> {
        let path = self.path();
        let data = match fs::read(&path) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let snap: Snapshot = serde_json::from_slice(&data)?;
        debug!(path = %path.display(), persons = snap.persons.len(), "snapshot loaded");
        Ok(Some(snap))
    }

    fn save(&self, snap: &Snapshot) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path();
        let tmp = path.with_extension("json.tmp");
        let data = serde_json::to_vec_pretty(snap)?;
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &path)?;
        debug!(path = %path.display(), persons = snap.persons.len(), "snapshot saved");
        Ok(())
    }
}

/// Loads the persisted store for `classifier`, or an empty one if nothing
/// was saved yet.
pub fn load_store(store: &dyn SnapshotStore, classifier: &Classifier) -> Result<ClusterStore> {
    let Some(snap) = store.load()? else {
        return Ok(classifier.new_store());
    };
    let dim = classifier.config().dim;
    if snap.dim != dim {
        return Err(FaceClusterError::DimensionMismatch {
            expected: dim,
            got: snap.dim,
        });
    }
    ClusterStore::from_snapshot(snap)
}
