//! Snapshot persistence: the full `{projects, tasks}` state as JSON.
//!
//! The store calls [`SnapshotStore::save`] after every successful mutation and
//! [`SnapshotStore::load`] once at start-up.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::error::PersistError;
use crate::project::Project;
use crate::task::Task;

/// Full serialized state of projects and tasks at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(s: &str) -> Result<Self, PersistError> {
        Ok(serde_json::from_str(s)?)
    }
}

/// Durable home for the latest snapshot.
pub trait SnapshotStore: Send {
    /// Last saved snapshot, or `None` when nothing has been saved yet.
    fn load(&self) -> Result<Option<Snapshot>, PersistError>;

    /// Replace any previous snapshot with `snapshot`.
    fn save(&self, snapshot: &Snapshot) -> Result<(), PersistError>;
}

/// Snapshot kept in a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Option<Snapshot>, PersistError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let mut buf = String::new();
        File::open(&self.path)?.read_to_string(&mut buf)?;
        Snapshot::from_json(&buf).map(Some)
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), PersistError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        // Atomic-ish write via temp + rename.
        let tmp = self.path.with_extension("json.tmp");
        let data = snapshot.to_json()?;
        let mut f = File::create(&tmp)?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, &self.path)?;
        Ok(())
    }
}

/// In-process snapshot slot. Clones share the same slot, so a test can keep
/// one handle while the store owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemorySlot>>,
}

#[derive(Debug, Default)]
struct MemorySlot {
    json: Option<String>,
    saves: usize,
    offline: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated with `snapshot`, as if it had been saved earlier.
    pub fn with_snapshot(snapshot: &Snapshot) -> Result<Self, PersistError> {
        let store = Self::default();
        store.slot()?.json = Some(snapshot.to_json()?);
        Ok(store)
    }

    /// Make every subsequent save fail, simulating unavailable storage.
    pub fn set_offline(&self, offline: bool) {
        if let Ok(mut slot) = self.inner.lock() {
            slot.offline = offline;
        }
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.inner.lock().map(|s| s.saves).unwrap_or(0)
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, MemorySlot>, PersistError> {
        self.inner
            .lock()
            .map_err(|_| PersistError::Unavailable("memory slot poisoned".into()))
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<Snapshot>, PersistError> {
        let slot = self.slot()?;
        slot.json.as_deref().map(Snapshot::from_json).transpose()
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), PersistError> {
        let mut slot = self.slot()?;
        if slot.offline {
            return Err(PersistError::Unavailable("storage offline".into()));
        }
        slot.json = Some(snapshot.to_json()?);
        slot.saves += 1;
        Ok(())
    }
}
