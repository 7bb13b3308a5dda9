use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::{EnumerableStore, KvStore};
use crate::value::StoredValue;

const STATE_FILE_VERSION: u32 = 1;

/// On-disk layout of a [`JsonFileStore`].
#[derive(Serialize, Deserialize)]
struct StateFile {
    version: u32,
    entries: BTreeMap<String, StoredValue>,
}

/// Key-value store persisted as a single JSON document.
///
/// The whole document is loaded on [`JsonFileStore::open`] and rewritten on
/// every `set_raw`: the new contents go to a temporary file in the same
/// directory, are synced, and then atomically renamed over the old file. A
/// crash therefore leaves either the previous or the new document, never a
/// torn one. Meant for a local single-process host, not for throughput.
pub struct JsonFileStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, StoredValue>>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store; the file
    /// is created on the first write.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let raw = fs::read(&path)?;
            let file: StateFile = serde_json::from_slice(&raw)
                .map_err(|e| StoreError::Serialization(format!("{}: {e}", path.display())))?;
            if file.version != STATE_FILE_VERSION {
                return Err(StoreError::Serialization(format!(
                    "{}: unsupported state file version {}",
                    path.display(),
                    file.version
                )));
            }
            debug!(path = %path.display(), keys = file.entries.len(), "loaded state file");
            file.entries
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn persist(&self, entries: &BTreeMap<String, StoredValue>) -> StoreResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let document = StateFile {
            version: STATE_FILE_VERSION,
            entries: entries.clone(),
        };
        let bytes = serde_json::to_vec_pretty(&document)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }
}

impl KvStore for JsonFileStore {
    fn get_raw(&self, key: &str) -> StoreResult<Option<StoredValue>> {
        let map = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(map.get(key).cloned())
    }

    fn set_raw(&self, key: &str, value: StoredValue) -> StoreResult<()> {
        let mut map = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        let previous = map.insert(key.to_string(), value);
        if let Err(e) = self.persist(&map) {
            // Keep memory in step with what is on disk.
            match previous {
                Some(old) => map.insert(key.to_string(), old),
                None => map.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }
}

impl EnumerableStore for JsonFileStore {
    fn entries(&self) -> StoreResult<BTreeMap<String, StoredValue>> {
        let map = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(map.clone())
    }
}

impl std::fmt::Debug for JsonFileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonFileStore")
            .field("path", &self.path)
            .field("key_count", &self.len())
            .finish()
    }
}
