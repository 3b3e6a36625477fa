//! Key-value persistence port.
//!
//! The engine stores four JSON blobs: the regular location list, the boss
//! ladder, the ids of consumed locations and the progress ledger. Each is
//! loaded once at session start and overwritten wholesale on every
//! mutation. There are no partial updates.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::location::{BossLocation, Location, LocationId};
use crate::progress::Progress;

/// Storage key of the cached regular locations.
pub const LOCATIONS_KEY: &str = "gameLocations";
/// Storage key of the ranked boss ladder.
pub const BOSS_LOCATIONS_KEY: &str = "bossLocations";
/// Storage key of the ids of locations already entered.
pub const CONSUMED_LOCATIONS_KEY: &str = "consumedLocations";
/// Storage key of the progress ledger.
pub const PROGRESS_KEY: &str = "gameProgress";

/// Failures raised by persistence backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The key is empty or could escape the storage directory.
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
    /// The backend could not be read or written.
    #[error("storage I/O failed for {key}: {source}")]
    Io {
        /// Key, or directory, being accessed.
        key: String,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// A value could not be serialised.
    #[error("failed to encode {key}: {source}")]
    Encode {
        /// Key being written.
        key: String,
        /// Underlying failure.
        #[source]
        source: serde_json::Error,
    },
    /// A stored blob is not valid for its key.
    #[error("failed to decode {key}: {source}")]
    Decode {
        /// Key being read.
        key: String,
        /// Underlying failure.
        #[source]
        source: serde_json::Error,
    },
}

/// String blob store addressed by key.
pub trait KeyValueStore {
    /// Reads the blob stored under `key`, if any.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replaces the blob stored under `key`.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the backend cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Deletes the blob stored under `key`. Missing keys are not an error.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the backend cannot be written.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// Volatile store used by tests and short-lived sessions.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Store keeping one `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Opens (and creates when needed) the storage directory.
    ///
    /// # Errors
    /// Returns [`StoreError::Io`] when the directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = root.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            key: dir.display().to_string(),
            source,
        })?;
        Ok(Self { root: dir })
    }

    /// The storage directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_owned()));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                key: key.to_owned(),
                source,
            }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        // Write-then-rename so readers never observe a half-written blob.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)
            .and_then(|()| fs::rename(&tmp, &path))
            .map_err(|source| StoreError::Io {
                key: key.to_owned(),
                source,
            })
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io {
                key: key.to_owned(),
                source,
            }),
        }
    }
}

/// Typed access to the engine's blobs on top of a [`KeyValueStore`].
#[derive(Debug)]
pub struct Persistence<S> {
    store: S,
}

impl<S: KeyValueStore> Persistence<S> {
    /// Wraps `store`.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Unwraps the underlying store.
    #[must_use]
    pub fn into_inner(self) -> S {
        self.store
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let Some(blob) = self.store.get(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&blob)
            .map(Some)
            .map_err(|source| StoreError::Decode {
                key: key.to_owned(),
                source,
            })
    }

    fn save<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        let blob = serde_json::to_string(value).map_err(|source| StoreError::Encode {
            key: key.to_owned(),
            source,
        })?;
        debug!("persisting {key} ({} bytes)", blob.len());
        self.store.set(key, &blob)
    }

    /// # Errors
    /// Returns [`StoreError`] when the blob cannot be read or decoded.
    pub fn load_progress(&self) -> Result<Option<Progress>, StoreError> {
        self.load(PROGRESS_KEY)
    }

    /// # Errors
    /// Returns [`StoreError`] when the blob cannot be encoded or written.
    pub fn save_progress(&mut self, progress: &Progress) -> Result<(), StoreError> {
        self.save(PROGRESS_KEY, progress)
    }

    /// # Errors
    /// Returns [`StoreError`] when the key cannot be removed.
    pub fn clear_progress(&mut self) -> Result<(), StoreError> {
        self.store.remove(PROGRESS_KEY)
    }

    /// # Errors
    /// Returns [`StoreError`] when the blob cannot be read or decoded.
    pub fn load_locations(&self) -> Result<Option<Vec<Location>>, StoreError> {
        self.load(LOCATIONS_KEY)
    }

    /// # Errors
    /// Returns [`StoreError`] when the blob cannot be encoded or written.
    pub fn save_locations(&mut self, locations: &[Location]) -> Result<(), StoreError> {
        self.save(LOCATIONS_KEY, locations)
    }

    /// # Errors
    /// Returns [`StoreError`] when the blob cannot be read or decoded.
    pub fn load_boss_locations(&self) -> Result<Option<Vec<BossLocation>>, StoreError> {
        self.load(BOSS_LOCATIONS_KEY)
    }

    /// # Errors
    /// Returns [`StoreError`] when the blob cannot be encoded or written.
    pub fn save_boss_locations(&mut self, bosses: &[BossLocation]) -> Result<(), StoreError> {
        self.save(BOSS_LOCATIONS_KEY, bosses)
    }

    /// # Errors
    /// Returns [`StoreError`] when the blob cannot be read or decoded.
    pub fn load_consumed_locations(&self) -> Result<Option<Vec<LocationId>>, StoreError> {
        self.load(CONSUMED_LOCATIONS_KEY)
    }

    /// # Errors
    /// Returns [`StoreError`] when the blob cannot be encoded or written.
    pub fn save_consumed_locations(&mut self, ids: &[LocationId]) -> Result<(), StoreError> {
        self.save(CONSUMED_LOCATIONS_KEY, ids)
    }

    /// Drops both cached location lists and the consumed ids.
    ///
    /// # Errors
    /// Returns [`StoreError`] when any key cannot be removed.
    pub fn clear_locations(&mut self) -> Result<(), StoreError> {
        self.store.remove(LOCATIONS_KEY)?;
        self.store.remove(BOSS_LOCATIONS_KEY)?;
        self.store.remove(CONSUMED_LOCATIONS_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn missing_blob_loads_as_none() {
        let persistence = Persistence::new(MemoryStore::new());
        assert!(persistence
            .load_progress()
            .expect("memory store never fails")
            .is_none());
    }

    #[rstest]
    fn progress_survives_a_save() {
        let mut persistence = Persistence::new(MemoryStore::new());
        let mut progress = Progress::default();
        progress.record_victory(false);
        persistence
            .save_progress(&progress)
            .expect("memory store never fails");
        let loaded = persistence
            .load_progress()
            .expect("memory store never fails");
        assert_eq!(loaded, Some(progress));
    }

    #[rstest]
    fn corrupt_blob_reports_decode_error() {
        let mut store = MemoryStore::new();
        store
            .set(PROGRESS_KEY, "{not json")
            .expect("memory store never fails");
        let persistence = Persistence::new(store);
        let err = persistence
            .load_progress()
            .expect_err("corrupt progress must not decode");
        assert!(matches!(err, StoreError::Decode { ref key, .. } if key == PROGRESS_KEY));
    }

    #[rstest]
    #[case::slash("../escape")]
    #[case::empty("")]
    #[case::dot("game.progress")]
    fn file_store_rejects_path_like_keys(#[case] key: &str) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::open(dir.path()).expect("open store");
        assert!(matches!(store.get(key), Err(StoreError::InvalidKey(_))));
    }
}
