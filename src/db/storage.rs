// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Two-tier key-value storage with typed record operations.
//!
//! Provides:
//! - Raw string get/set/remove per tier
//! - Session records (either tier)
//! - Metrics records (durable tier only)

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::db::{keys, StorageTier};
use crate::models::{MetricsRecord, SessionRecord, StoredMetrics};

/// A single tier's backing store.
enum Backend {
    /// One `<key>.json` file per key.
    Directory(PathBuf),
    /// Process-lifetime map.
    Memory(DashMap<String, String>),
}

impl Backend {
    fn path_for(dir: &Path, key: &str) -> PathBuf {
        dir.join(format!("{}.json", key))
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self {
            Backend::Directory(dir) => match fs::read_to_string(Self::path_for(dir, key)) {
                Ok(contents) => Ok(Some(contents)),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                Err(e) => Err(StorageError::io(key, e)),
            },
            Backend::Memory(map) => Ok(map.get(key).map(|v| v.value().clone())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        match self {
            Backend::Directory(dir) => {
                // Readers must never observe a partial record.
                let mut tmp = NamedTempFile::new_in(dir).map_err(|e| StorageError::io(key, e))?;
                tmp.write_all(value.as_bytes())
                    .map_err(|e| StorageError::io(key, e))?;
                tmp.persist(Self::path_for(dir, key))
                    .map_err(|e| StorageError::io(key, e.error))?;
                Ok(())
            }
            Backend::Memory(map) => {
                map.insert(key.to_string(), value.to_string());
                Ok(())
            }
        }
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match self {
            Backend::Directory(dir) => match fs::remove_file(Self::path_for(dir, key)) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(StorageError::io(key, e)),
            },
            Backend::Memory(map) => {
                map.remove(key);
                Ok(())
            }
        }
    }

    fn clear(&self) -> Result<(), StorageError> {
        match self {
            Backend::Directory(dir) => {
                let entries = fs::read_dir(dir).map_err(|e| StorageError::io("*", e))?;
                for entry in entries {
                    let path = entry.map_err(|e| StorageError::io("*", e))?.path();
                    if path.extension().is_some_and(|ext| ext == "json") {
                        fs::remove_file(&path).map_err(|e| StorageError::io("*", e))?;
                    }
                }
                Ok(())
            }
            Backend::Memory(map) => {
                map.clear();
                Ok(())
            }
        }
    }
}

/// Durable + ephemeral storage shared by the session and metric stores.
pub struct Storage {
    durable: Backend,
    ephemeral: Backend,
}

impl Storage {
    /// Open storage with the durable tier rooted at `dir`.
    ///
    /// The ephemeral tier lives in memory for the lifetime of the process.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| StorageError::io("*", e))?;

        tracing::info!(path = %dir.display(), "Opened durable storage");

        Ok(Self {
            durable: Backend::Directory(dir),
            ephemeral: Backend::Memory(DashMap::new()),
        })
    }

    /// Create storage with both tiers in memory (tests, offline mode).
    pub fn in_memory() -> Self {
        Self {
            durable: Backend::Memory(DashMap::new()),
            ephemeral: Backend::Memory(DashMap::new()),
        }
    }

    fn backend(&self, tier: StorageTier) -> &Backend {
        match tier {
            StorageTier::Durable => &self.durable,
            StorageTier::Ephemeral => &self.ephemeral,
        }
    }

    // ─── Raw Operations ──────────────────────────────────────────

    pub fn get_raw(&self, tier: StorageTier, key: &str) -> Result<Option<String>, StorageError> {
        self.backend(tier).get(key)
    }

    pub fn set_raw(&self, tier: StorageTier, key: &str, value: &str) -> Result<(), StorageError> {
        self.backend(tier).set(key, value)
    }

    pub fn remove(&self, tier: StorageTier, key: &str) -> Result<(), StorageError> {
        self.backend(tier).remove(key)
    }

    /// Drop every record in a tier. Clearing `Ephemeral` models the end of
    /// a client session.
    pub fn clear_tier(&self, tier: StorageTier) -> Result<(), StorageError> {
        tracing::debug!(?tier, "Clearing storage tier");
        self.backend(tier).clear()
    }

    fn read_json<T: DeserializeOwned>(
        &self,
        tier: StorageTier,
        key: &str,
    ) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.get_raw(tier, key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StorageError::Corrupt {
                key: key.to_string(),
                source,
            })
    }

    fn write_json<T: Serialize>(
        &self,
        tier: StorageTier,
        key: &str,
        value: &T,
    ) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value).map_err(|source| StorageError::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.set_raw(tier, key, &raw)
    }

    // ─── Session Operations ──────────────────────────────────────

    /// Read the session record from `tier`.
    ///
    /// Unparseable data is reported as `StorageError::Corrupt`.
    pub fn read_session(&self, tier: StorageTier) -> Result<Option<SessionRecord>, StorageError> {
        self.read_json(tier, keys::SESSION)
    }

    pub fn write_session(
        &self,
        tier: StorageTier,
        record: &SessionRecord,
    ) -> Result<(), StorageError> {
        self.write_json(tier, keys::SESSION, record)
    }

    /// Remove the session record from both tiers.
    ///
    /// Both removals are attempted; the first failure is returned.
    pub fn clear_session(&self) -> Result<(), StorageError> {
        let durable = self.remove(StorageTier::Durable, keys::SESSION);
        let ephemeral = self.remove(StorageTier::Ephemeral, keys::SESSION);
        durable.and(ephemeral)
    }

    // ─── Metrics Operations ──────────────────────────────────────

    pub fn read_metrics(&self) -> Result<Option<StoredMetrics>, StorageError> {
        self.read_json(StorageTier::Durable, keys::METRICS)
    }

    pub fn write_metrics(&self, record: &MetricsRecord) -> Result<(), StorageError> {
        self.write_json(StorageTier::Durable, keys::METRICS, record)
    }
}

/// Errors from storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error for {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Corrupt record at {key}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    fn io(key: &str, source: std::io::Error) -> Self {
        StorageError::Io {
            key: key.to_string(),
            source,
        }
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, StorageError::Corrupt { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers_are_independent() {
        let storage = Storage::in_memory();
        storage
            .set_raw(StorageTier::Durable, "k", "durable")
            .unwrap();

        assert_eq!(
            storage.get_raw(StorageTier::Durable, "k").unwrap().as_deref(),
            Some("durable")
        );
        assert!(storage.get_raw(StorageTier::Ephemeral, "k").unwrap().is_none());
    }

    #[test]
    fn test_corrupt_session_is_reported() {
        let storage = Storage::in_memory();
        storage
            .set_raw(StorageTier::Durable, keys::SESSION, "{not json")
            .unwrap();

        let err = storage.read_session(StorageTier::Durable).unwrap_err();
        assert!(err.is_corrupt());
    }

    #[test]
    fn test_directory_backend_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();

        storage
            .set_raw(StorageTier::Durable, keys::METRICS, "{}")
            .unwrap();
        assert!(dir.path().join("nutrition_data.json").exists());

        // A second handle on the same directory sees the record.
        let reopened = Storage::open(dir.path()).unwrap();
        assert_eq!(
            reopened
                .get_raw(StorageTier::Durable, keys::METRICS)
                .unwrap()
                .as_deref(),
            Some("{}")
        );

        reopened.remove(StorageTier::Durable, keys::METRICS).unwrap();
        reopened.remove(StorageTier::Durable, keys::METRICS).unwrap();
        assert!(!dir.path().join("nutrition_data.json").exists());
    }

    #[test]
    fn test_shared_directory_concurrent_writes() {
        let dir = tempfile::tempdir().unwrap();
        let handles: Vec<_> = (0..2)
            .map(|_| std::sync::Arc::new(Storage::open(dir.path()).unwrap()))
            .collect();

        let writers: Vec<_> = handles
            .iter()
            .enumerate()
            .map(|(n, storage)| {
                let storage = storage.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        let value = format!("{{\"writer\":{},\"i\":{}}}", n, i);
                        storage
                            .set_raw(StorageTier::Durable, keys::METRICS, &value)
                            .unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let raw = handles[0]
            .get_raw(StorageTier::Durable, keys::METRICS)
            .unwrap()
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["i"], 49);

        // Only the record itself is left behind.
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("nutrition_data.json")]);
    }

    #[test]
    fn test_clear_tier() {
        let storage = Storage::in_memory();
        storage
            .set_raw(StorageTier::Ephemeral, keys::SESSION, "x")
            .unwrap();
        storage.clear_tier(StorageTier::Ephemeral).unwrap();
        assert!(storage
            .get_raw(StorageTier::Ephemeral, keys::SESSION)
            .unwrap()
            .is_none());
    }
}
