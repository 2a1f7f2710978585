//! Durable local storage backed by a JSON file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use anyhow::Context;
use thiserror::Error;

use tenantdesk_auth::KeyValueStorage;

const STORAGE_FILE: &str = "local_storage.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("could not determine a data directory for local storage")]
    NoDataDir,
}

/// File-backed [`KeyValueStorage`] standing in for browser local storage.
///
/// The in-memory map is authoritative for this process; every write is
/// flushed through to disk. IO failures are logged and never surfaced.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl FileStorage {
    /// Open (or lazily create) the storage file at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match load(&path) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!("starting with empty local storage: {err:?}");
                HashMap::new()
            }
        };

        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    /// Open the storage file inside `dir`, or the platform data dir.
    pub fn open_in(dir: Option<&Path>) -> Result<Self, StorageError> {
        let dir = match dir {
            Some(dir) => dir.to_path_buf(),
            None => default_storage_dir().ok_or(StorageError::NoDataDir)?,
        };
        Ok(Self::open(dir.join(STORAGE_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &HashMap<String, String>) {
        if let Err(err) = write(&self.path, entries) {
            tracing::error!("failed to persist local storage: {err:?}");
        }
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        let map = self.entries.read().ok()?;
        map.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut map) = self.entries.write() {
            map.insert(key.to_string(), value.to_string());
            self.flush(&map);
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut map) = self.entries.write() {
            if map.remove(key).is_some() {
                self.flush(&map);
            }
        }
    }

    fn remove_many(&self, keys: &[&str]) {
        if let Ok(mut map) = self.entries.write() {
            let before = map.len();
            for key in keys {
                map.remove(*key);
            }
            if map.len() != before {
                self.flush(&map);
            }
        }
    }
}

/// Platform data directory for the client (e.g. `~/.local/share/tenantdesk`).
pub fn default_storage_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("tenantdesk"))
}

fn load(path: &Path) -> anyhow::Result<HashMap<String, String>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read local storage at {path:?}"))?;
    serde_json::from_str(&raw).with_context(|| format!("corrupt local storage at {path:?}"))
}

fn write(path: &Path, entries: &HashMap<String, String>) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create storage directory at {parent:?}"))?;
    }

    let json = serde_json::to_vec_pretty(entries).context("failed to encode local storage")?;

    // Write then rename so a crash never leaves a half-written file.
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).with_context(|| format!("failed to write {tmp:?}"))?;
    std::fs::rename(&tmp, path).with_context(|| format!("failed to replace {path:?}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn scratch_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("tenantdesk-{name}-{}-{nanos}", std::process::id()))
    }

    #[test]
    fn values_survive_reopen() {
        let dir = scratch_dir("reopen");
        let storage = FileStorage::open_in(Some(&dir)).unwrap();
        storage.set("auth_token", "abc");
        storage.set("other", "1");
        storage.remove("other");

        let reopened = FileStorage::open_in(Some(&dir)).unwrap();
        assert_eq!(reopened.get("auth_token").as_deref(), Some("abc"));
        assert_eq!(reopened.get("other"), None);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = scratch_dir("corrupt");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(STORAGE_FILE), "{not json").unwrap();

        let storage = FileStorage::open_in(Some(&dir)).unwrap();
        assert_eq!(storage.get("auth_token"), None);

        storage.set("auth_token", "fresh");
        let reopened = FileStorage::open_in(Some(&dir)).unwrap();
        assert_eq!(reopened.get("auth_token").as_deref(), Some("fresh"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
