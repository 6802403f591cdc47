//! License key store
//!
//! A flat JSON file holding the registration license keys the user has
//! saved, with auto-incrementing integer ids. Consumed by the presentation
//! layer only; the controller never touches it. Write failures degrade to a
//! `false` success flag after logging, so the caller never sees an error
//! object.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One saved license key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredKey {
    pub id: u32,
    pub key_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct KeyFile {
    next_id: u32,
    keys: Vec<StoredKey>,
}

impl Default for KeyFile {
    fn default() -> Self {
        Self {
            next_id: 1,
            keys: Vec::new(),
        }
    }
}

/// License key store backed by a JSON file
pub struct KeyStore {
    path: PathBuf,
    file: Mutex<KeyFile>,
}

impl KeyStore {
    /// Open the store, loading the existing file if present
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let file = load_key_file(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Add a key; returns whether it was persisted
    pub fn add(&self, key_id: &str) -> bool {
        let mut file = self.file.lock();
        let key = StoredKey {
            id: file.next_id,
            key_id: key_id.to_string(),
        };
        file.next_id += 1;
        file.keys.push(key);
        match save_key_file(&self.path, &file) {
            Ok(()) => {
                info!(key_id, "added license key");
                true
            }
            Err(e) => {
                warn!(key_id, "failed to persist license key: {}", e);
                file.keys.pop();
                file.next_id -= 1;
                false
            }
        }
    }

    /// All saved keys in insertion order
    pub fn list(&self) -> Vec<StoredKey> {
        self.file.lock().keys.clone()
    }

    /// Delete a key by id; returns whether a key was removed
    pub fn delete(&self, id: u32) -> bool {
        let mut file = self.file.lock();
        let previous = file.keys.clone();
        file.keys.retain(|key| key.id != id);
        if file.keys.len() == previous.len() {
            return false;
        }
        match save_key_file(&self.path, &file) {
            Ok(()) => {
                info!(id, "deleted license key");
                true
            }
            Err(e) => {
                warn!(id, "failed to persist key deletion: {}", e);
                file.keys = previous;
                false
            }
        }
    }
}

fn load_key_file(path: &Path) -> Result<KeyFile, StorageError> {
    if !path.exists() {
        return Ok(KeyFile::default());
    }
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn save_key_file(path: &Path, file: &KeyFile) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let payload = serde_json::to_string_pretty(file)?;
    fs::write(path, payload)?;
    Ok(())
}
