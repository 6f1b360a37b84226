// SPDX-FileCopyrightText: The Stir-Shaken Developers
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The external key/value store: two logical families, `STIR_SHAKEN[url] = hash` and
//! `hash[{path,expiration}] = value`, the stable hash being SHA-1(url) as 40 hex characters.
//!
//! Grounded on `criticalup-core::state::State`'s persistence model (an in-memory representation
//! guarded against concurrent access, serialized to a single JSON file on every mutation), adapted
//! from `Rc<RefCell<_>>` to `RwLock` since sign/verify calls may run on distinct threads.

use crate::errors::StoreError;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

const CURRENT_FORMAT_VERSION: u32 = 1;

/// Hashes `url` down to the stable 40 hex character family name the key store uses as its second
/// family.
pub fn hash_url(url: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

pub trait KeyValueStore: Send + Sync {
    fn put(&self, family: &str, key: &str, value: &str) -> Result<(), StoreError>;
    fn get(&self, family: &str, key: &str) -> Result<Option<String>, StoreError>;
    fn del(&self, family: &str, key: &str) -> Result<(), StoreError>;
    fn del_tree(&self, family: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Repr {
    #[serde(default = "current_format_version")]
    version: u32,
    #[serde(default)]
    families: BTreeMap<String, BTreeMap<String, String>>,
}

fn current_format_version() -> u32 {
    CURRENT_FORMAT_VERSION
}

pub struct FileKeyValueStore {
    path: PathBuf,
    repr: RwLock<Repr>,
}

impl FileKeyValueStore {
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let repr = match std::fs::read(path) {
            Ok(contents) => serde_json::from_slice(&contents)
                .map_err(|err| StoreError::Corrupt(path.to_path_buf(), err))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Repr::default(),
            Err(err) => return Err(StoreError::Read(path.to_path_buf(), err)),
        };
        Ok(FileKeyValueStore {
            path: path.to_path_buf(),
            repr: RwLock::new(repr),
        })
    }

    fn persist(&self, repr: &Repr) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|err| StoreError::Create(parent.to_path_buf(), err))?;
        }
        let serialized = serde_json::to_vec_pretty(repr)
            .expect("key/value store serialization unexpectedly failed");
        std::fs::write(&self.path, serialized)
            .map_err(|err| StoreError::Write(self.path.clone(), err))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn put(&self, family: &str, key: &str, value: &str) -> Result<(), StoreError> {
        let mut repr = self.repr.write().unwrap();
        repr.families
            .entry(family.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        self.persist(&repr)
    }

    fn get(&self, family: &str, key: &str) -> Result<Option<String>, StoreError> {
        let repr = self.repr.read().unwrap();
        Ok(repr
            .families
            .get(family)
            .and_then(|tree| tree.get(key))
            .cloned())
    }

    fn del(&self, family: &str, key: &str) -> Result<(), StoreError> {
        let mut repr = self.repr.write().unwrap();
        if let Some(tree) = repr.families.get_mut(family) {
            tree.remove(key);
        }
        self.persist(&repr)
    }

    fn del_tree(&self, family: &str) -> Result<(), StoreError> {
        let mut repr = self.repr.write().unwrap();
        repr.families.remove(family);
        self.persist(&repr)
    }
}
