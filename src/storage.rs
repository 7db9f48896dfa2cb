//! Persistence of the contact store as a single JSON document.
//!
//! The document maps each bucket letter to its contacts, e.g.
//! `{"j": [{"id": "1700000000000", "name": "John", "job": "Pilot", "phone": "+1 234-567-89-01"}]}`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::contact::{Contact, Letter};
use crate::store::ContactStore;

pub trait Persistence {
    /// Load the stored contacts. Missing or unreadable data yields an empty
    /// store rather than an error.
    fn load(&self) -> ContactStore;

    fn save(&self, store: &ContactStore) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Option<ContactStore>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        if raw.trim().is_empty() {
            return Ok(None);
        }
        let malformed = || format!("{} is not a valid contact list", self.path.display());
        let buckets: BTreeMap<Letter, Vec<Contact>> =
            serde_json::from_str(&raw).with_context(malformed)?;
        let store = ContactStore::from_buckets(buckets).with_context(malformed)?;
        Ok(Some(store))
    }
}

impl Persistence for JsonFileStorage {
    fn load(&self) -> ContactStore {
        match self.read() {
            Ok(Some(store)) => {
                if !store.is_empty() {
                    tracing::debug!("loaded {} contacts from {}", store.len(), self.path.display());
                }
                store
            }
            Ok(None) => ContactStore::default(),
            Err(err) => {
                tracing::warn!("{:#}; starting with an empty contact list", err);
                ContactStore::default()
            }
        }
    }

    fn save(&self, store: &ContactStore) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(store)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;

        tracing::debug!("saved {} contacts to {}", store.len(), self.path.display());
        Ok(())
    }
}

/// In-memory persistence for tests; remembers how often it was saved.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStorage {
    pub stored: std::cell::RefCell<Option<ContactStore>>,
    pub saves: std::cell::Cell<usize>,
}

#[cfg(test)]
impl Persistence for MemoryStorage {
    fn load(&self) -> ContactStore {
        self.stored.borrow().clone().unwrap_or_default()
    }

    fn save(&self, store: &ContactStore) -> Result<()> {
        *self.stored.borrow_mut() = Some(store.clone());
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
