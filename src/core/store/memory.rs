//! In-memory secret store.
//!
//! Holds documents in a map behind a mutex. Used by tests and by callers
//! that fetch and persist payloads themselves.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;

use super::{Fetched, SecretStore};
use crate::core::types::Version;
use crate::error::{Result, StoreError};

#[derive(Debug, Clone, Default)]
struct Document {
    version: Version,
    data: IndexMap<String, String>,
}

#[derive(Debug, Default)]
struct State {
    documents: HashMap<String, Document>,
    denied: HashSet<String>,
    writes: usize,
}

/// Thread-safe in-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`MemoryStore::insert`].
    pub fn with_secret(self, path: &str, storage_key: &str, payload: &str) -> Self {
        self.insert(path, storage_key, payload);
        self
    }

    /// Store a payload directly, bumping the document version.
    pub fn insert(&self, path: &str, storage_key: &str, payload: &str) -> Version {
        let mut state = self.lock();
        let doc = state.documents.entry(path.to_string()).or_default();
        doc.data.insert(storage_key.to_string(), payload.to_string());
        doc.version += 1;
        doc.version
    }

    /// Current payload, bypassing access checks.
    pub fn get(&self, path: &str, storage_key: &str) -> Option<String> {
        self.lock()
            .documents
            .get(path)
            .and_then(|doc| doc.data.get(storage_key).cloned())
    }

    /// Current document version.
    pub fn version(&self, path: &str) -> Option<Version> {
        self.lock().documents.get(path).map(|doc| doc.version)
    }

    /// Make every fetch and write of `path` fail with `AccessDenied`.
    pub fn deny(&self, path: &str) {
        self.lock().denied.insert(path.to_string());
    }

    /// Number of successful writes.
    pub fn writes(&self) -> usize {
        self.lock().writes
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SecretStore for MemoryStore {
    fn fetch(&self, path: &str, storage_key: &str) -> Result<Fetched> {
        let state = self.lock();
        if state.denied.contains(path) {
            return Err(StoreError::AccessDenied(path.to_string()).into());
        }

        state
            .documents
            .get(path)
            .and_then(|doc| {
                doc.data
                    .get(storage_key)
                    .map(|payload| Fetched::new(payload.clone(), doc.version))
            })
            .ok_or_else(|| {
                StoreError::NotFound {
                    path: path.to_string(),
                    storage_key: storage_key.to_string(),
                }
                .into()
            })
    }

    fn write(&self, path: &str, storage_key: &str, payload: &str, cas: Version) -> Result<Version> {
        let mut state = self.lock();
        if state.denied.contains(path) {
            return Err(StoreError::AccessDenied(path.to_string()).into());
        }

        let doc = state.documents.entry(path.to_string()).or_default();
        if doc.version != cas {
            return Err(StoreError::Conflict {
                path: path.to_string(),
                expected: cas,
                actual: doc.version,
            }
            .into());
        }

        doc.data.insert(storage_key.to_string(), payload.to_string());
        doc.version += 1;
        let version = doc.version;
        state.writes += 1;
        Ok(version)
    }
}
