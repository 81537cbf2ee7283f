//! Filesystem-backed secret store.
//!
//! Each secret path is one JSON document under the store root:
//!
//! ```text
//! <root>/kv/engineering/v1/airflow/helios.json
//! {
//!   "version": 3,
//!   "updated_at": "2026-01-01T00:00:00Z",
//!   "data": { "dotenv": "export X=\"1\"\n", "config": { "AWS_ACCESS_KEY": "..." } }
//! }
//! ```
//!
//! String values are handed out as-is. Structured values are handed out as
//! JSON text and written back structured.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{Fetched, SecretStore};
use crate::core::path;
use crate::core::types::Version;
use crate::error::{Result, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Document {
    version: Version,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    data: IndexMap<String, Stored>,
}

/// One storage key's value. Objects keep their key order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum Stored {
    Text(String),
    Object(IndexMap<String, Value>),
    Other(Value),
}

impl Stored {
    fn to_payload(&self, path: &str) -> Result<String> {
        match self {
            Stored::Text(s) => Ok(s.clone()),
            Stored::Object(map) => serde_json::to_string(map).map_err(|e| {
                StoreError::Corrupt {
                    path: path.to_string(),
                    reason: e.to_string(),
                }
                .into()
            }),
            Stored::Other(value) => Ok(value.to_string()),
        }
    }
}

impl Document {
    fn empty() -> Self {
        Self {
            version: 0,
            updated_at: Utc::now(),
            data: IndexMap::new(),
        }
    }
}

/// Store rooted at a local directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Document file for a secret path.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidPath` for empty paths and paths that
    /// would leave the store root.
    pub fn document_path(&self, secret_path: &str) -> Result<PathBuf> {
        let normalized = path::normalize(secret_path)
            .map_err(|_| StoreError::InvalidPath(secret_path.to_string()))?;

        if normalized.split('/').any(|s| s == "." || s == "..") {
            return Err(StoreError::InvalidPath(secret_path.to_string()).into());
        }

        Ok(self.root.join(format!("{}.json", normalized)))
    }

    fn read(&self, secret_path: &str) -> Result<Option<Document>> {
        let file = self.document_path(secret_path)?;
        let contents = match fs::read_to_string(&file) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(secret_path, e)),
        };

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| {
                StoreError::Corrupt {
                    path: secret_path.to_string(),
                    reason: e.to_string(),
                }
                .into()
            })
    }

    fn persist(&self, secret_path: &str, doc: &Document) -> Result<()> {
        let file = self.document_path(secret_path)?;
        if let Some(dir) = file.parent() {
            fs::create_dir_all(dir).map_err(|e| io_error(secret_path, e))?;
        }

        let contents = serde_json::to_string_pretty(doc).map_err(|e| StoreError::Corrupt {
            path: secret_path.to_string(),
            reason: e.to_string(),
        })?;

        // Write to a sibling temp file, then rename over the document
        let tmp = file.with_extension("json.tmp");
        fs::write(&tmp, format!("{}\n", contents)).map_err(|e| io_error(secret_path, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))
                .map_err(|e| io_error(secret_path, e))?;
        }

        fs::rename(&tmp, &file).map_err(|e| io_error(secret_path, e))?;
        Ok(())
    }
}

impl SecretStore for FileStore {
    fn fetch(&self, path: &str, storage_key: &str) -> Result<Fetched> {
        let not_found = || StoreError::NotFound {
            path: path.to_string(),
            storage_key: storage_key.to_string(),
        };

        let doc = self.read(path)?.ok_or_else(not_found)?;
        let payload = doc.data.get(storage_key).ok_or_else(not_found)?.to_payload(path)?;

        debug!(path, storage_key, version = doc.version, "fetched secret");
        Ok(Fetched::new(payload, doc.version))
    }

    fn write(&self, path: &str, storage_key: &str, payload: &str, cas: Version) -> Result<Version> {
        let mut doc = self.read(path)?.unwrap_or_else(Document::empty);

        if doc.version != cas {
            return Err(StoreError::Conflict {
                path: path.to_string(),
                expected: cas,
                actual: doc.version,
            }
            .into());
        }

        let value = match doc.data.get(storage_key) {
            Some(Stored::Object(_)) => serde_json::from_str(payload)
                .map(Stored::Object)
                .unwrap_or_else(|_| Stored::Text(payload.to_string())),
            _ => Stored::Text(payload.to_string()),
        };

        doc.data.insert(storage_key.to_string(), value);
        doc.version += 1;
        doc.updated_at = Utc::now();

        self.persist(path, &doc)?;
        debug!(path, storage_key, version = doc.version, "wrote secret");
        Ok(doc.version)
    }
}

fn io_error(path: &str, err: io::Error) -> crate::error::Error {
    match err.kind() {
        io::ErrorKind::PermissionDenied => StoreError::AccessDenied(path.to_string()).into(),
        _ => err.into(),
    }
}
