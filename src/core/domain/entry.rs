//! PathEntry type.
//!
//! One configured secret location within an application.

use std::collections::BTreeMap;
use std::fmt;

use crate::core::domain::FormatKind;
use crate::core::path;
use crate::core::types::{LogicalField, StoredKey};
use crate::error::{ConfigError, Result};

/// A configured secret location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEntry {
    path: String,
    format: Option<FormatKind>,
    storage_key: String,
    fields: BTreeMap<LogicalField, StoredKey>,
    description: String,
}

impl PathEntry {
    /// Create an entry with a normalized path.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::EmptyPath` if the path is empty after
    /// normalization, or `ConfigError::InvalidValue` for an empty storage key.
    pub fn new(path: &str, storage_key: &str) -> Result<Self> {
        let path = path::normalize(path)?;

        if storage_key.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "storage_key",
                reason: format!("empty storage key for '{}'", path),
            }
            .into());
        }

        Ok(Self {
            path,
            format: None,
            storage_key: storage_key.to_string(),
            fields: BTreeMap::new(),
            description: String::new(),
        })
    }

    /// Declare the format explicitly.
    pub fn with_format(mut self, format: FormatKind) -> Self {
        self.format = Some(format);
        self
    }

    /// Override the stored name of a logical field for this entry.
    pub fn with_field(mut self, logical: impl Into<String>, stored: impl Into<String>) -> Self {
        self.fields.insert(logical.into(), stored.into());
        self
    }

    /// Attach a human-readable description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Normalized path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Explicit format, if declared.
    pub fn format(&self) -> Option<FormatKind> {
        self.format
    }

    /// Top-level key of the store document holding the payload.
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Entry-level field overrides.
    pub fn fields(&self) -> &BTreeMap<LogicalField, StoredKey> {
        &self.fields
    }

    /// Description.
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Display for PathEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.path, self.storage_key)
    }
}
