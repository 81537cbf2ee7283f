//! Format catalog.
//!
//! Per-format path hints and default field names, shared by every entry of
//! a configuration.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::core::domain::FormatKind;
use crate::core::types::{LogicalField, StoredKey};
use crate::error::{ConfigError, Result};

/// Catalog data for one format.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatSpec {
    path_patterns: BTreeSet<String>,
    fields: BTreeMap<LogicalField, StoredKey>,
}

impl FormatSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a substring that, found in a path, suggests this format.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.path_patterns.insert(pattern.into());
        self
    }

    /// Default stored name of a logical field for this format.
    pub fn with_field(mut self, logical: impl Into<String>, stored: impl Into<String>) -> Self {
        self.fields.insert(logical.into(), stored.into());
        self
    }

    pub fn path_patterns(&self) -> &BTreeSet<String> {
        &self.path_patterns
    }

    pub fn fields(&self) -> &BTreeMap<LogicalField, StoredKey> {
        &self.fields
    }

    /// Length of the longest pattern contained in `path`.
    fn longest_match(&self, path: &str) -> Option<usize> {
        self.path_patterns
            .iter()
            .filter(|p| path.contains(p.as_str()))
            .map(|p| p.len())
            .max()
    }
}

/// Mapping from format to its catalog data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatCatalog {
    formats: BTreeMap<FormatKind, FormatSpec>,
}

impl FormatCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register catalog data for a format, replacing any previous data.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for an empty pattern, which would
    /// match every path.
    pub fn insert(&mut self, kind: FormatKind, spec: FormatSpec) -> Result<()> {
        if spec.path_patterns.iter().any(|p| p.is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "path_patterns",
                reason: format!("empty pattern for {}", kind),
            }
            .into());
        }

        if let Some((logical, _)) = spec.fields.iter().find(|(_, stored)| stored.is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "fields",
                reason: format!("empty stored name for '{}' in {}", logical, kind),
            }
            .into());
        }

        self.formats.insert(kind, spec);
        Ok(())
    }

    /// Builder form of [`FormatCatalog::insert`].
    pub fn with(mut self, kind: FormatKind, spec: FormatSpec) -> Result<Self> {
        self.insert(kind, spec)?;
        Ok(self)
    }

    pub fn spec(&self, kind: FormatKind) -> Option<&FormatSpec> {
        self.formats.get(&kind)
    }

    /// Catalog default for a logical field.
    pub fn default_field(&self, kind: FormatKind, logical: &str) -> Option<&str> {
        self.spec(kind)
            .and_then(|spec| spec.fields.get(logical))
            .map(String::as_str)
    }

    /// Infer a format from path patterns.
    ///
    /// The format with the longest contained pattern wins.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::AmbiguousFormat` when several formats tie for
    /// the longest match.
    pub fn infer(&self, path: &str) -> Result<Option<FormatKind>> {
        let matches: Vec<(FormatKind, usize)> = self
            .formats
            .iter()
            .filter_map(|(kind, spec)| spec.longest_match(path).map(|len| (*kind, len)))
            .collect();

        let Some(best) = matches.iter().map(|(_, len)| *len).max() else {
            return Ok(None);
        };

        let winners: Vec<FormatKind> = matches
            .iter()
            .filter(|(_, len)| *len == best)
            .map(|(kind, _)| *kind)
            .collect();

        if winners.len() > 1 {
            return Err(ConfigError::AmbiguousFormat {
                path: path.to_string(),
                kinds: winners,
            }
            .into());
        }

        debug!(path, format = %winners[0], pattern_len = best, "format inferred from path");
        Ok(winners.first().copied())
    }
}
