//! Path registry.
//!
//! Ordered path entries per environment and application.

use std::collections::BTreeMap;

use tracing::debug;

use crate::core::domain::PathEntry;
use crate::core::path;
use crate::core::types::{Application, Environment};
use crate::error::{ConfigError, Result};

type Applications = BTreeMap<Application, Vec<PathEntry>>;

/// Read-only lookup of configured paths.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    environments: BTreeMap<Environment, Applications>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry to an application, creating both levels as needed.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::DuplicateEntry` if the application already has
    /// an entry with the same normalized path and storage key.
    pub fn insert(&mut self, environment: &str, application: &str, entry: PathEntry) -> Result<()> {
        let entries = self
            .environments
            .entry(environment.to_string())
            .or_default()
            .entry(application.to_string())
            .or_default();

        if entries
            .iter()
            .any(|e| e.path() == entry.path() && e.storage_key() == entry.storage_key())
        {
            return Err(ConfigError::DuplicateEntry {
                environment: environment.to_string(),
                application: application.to_string(),
                path: entry.path().to_string(),
                storage_key: entry.storage_key().to_string(),
            }
            .into());
        }

        debug!(environment, application, path = entry.path(), "registered path");
        entries.push(entry);
        Ok(())
    }

    /// Declare an application with no entries yet.
    pub fn declare(&mut self, environment: &str, application: &str) {
        self.environments
            .entry(environment.to_string())
            .or_default()
            .entry(application.to_string())
            .or_default();
    }

    /// Environment names, sorted.
    pub fn environments(&self) -> Vec<&str> {
        self.environments.keys().map(String::as_str).collect()
    }

    /// Application names of an environment, sorted.
    pub fn applications(&self, environment: &str) -> Result<Vec<&str>> {
        Ok(self
            .applications_of(environment)?
            .keys()
            .map(String::as_str)
            .collect())
    }

    /// Entries of an application in configured order.
    pub fn lookup(&self, environment: &str, application: &str) -> Result<&[PathEntry]> {
        self.applications_of(environment)?
            .get(application)
            .map(Vec::as_slice)
            .ok_or_else(|| {
                ConfigError::UnknownApplication {
                    environment: environment.to_string(),
                    application: application.to_string(),
                }
                .into()
            })
    }

    /// The entry for `path`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::PathNotFound` if no entry matches, or
    /// `ConfigError::AmbiguousPath` if several entries share the path with
    /// different storage keys.
    pub fn find(&self, environment: &str, application: &str, path: &str) -> Result<&PathEntry> {
        self.find_key(environment, application, path, None)
    }

    /// The entry for `path`, narrowed by storage key when given.
    pub fn find_key(
        &self,
        environment: &str,
        application: &str,
        path: &str,
        storage_key: Option<&str>,
    ) -> Result<&PathEntry> {
        let wanted = path::normalize(path)?;
        let matches: Vec<&PathEntry> = self
            .lookup(environment, application)?
            .iter()
            .filter(|e| e.path() == wanted)
            .filter(|e| storage_key.map_or(true, |k| e.storage_key() == k))
            .collect();

        match matches.as_slice() {
            [entry] => Ok(*entry),
            [] => Err(ConfigError::PathNotFound {
                environment: environment.to_string(),
                application: application.to_string(),
                path: wanted,
            }
            .into()),
            many => Err(ConfigError::AmbiguousPath {
                environment: environment.to_string(),
                application: application.to_string(),
                path: wanted,
                keys: many.iter().map(|e| e.storage_key().to_string()).collect(),
            }
            .into()),
        }
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.environments
            .values()
            .flat_map(|apps| apps.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn applications_of(&self, environment: &str) -> Result<&Applications> {
        self.environments
            .get(environment)
            .ok_or_else(|| ConfigError::UnknownEnvironment(environment.to_string()).into())
    }
}
