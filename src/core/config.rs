//! Configuration file management.
//!
//! Reads `.kvrotate.toml`: the store location, the format catalog and the
//! path registry. Every configuration problem is reported here, before the
//! store is touched.
//!
//! ```toml
//! [store]
//! root = ".kvrotate/store"
//!
//! [formats.json]
//! path_patterns = ["/secrets"]
//! fields = { access_key = "AWS_ACCESS_KEY" }
//!
//! [[environments.prod.helios]]
//! path = "kv/engineering/v1/airflow/helios"
//! storage_key = "dotenv"
//! format = "dotenv_export"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::catalog::{FormatCatalog, FormatSpec};
use crate::core::constants;
use crate::core::domain::{FormatKind, PathEntry};
use crate::core::registry::Registry;
use crate::core::types::{Application, Environment, LogicalField, StoredKey};
use crate::error::{ConfigError, Error, Result};

/// Parsed configuration file.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    /// Catalog data keyed by format name.
    #[serde(default)]
    pub formats: BTreeMap<String, FormatConfig>,
    /// Entries keyed by environment, then application.
    #[serde(default)]
    pub environments: BTreeMap<Environment, BTreeMap<Application, Vec<EntryConfig>>>,
    /// File the configuration was read from.
    #[serde(skip)]
    source: Option<PathBuf>,
}

/// `[store]` section.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Root directory of the file store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
}

/// `[formats.<kind>]` section.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormatConfig {
    #[serde(default)]
    pub path_patterns: Vec<String>,
    #[serde(default)]
    pub fields: BTreeMap<LogicalField, StoredKey>,
}

/// One `[[environments.<env>.<app>]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntryConfig {
    pub path: String,
    pub storage_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<LogicalField, StoredKey>,
}

impl FromStr for Config {
    type Err = Error;

    fn from_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }
}

impl Config {
    /// Configuration files tried by [`Config::discover`], in order.
    pub fn candidates() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(constants::CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(
                dir.join(constants::CONFIG_DIR)
                    .join(constants::GLOBAL_CONFIG_FILE),
            );
        }
        paths
    }

    /// Load an explicit file, or the first candidate that exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if no file exists.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let candidates = Self::candidates();
        match candidates.iter().find(|p| p.is_file()) {
            Some(path) => Self::load(path),
            None => Err(ConfigError::NotFound(
                candidates
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            )
            .into()),
        }
    }

    /// Load and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the file doesn't exist,
    /// `ConfigError::Parse` if the TOML is malformed, or any validation
    /// error from building the registry and catalog.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading config");

        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()).into());
        }
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let mut config: Self = contents.parse()?;
        config.source = Some(path.to_path_buf());

        debug!(
            environments = config.environments.len(),
            formats = config.formats.len(),
            "config loaded"
        );

        Ok(config)
    }

    /// File this configuration was loaded from.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Check that the registry and catalog can be built.
    pub fn validate(&self) -> Result<()> {
        self.catalog()?;
        self.registry()?;
        Ok(())
    }

    /// Build the format catalog.
    pub fn catalog(&self) -> Result<FormatCatalog> {
        let mut catalog = FormatCatalog::new();

        for (name, format) in &self.formats {
            let kind: FormatKind = name.parse()?;
            let spec = format
                .path_patterns
                .iter()
                .fold(FormatSpec::new(), |spec, p| spec.with_pattern(p.as_str()));
            let spec = format
                .fields
                .iter()
                .fold(spec, |spec, (logical, stored)| {
                    spec.with_field(logical.as_str(), stored.as_str())
                });
            catalog.insert(kind, spec)?;
        }

        Ok(catalog)
    }

    /// Build the path registry.
    pub fn registry(&self) -> Result<Registry> {
        let mut registry = Registry::new();

        for (environment, applications) in &self.environments {
            for (application, entries) in applications {
                registry.declare(environment, application);
                for entry in entries {
                    registry.insert(environment, application, entry.to_entry()?)?;
                }
            }
        }

        Ok(registry)
    }

    /// Root directory of the file store.
    ///
    /// A relative root is taken relative to the configuration file.
    pub fn store_root(&self) -> PathBuf {
        let root = self
            .store
            .root
            .clone()
            .unwrap_or_else(|| PathBuf::from(constants::DEFAULT_STORE_ROOT));

        if root.is_absolute() {
            return root;
        }

        match self.source.as_deref().and_then(Path::parent) {
            Some(dir) => dir.join(root),
            None => root,
        }
    }
}

impl EntryConfig {
    fn to_entry(&self) -> Result<PathEntry> {
        let mut entry = PathEntry::new(&self.path, &self.storage_key)?
            .with_description(self.description.as_str());

        if let Some(format) = &self.format {
            entry = entry.with_format(format.parse()?);
        }

        Ok(self
            .fields
            .iter()
            .fold(entry, |entry, (logical, stored)| {
                entry.with_field(logical.as_str(), stored.as_str())
            }))
    }
}
