//! Format and field-name resolution.
//!
//! The format of an entry is decided by an ordered list of strategies. Each
//! returns a format or "no opinion"; the first answer wins. The default
//! order is:
//!
//! 1. `Declared` - the entry's explicit `format`
//! 2. `PathPattern` - catalog substring hints, longest match wins
//! 3. `Content` - sniffing the payload, once it has been fetched
//!
//! Resolution is therefore two-phase: [`Resolver::declared`] runs before the
//! fetch, [`Resolver::resolve`] after it.
//!
//! Stored key names follow a second ladder, see [`FieldMap`].

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use crate::core::catalog::FormatCatalog;
use crate::core::codec;
use crate::core::constants::{
    ACCESS_KEY, EXPORT_ACCESS_KEY, EXPORT_SECRET_KEY, PLAIN_ACCESS_KEY, PLAIN_SECRET_KEY,
    SECRET_KEY,
};
use crate::core::domain::{FormatKind, PathEntry};
use crate::core::types::{LogicalField, StoredKey};
use crate::error::{FormatError, Result};

/// What a strategy gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct Input<'a> {
    pub entry: &'a PathEntry,
    pub catalog: &'a FormatCatalog,
    /// Raw payload; `None` before the secret has been fetched.
    pub payload: Option<&'a str>,
}

/// One tier of format resolution.
pub trait Strategy: Send + Sync {
    /// Label recorded on the resolution.
    fn name(&self) -> &'static str;

    /// A format, `None` for no opinion, or an error that stops resolution.
    fn resolve(&self, input: &Input<'_>) -> Result<Option<FormatKind>>;
}

/// The entry's explicit format.
#[derive(Debug, Default)]
pub struct Declared;

impl Strategy for Declared {
    fn name(&self) -> &'static str {
        "declared"
    }

    fn resolve(&self, input: &Input<'_>) -> Result<Option<FormatKind>> {
        Ok(input.entry.format())
    }
}

/// Catalog path patterns.
#[derive(Debug, Default)]
pub struct PathPattern;

impl Strategy for PathPattern {
    fn name(&self) -> &'static str {
        "path pattern"
    }

    fn resolve(&self, input: &Input<'_>) -> Result<Option<FormatKind>> {
        input.catalog.infer(input.entry.path())
    }
}

/// Payload sniffing.
///
/// A JSON object is `json`; otherwise the pair lines decide between the
/// dotenv forms, ignoring blank and comment lines.
#[derive(Debug, Default)]
pub struct Content;

impl Strategy for Content {
    fn name(&self) -> &'static str {
        "content"
    }

    fn resolve(&self, input: &Input<'_>) -> Result<Option<FormatKind>> {
        let Some(payload) = input.payload else {
            return Ok(None);
        };

        if let Ok(Value::Object(_)) = serde_json::from_str::<Value>(payload) {
            return Ok(Some(FormatKind::Json));
        }

        codec::sniff_dotenv(payload).map(Some).ok_or_else(|| {
            FormatError::Undetected(format!(
                "payload at '{}' is neither a JSON object nor uniform dotenv lines",
                input.entry.path()
            ))
            .into()
        })
    }
}

/// Which tier named a stored key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    /// The entry's own `fields` override.
    Entry,
    /// The catalog default for the format.
    Catalog,
    /// Built-in name for the credential pair.
    Baseline,
    /// The logical field is itself the stored key.
    Literal,
}

/// Logical field → stored key, for one entry and format.
///
/// Precedence: entry override, catalog default, baseline, literal. The
/// baseline only knows `access_key` and `secret_key`; any other field is
/// taken to be the stored key name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap {
    format: FormatKind,
    entry: BTreeMap<LogicalField, StoredKey>,
    catalog: BTreeMap<LogicalField, StoredKey>,
}

impl FieldMap {
    /// Field names for an entry resolved to `format`.
    pub fn new(format: FormatKind, entry: &PathEntry, catalog: &FormatCatalog) -> Self {
        Self {
            format,
            entry: entry.fields().clone(),
            catalog: catalog
                .spec(format)
                .map(|spec| spec.fields().clone())
                .unwrap_or_default(),
        }
    }

    /// Baseline names only.
    pub fn baseline(format: FormatKind) -> Self {
        Self {
            format,
            entry: BTreeMap::new(),
            catalog: BTreeMap::new(),
        }
    }

    pub fn format(&self) -> FormatKind {
        self.format
    }

    /// Stored key for `logical` and the tier that supplied it.
    pub fn lookup<'a>(&'a self, logical: &'a str) -> (&'a str, FieldSource) {
        if let Some(stored) = self.entry.get(logical) {
            return (stored.as_str(), FieldSource::Entry);
        }
        if let Some(stored) = self.catalog.get(logical) {
            return (stored.as_str(), FieldSource::Catalog);
        }
        if let Some(stored) = baseline(self.format, logical) {
            return (stored, FieldSource::Baseline);
        }
        (logical, FieldSource::Literal)
    }

    /// Stored key for `logical`.
    pub fn stored_name<'a>(&'a self, logical: &'a str) -> &'a str {
        self.lookup(logical).0
    }
}

fn baseline(format: FormatKind, logical: &str) -> Option<&'static str> {
    match (format, logical) {
        (FormatKind::DotenvExport, ACCESS_KEY) => Some(EXPORT_ACCESS_KEY),
        (FormatKind::DotenvExport, SECRET_KEY) => Some(EXPORT_SECRET_KEY),
        (_, ACCESS_KEY) => Some(PLAIN_ACCESS_KEY),
        (_, SECRET_KEY) => Some(PLAIN_SECRET_KEY),
        _ => None,
    }
}

/// Result of resolving an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    format: FormatKind,
    resolved_by: &'static str,
    fields: FieldMap,
}

impl Resolution {
    pub fn format(&self) -> FormatKind {
        self.format
    }

    /// Name of the strategy that decided the format.
    pub fn resolved_by(&self) -> &'static str {
        self.resolved_by
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }
}

/// Ordered strategy list.
pub struct Resolver {
    strategies: Vec<Box<dyn Strategy>>,
}

impl Default for Resolver {
    fn default() -> Self {
        let strategies: Vec<Box<dyn Strategy>> = vec![
            Box::new(Declared),
            Box::new(PathPattern),
            Box::new(Content),
        ];
        Self::new(strategies)
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.strategies.iter().map(|s| s.name()).collect();
        f.debug_struct("Resolver").field("strategies", &names).finish()
    }
}

impl Resolver {
    pub fn new(strategies: Vec<Box<dyn Strategy>>) -> Self {
        Self { strategies }
    }

    /// Append a lower-precedence strategy.
    pub fn with_strategy(mut self, strategy: impl Strategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    /// Resolve without a payload.
    ///
    /// Returns the format and the strategy name, or `None` if only the
    /// payload can tell.
    pub fn declared(
        &self,
        entry: &PathEntry,
        catalog: &FormatCatalog,
    ) -> Result<Option<(FormatKind, &'static str)>> {
        self.run(&Input {
            entry,
            catalog,
            payload: None,
        })
    }

    /// Resolve the format and field names of an entry.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::AmbiguousFormat` on tied path patterns, or
    /// `FormatError::Undetected` when no strategy decides.
    pub fn resolve(
        &self,
        entry: &PathEntry,
        catalog: &FormatCatalog,
        payload: Option<&str>,
    ) -> Result<Resolution> {
        let input = Input {
            entry,
            catalog,
            payload,
        };

        let (format, resolved_by) = self.run(&input)?.ok_or_else(|| {
            FormatError::Undetected(format!(
                "no format declared or inferred for '{}' and no payload to inspect",
                entry.path()
            ))
        })?;

        debug!(path = entry.path(), format = %format, resolved_by, "format resolved");

        Ok(Resolution {
            format,
            resolved_by,
            fields: FieldMap::new(format, entry, catalog),
        })
    }

    fn run(&self, input: &Input<'_>) -> Result<Option<(FormatKind, &'static str)>> {
        for strategy in &self.strategies {
            if let Some(format) = strategy.resolve(input)? {
                return Ok(Some((format, strategy.name())));
            }
        }
        Ok(None)
    }
}
