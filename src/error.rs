//! Error types.
//!
//! One enum per failure family, wrapped by [`Error`]. Per-path failures are
//! wrapped in [`Error::Path`] so a report always names the environment,
//! application, path and pipeline stage that failed.

use std::fmt;

use thiserror::Error;

use crate::core::domain::FormatKind;

/// Top-level error.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Rotation(#[from] RotationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// An error raised while a specific pipeline stage was running.
    #[error("{stage}: {source}")]
    Stage { stage: Stage, source: Box<Error> },

    /// An error raised while processing one configured path.
    #[error("{context}: {source}")]
    Path {
        context: PathContext,
        source: Box<Error>,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap this error with the stage that produced it.
    pub fn at(self, stage: Stage) -> Self {
        Error::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// Wrap this error with the path it was raised for.
    pub fn for_path(self, context: PathContext) -> Self {
        Error::Path {
            context,
            source: Box::new(self),
        }
    }

    /// The underlying error with all context wrappers removed.
    pub fn root(&self) -> &Error {
        match self {
            Error::Stage { source, .. } | Error::Path { source, .. } => source.root(),
            other => other,
        }
    }

    /// The stage recorded on this error, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::Stage { stage, .. } => Some(*stage),
            Error::Path { source, .. } => source.stage(),
            _ => None,
        }
    }

    /// Whether this is a configuration error (fatal before any store access).
    pub fn is_config(&self) -> bool {
        matches!(self.root(), Error::Config(_))
    }
}

/// Pipeline stage, used to locate a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Lookup,
    Fetch,
    Resolve,
    Decode,
    Merge,
    Encode,
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Lookup => "lookup",
            Stage::Fetch => "fetch",
            Stage::Resolve => "resolve",
            Stage::Decode => "decode",
            Stage::Merge => "merge",
            Stage::Encode => "encode",
            Stage::Write => "write",
        };
        f.write_str(name)
    }
}

/// Identifies the configured path an error belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathContext {
    pub environment: String,
    pub application: String,
    pub path: String,
}

impl fmt::Display for PathContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} {}", self.environment, self.application, self.path)
    }
}

/// Configuration errors. Always fatal, raised before the store is touched.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no configuration found (looked for {0})")]
    NotFound(String),

    #[error("failed to read config: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown environment: {0}")]
    UnknownEnvironment(String),

    #[error("unknown application '{application}' in environment '{environment}'")]
    UnknownApplication {
        environment: String,
        application: String,
    },

    #[error("no entry for path '{path}' in {environment}/{application}")]
    PathNotFound {
        environment: String,
        application: String,
        path: String,
    },

    #[error("path '{path}' has several storage keys in {environment}/{application}; pick one of: {}", keys.join(", "))]
    AmbiguousPath {
        environment: String,
        application: String,
        path: String,
        keys: Vec<String>,
    },

    #[error("duplicate entry in {environment}/{application}: path '{path}' with storage key '{storage_key}'")]
    DuplicateEntry {
        environment: String,
        application: String,
        path: String,
        storage_key: String,
    },

    #[error("secret path cannot be empty")]
    EmptyPath,

    #[error("unknown format: {0} (expected json, dotenv_plain or dotenv_export)")]
    UnknownFormat(String),

    #[error("ambiguous format for '{path}': patterns for {} match equally; set `format` explicitly", display_kinds(kinds))]
    AmbiguousFormat { path: String, kinds: Vec<FormatKind> },

    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

fn display_kinds(kinds: &[FormatKind]) -> String {
    kinds
        .iter()
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join(" and ")
}

/// Payload does not match a known convention.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("cannot detect format: {0}")]
    Undetected(String),

    #[error("parse error on line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("unsupported payload shape: {0}")]
    UnsupportedShape(String),
}

/// Merge-time errors.
#[derive(Error, Debug)]
pub enum RotationError {
    #[error("conflicting updates: '{first}' and '{second}' both target stored key '{stored_key}'")]
    Conflict {
        stored_key: String,
        first: String,
        second: String,
    },

    #[error("no updates requested")]
    NoUpdates,

    #[error("{failed} of {total} paths failed")]
    Failed { failed: usize, total: usize },
}

/// Secret store responses.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("secret not found: {path} (key '{storage_key}')")]
    NotFound { path: String, storage_key: String },

    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("version conflict at {path}: expected version {expected}, store has {actual}")]
    Conflict {
        path: String,
        expected: u64,
        actual: u64,
    },

    #[error("invalid store path: {0}")]
    InvalidPath(String),

    #[error("corrupt store document {path}: {reason}")]
    Corrupt { path: String, reason: String },
}

/// Input validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("key cannot be empty")]
    EmptyKey,

    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("value for '{0}' cannot be empty")]
    EmptyValue(String),

    #[error("invalid update '{0}': expected FIELD=VALUE")]
    MalformedUpdate(String),
}

pub type Result<T> = std::result::Result<T, Error>;
