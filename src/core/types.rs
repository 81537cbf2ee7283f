//! Type aliases for domain concepts.
//!
//! Provides semantic type aliases to make function signatures more descriptive.

/// An environment name (e.g., prod, staging, non_prod).
pub type Environment = String;

/// An application name within an environment.
pub type Application = String;

/// A logical credential field (e.g., access_key, secret_key).
///
/// Independent of the key name it is stored under.
pub type LogicalField = String;

/// A key name as it appears inside a decoded secret payload.
pub type StoredKey = String;

/// A store document version.
pub type Version = u64;
