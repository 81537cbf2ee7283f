//! Secret path normalization.
//!
//! Two spellings of the same location (`kv//app/`, `/kv/app`) must resolve
//! to the same entry, so every path is normalized before it is stored or
//! compared.

use crate::error::{ConfigError, Result};

/// Normalize a secret path.
///
/// Collapses repeated `/`, strips one leading and one trailing separator
/// and surrounding whitespace.
///
/// # Errors
///
/// Returns `ConfigError::EmptyPath` if nothing remains.
pub fn normalize(path: &str) -> Result<String> {
    let normalized = path
        .trim()
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    if normalized.is_empty() {
        return Err(ConfigError::EmptyPath.into());
    }

    Ok(normalized)
}

/// Whether two paths name the same location.
pub fn same(a: &str, b: &str) -> bool {
    match (normalize(a), normalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
