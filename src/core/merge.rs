//! Rotation merge.
//!
//! Applies field updates to a decoded secret. Existing keys keep their
//! position and syntax, absent keys are appended, nothing is deleted.

use std::collections::HashMap;

use tracing::debug;

use crate::core::domain::{Change, DecodedSecret, FieldUpdate};
use crate::core::resolve::FieldMap;
use crate::core::validation;
use crate::error::{Result, RotationError};

/// A merged secret and what changed in it.
#[derive(Debug, Clone)]
pub struct Merged {
    pub secret: DecodedSecret,
    /// Changes in update order.
    pub changes: Vec<Change>,
    /// Existing keys left as they were.
    pub unchanged: usize,
}

/// Apply `updates` to `decoded`.
///
/// # Errors
///
/// - `RotationError::NoUpdates` if `updates` is empty
/// - `RotationError::Conflict` if two updates name the same stored key;
///   raised before the secret is touched
/// - `ValidationError` if an inserted dotenv key is not a valid variable name
pub fn apply(
    mut decoded: DecodedSecret,
    updates: &[FieldUpdate],
    fields: &FieldMap,
) -> Result<Merged> {
    if updates.is_empty() {
        return Err(RotationError::NoUpdates.into());
    }

    let targets = targets(updates, fields)?;
    let existing = decoded.len();
    let mut changes = Vec::with_capacity(targets.len());

    for (update, stored) in updates.iter().zip(targets) {
        let new_value = update.new_value();

        match decoded.get(stored) {
            Some(old) if old == new_value => {
                debug!(stored_key = stored, "value already current");
            }
            Some(old) => {
                let old = old.to_string();
                decoded.set(stored, new_value);
                changes.push(Change::new(update.field(), stored, Some(old), new_value));
            }
            None => {
                if decoded.format().is_dotenv() {
                    validation::validate_key(stored)?;
                }
                decoded.append(stored, new_value);
                changes.push(Change::new(update.field(), stored, None, new_value));
            }
        }
    }

    let updated = changes.iter().filter(|c| c.old_value().is_some()).count();

    Ok(Merged {
        secret: decoded,
        unchanged: existing - updated,
        changes,
    })
}

/// Stored key for every update, rejecting two updates on one key.
fn targets<'a>(updates: &'a [FieldUpdate], fields: &'a FieldMap) -> Result<Vec<&'a str>> {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    let mut targets = Vec::with_capacity(updates.len());

    for update in updates {
        let stored = fields.stored_name(update.field());
        if let Some(first) = seen.insert(stored, update.field()) {
            return Err(RotationError::Conflict {
                stored_key: stored.to_string(),
                first: first.to_string(),
                second: update.field().to_string(),
            }
            .into());
        }
        targets.push(stored);
    }

    Ok(targets)
}
