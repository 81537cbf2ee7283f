//! RotationPlan type.
//!
//! The set of changes a rotation will make to one path, computed before
//! anything is written.

use std::fmt;

use crate::core::domain::FormatKind;

/// Whether a change replaces a value or adds a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Update,
    Insert,
}

/// One stored key and its old and new values.
#[derive(Clone, PartialEq, Eq)]
pub struct Change {
    logical_field: String,
    stored_key: String,
    old_value: Option<String>,
    new_value: String,
}

impl Change {
    /// Create a change.
    pub fn new(
        logical_field: impl Into<String>,
        stored_key: impl Into<String>,
        old_value: Option<String>,
        new_value: impl Into<String>,
    ) -> Self {
        Self {
            logical_field: logical_field.into(),
            stored_key: stored_key.into(),
            old_value,
            new_value: new_value.into(),
        }
    }

    /// Logical field the change was requested for.
    pub fn logical_field(&self) -> &str {
        &self.logical_field
    }

    /// Key name inside the payload.
    pub fn stored_key(&self) -> &str {
        &self.stored_key
    }

    /// Value before rotation; `None` for insertions.
    pub fn old_value(&self) -> Option<&str> {
        self.old_value.as_deref()
    }

    /// Value after rotation.
    pub fn new_value(&self) -> &str {
        &self.new_value
    }

    pub fn kind(&self) -> ChangeKind {
        if self.old_value.is_some() {
            ChangeKind::Update
        } else {
            ChangeKind::Insert
        }
    }
}

impl fmt::Debug for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Change")
            .field("logical_field", &self.logical_field)
            .field("stored_key", &self.stored_key)
            .field("kind", &self.kind())
            .finish()
    }
}

/// Changes for one path. Immutable once computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPlan {
    path: String,
    format: FormatKind,
    changes: Vec<Change>,
    unchanged: usize,
}

impl RotationPlan {
    pub fn new(path: impl Into<String>, format: FormatKind, changes: Vec<Change>, unchanged: usize) -> Self {
        Self {
            path: path.into(),
            format,
            changes,
            unchanged,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn format(&self) -> FormatKind {
        self.format
    }

    /// Changes in the order the updates were given.
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// Number of existing keys left as they were.
    pub fn unchanged(&self) -> usize {
        self.unchanged
    }

    /// Whether the plan changes nothing.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// The change for a stored key, if any.
    pub fn change(&self, stored_key: &str) -> Option<&Change> {
        self.changes.iter().find(|c| c.stored_key() == stored_key)
    }

    /// Number of insertions.
    pub fn inserted(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| c.kind() == ChangeKind::Insert)
            .count()
    }

    /// Number of updated keys.
    pub fn updated(&self) -> usize {
        self.changes.len() - self.inserted()
    }
}

impl fmt::Display for RotationPlan {
    /// Diff-style listing. Values are never shown.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.path, self.format)?;
        for change in &self.changes {
            let marker = match change.kind() {
                ChangeKind::Update => '~',
                ChangeKind::Insert => '+',
            };
            if change.logical_field() == change.stored_key() {
                writeln!(f, "  {} {}", marker, change.stored_key())?;
            } else {
                writeln!(
                    f,
                    "  {} {} ({})",
                    marker,
                    change.stored_key(),
                    change.logical_field()
                )?;
            }
        }
        write!(f, "  {} unchanged", self.unchanged)
    }
}
