//! FieldUpdate type.
//!
//! A single rotation request for one logical field.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use zeroize::Zeroizing;

use crate::core::constants::GENERATED_ALPHABET;
use crate::core::validation;
use crate::error::{Error, Result, ValidationError};

/// New value for a logical field. The value is wiped from memory on drop.
#[derive(Clone)]
pub struct FieldUpdate {
    field: String,
    new_value: Zeroizing<String>,
}

impl FieldUpdate {
    /// Create an update.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the field name is empty or padded. Any
    /// value is accepted, including the empty string.
    pub fn new(field: impl Into<String>, new_value: impl Into<String>) -> Result<Self> {
        let field = field.into();
        let new_value = Zeroizing::new(new_value.into());

        validation::validate_field(&field)?;

        Ok(Self { field, new_value })
    }

    /// Create an update with a freshly generated random value.
    pub fn generate(field: impl Into<String>, length: usize) -> Result<Self> {
        let mut rng = rand::thread_rng();
        let value: String = (0..length.max(1))
            .map(|_| GENERATED_ALPHABET[rng.gen_range(0..GENERATED_ALPHABET.len())] as char)
            .collect();

        Self::new(field, value)
    }

    /// Logical field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The new value.
    pub fn new_value(&self) -> &str {
        &self.new_value
    }
}

impl FromStr for FieldUpdate {
    type Err = Error;

    /// Parse `FIELD=VALUE`. Everything after the first `=` is the value,
    /// which must not be empty on the command line.
    fn from_str(s: &str) -> Result<Self> {
        let (field, value) = s
            .split_once('=')
            .ok_or_else(|| ValidationError::MalformedUpdate(s.to_string()))?;

        let field = field.trim();
        validation::validate_value(field, value)?;
        Self::new(field, value)
    }
}

impl fmt::Debug for FieldUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldUpdate")
            .field("field", &self.field)
            .field("new_value", &"<redacted>")
            .finish()
    }
}
