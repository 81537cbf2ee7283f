//! Input validation for rotation requests.
//!
//! Validates stored key names, logical field names and new values.

use crate::error::{Result, ValidationError};

/// Validate a key name written into a dotenv payload.
///
/// Keys must be valid environment variable names:
/// - Only A-Z, a-z, 0-9, and underscore
/// - Cannot start with a digit
/// - Cannot be empty
///
/// # Errors
///
/// Returns `ValidationError` if the key is invalid.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(ValidationError::EmptyKey.into());
    }

    if key.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidKey {
            key: key.to_string(),
            reason: "cannot start with a digit".to_string(),
        }
        .into());
    }

    if let Some((i, ch)) = key
        .chars()
        .enumerate()
        .find(|(_, ch)| !ch.is_ascii_alphanumeric() && *ch != '_')
    {
        return Err(ValidationError::InvalidKey {
            key: key.to_string(),
            reason: format!(
                "invalid character '{}' at position {}. Only letters, digits, and underscore are allowed",
                ch,
                i + 1
            ),
        }
        .into());
    }

    Ok(())
}

/// Validate a logical field name.
///
/// Logical fields are looked up in field maps and may fall through to a
/// stored key of the same name, so they follow the same rules as JSON keys:
/// non-empty and free of surrounding whitespace.
pub fn validate_field(field: &str) -> Result<()> {
    if field.is_empty() {
        return Err(ValidationError::EmptyKey.into());
    }

    if field.trim() != field {
        return Err(ValidationError::InvalidKey {
            key: field.to_string(),
            reason: "leading or trailing whitespace".to_string(),
        }
        .into());
    }

    Ok(())
}

/// Validate a value given on the command line.
///
/// # Errors
///
/// Returns `ValidationError::EmptyValue` if the value is empty.
pub fn validate_value(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(ValidationError::EmptyValue(field.to_string()).into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_keys() {
        assert!(validate_key("AWS_ACCESS_KEY_ID").is_ok());
        assert!(validate_key("API_KEY").is_ok());
        assert!(validate_key("_PRIVATE").is_ok());
        assert!(validate_key("lower_case").is_ok());
        assert!(validate_key("A").is_ok());
    }

    #[test]
    fn test_invalid_keys() {
        assert!(validate_key("").is_err());
        assert!(validate_key("123_KEY").is_err());
        assert!(validate_key("API-KEY").is_err());
        assert!(validate_key("API KEY").is_err());
        assert!(validate_key("export X").is_err());
    }

    #[test]
    fn test_fields() {
        assert!(validate_field("access_key").is_ok());
        assert!(validate_field("db.password").is_ok());
        assert!(validate_field("").is_err());
        assert!(validate_field(" access_key").is_err());
    }

    #[test]
    fn test_values() {
        assert!(validate_value("KEY", "value").is_ok());
        assert!(validate_value("KEY", "with spaces").is_ok());
        assert!(validate_value("KEY", "").is_err());
    }
}
