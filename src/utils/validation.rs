use crate::utils::error::{AdapterError, Result};
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AdapterError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// Model and field names: an ASCII letter or `_`, then letters, digits or `_`.
pub fn validate_identifier(field_name: &str, value: &str) -> Result<()> {
    validate_non_empty_string(field_name, value)?;

    let mut chars = value.chars();
    let starts_well = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !starts_well || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(AdapterError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Must start with a letter or '_' and contain only letters, digits and '_'"
                .to_string(),
        });
    }
    Ok(())
}

/// Document keys may not be empty, start with `$` or contain `.` or NUL.
pub fn validate_document_key(field_name: &str, key: &str) -> Result<()> {
    let reason = if key.is_empty() {
        Some("Document key cannot be empty")
    } else if key.starts_with('$') {
        Some("Document key cannot start with '$'")
    } else if key.contains('.') {
        Some("Document key cannot contain '.'")
    } else if key.contains('\0') {
        Some("Document key contains null bytes")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(AdapterError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: key.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

/// Fails on the first value that was already seen.
pub fn validate_unique<'a, I>(field_name: &str, values: I) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for value in values {
        if !seen.insert(value) {
            return Err(AdapterError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: value.to_string(),
                reason: "Value is used more than once".to_string(),
            });
        }
    }
    Ok(())
}

pub fn validate_one_of(field_name: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if !allowed.contains(&value) {
        return Err(AdapterError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Unsupported value. Valid values: {}", allowed.join(", ")),
        });
    }
    Ok(())
}
