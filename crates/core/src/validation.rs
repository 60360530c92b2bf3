//! Input validation utilities.
//!
//! Every mutation validates its whole input before touching the document, so a refused action
//! never leaves a partial record behind.

use crate::{HealthError, HealthResult};
use healthmate_types::NonEmptyText;

/// Requires `input` to be non-blank, reporting `message` to the user otherwise.
pub(crate) fn required(input: &str, message: &str) -> HealthResult<NonEmptyText> {
    NonEmptyText::new(input).map_err(|_| HealthError::Validation(message.to_owned()))
}

/// Validates that a storage key is safe to use as a file name.
///
/// - Rejects empty keys
/// - Bounds the length
/// - Restricts characters to ASCII alphanumerics, `.`, `-` and `_`, and rejects `..`
pub fn validate_storage_key(key: &str) -> HealthResult<()> {
    const MAX_KEY_LEN: usize = 128;

    if key.is_empty() {
        return Err(HealthError::InvalidStorageKey(
            "storage key cannot be empty".into(),
        ));
    }

    if key.len() > MAX_KEY_LEN {
        return Err(HealthError::InvalidStorageKey(format!(
            "storage key exceeds maximum length of {} characters",
            MAX_KEY_LEN
        )));
    }

    let ok = key
        .bytes()
        .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'.' | b'-' | b'_'));

    if !ok || key.contains("..") {
        return Err(HealthError::InvalidStorageKey(format!(
            "storage key '{}' contains invalid characters (only alphanumeric, '.', '-', '_' allowed)",
            key
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims_and_accepts() {
        assert_eq!(required("  95 ", "msg").unwrap(), "95");
    }

    #[test]
    fn test_required_reports_message() {
        match required(" ", "Please fill all vitals fields.") {
            Err(HealthError::Validation(msg)) => {
                assert_eq!(msg, "Please fill all vitals fields.")
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_storage_key_rules() {
        assert!(validate_storage_key("healthmate_data_v1").is_ok());
        assert!(validate_storage_key("").is_err());
        assert!(validate_storage_key("a/b").is_err());
        assert!(validate_storage_key("..").is_err());
        assert!(validate_storage_key(&"k".repeat(129)).is_err());
    }
}
