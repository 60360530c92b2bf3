//! Record id and handle token implementations.

use crate::{UuidError, UuidResult};
use chrono::{DateTime, Utc};
use rand::Rng;
use std::{fmt, str::FromStr};

/// Number of random base-36 characters appended to every record id.
pub const RANDOM_SUFFIX_LEN: usize = 5;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Identifier of a report or vitals entry.
///
/// Stored ids are treated as opaque strings: ids written by older versions of the application
/// are accepted as-is when a document is loaded.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RecordId(String);

impl RecordId {
    /// Wraps an existing id, for example one supplied on the command line.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] if `input` is empty or contains whitespace.
    pub fn parse(input: &str) -> UuidResult<Self> {
        if input.is_empty() || input.chars().any(char::is_whitespace) {
            return Err(UuidError::InvalidInput(format!(
                "record id must be non-empty and contain no whitespace, got: '{}'",
                input
            )));
        }
        Ok(Self(input.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RecordId {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordId::parse(s)
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Allocates [`RecordId`]s.
///
/// The generator remembers the last time component it used. If the clock has not moved on (or
/// has gone backwards) the next id uses the previous time component plus one millisecond.
#[derive(Debug, Default)]
pub struct RecordIdGenerator {
    last_millis: Option<i64>,
}

impl RecordIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a new id using the current wall-clock time.
    pub fn new_id(&mut self) -> RecordId {
        self.new_id_at(Utc::now())
    }

    /// Allocates a new id as if the clock read `now`.
    pub fn new_id_at(&mut self, now: DateTime<Utc>) -> RecordId {
        let now_millis = now.timestamp_millis().max(0);
        let millis = match self.last_millis {
            Some(prev) if now_millis <= prev => prev + 1,
            _ => now_millis,
        };
        self.last_millis = Some(millis);

        let mut id = to_base36(millis as u64);
        let mut rng = rand::thread_rng();
        for _ in 0..RANDOM_SUFFIX_LEN {
            id.push(BASE36[rng.gen_range(0..BASE36.len())] as char);
        }
        RecordId(id)
    }
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_owned();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

/// A canonical v4 UUID (32 lowercase hex characters, no hyphens).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HandleToken(uuid::Uuid);

impl Default for HandleToken {
    fn default() -> Self {
        Self::new()
    }
}

impl HandleToken {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Parses a token that must already be in canonical form.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] for hyphenated, uppercase, or otherwise
    /// non-canonical input.
    pub fn parse(input: &str) -> UuidResult<Self> {
        if !Self::is_canonical(input) {
            return Err(UuidError::InvalidInput(format!(
                "token must be 32 lowercase hex characters without hyphens, got: '{}'",
                input
            )));
        }
        uuid::Uuid::parse_str(input)
            .map(Self)
            .map_err(|e| UuidError::InvalidInput(e.to_string()))
    }

    pub fn is_canonical(input: &str) -> bool {
        input.len() == 32
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }
}

impl fmt::Display for HandleToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;

    fn time_component(id: &RecordId) -> &str {
        let s = id.as_str();
        &s[..s.len() - RANDOM_SUFFIX_LEN]
    }

    #[test]
    fn test_base36_encoding() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_704_067_200_000), "lqu5m2o0");
    }

    #[test]
    fn test_new_id_has_time_and_random_components() {
        let mut ids = RecordIdGenerator::new();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let id = ids.new_id_at(now);

        assert_eq!(time_component(&id), "lqu5m2o0");
        assert_eq!(id.as_str().len(), 8 + RANDOM_SUFFIX_LEN);
        assert!(id
            .as_str()
            .bytes()
            .all(|b| b.is_ascii_digit() || b.is_ascii_lowercase()));
    }

    #[test]
    fn test_same_millisecond_still_advances() {
        let mut ids = RecordIdGenerator::new();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let first = ids.new_id_at(now);
        let second = ids.new_id_at(now);

        assert_eq!(time_component(&first), "lqu5m2o0");
        assert_eq!(time_component(&second), "lqu5m2o1");
        assert_ne!(first, second);
    }

    #[test]
    fn test_clock_going_backwards_does_not_reuse_time_component() {
        let mut ids = RecordIdGenerator::new();
        let later = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 1).unwrap();
        let earlier = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let first = ids.new_id_at(later);
        let second = ids.new_id_at(earlier);

        assert!(time_component(&second) > time_component(&first));
    }

    #[test]
    fn test_many_ids_are_unique() {
        let mut ids = RecordIdGenerator::new();
        let set: HashSet<RecordId> = (0..1_000).map(|_| ids.new_id()).collect();
        assert_eq!(set.len(), 1_000);
    }

    #[test]
    fn test_record_id_parse() {
        assert!(RecordId::parse("lqu5m2o0ab12c").is_ok());
        assert!(RecordId::parse("").is_err());
        assert!(RecordId::parse("has space").is_err());
        let parsed: RecordId = "abc".parse().unwrap();
        assert_eq!(parsed.to_string(), "abc");
    }

    #[test]
    fn test_record_id_serialises_transparently() {
        let id = RecordId::parse("lqu5m2o0ab12c").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"lqu5m2o0ab12c\"");
    }

    #[test]
    fn test_handle_token_canonical_form() {
        let token = HandleToken::new();
        let s = token.to_string();
        assert!(HandleToken::is_canonical(&s));
        assert_eq!(HandleToken::parse(&s).unwrap(), token);
    }

    #[test]
    fn test_handle_token_rejects_hyphenated() {
        assert!(HandleToken::parse("550e8400-e29b-41d4-a716-446655440000").is_err());
        assert!(HandleToken::parse("550E8400E29B41D4A716446655440000").is_err());
        assert!(HandleToken::parse("550e8400e29b41d4a716446655440000").is_ok());
    }
}
