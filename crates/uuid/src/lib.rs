//! Identifier utilities.
//!
//! HealthMate needs two kinds of identifier:
//!
//! - [`RecordId`]: the id stamped on every report and vitals entry. It is a short base-36 string
//!   made of a millisecond timestamp followed by a random suffix, e.g. `lr8k2m3q` + `x9f0a`.
//!   Collisions are not detected, only made statistically negligible. Not suitable for anything
//!   security sensitive.
//! - [`HandleToken`]: a canonical v4 UUID (32 lowercase hex characters, no hyphens) used to name
//!   session-local preview handles.
//!
//! Use [`RecordIdGenerator`] to allocate record ids. A generator never hands out a time
//! component lower than or equal to the one before it, so ids allocated in one session can be
//! told apart and ordered even when two records are created within the same millisecond.

mod ids;

pub use ids::{HandleToken, RecordId, RecordIdGenerator, RANDOM_SUFFIX_LEN};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
