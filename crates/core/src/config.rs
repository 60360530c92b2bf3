//! Core runtime configuration.
//!
//! Configuration is resolved once at startup and handed to the store. Nothing in the core reads
//! environment variables while handling an action.

use crate::constants::{DEFAULT_DATA_DIR, STORAGE_KEY};
use crate::validation::validate_storage_key;
use crate::{HealthError, HealthResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    storage_key: String,
}

impl CoreConfig {
    /// Create a new `CoreConfig` using the default storage key.
    pub fn new(data_dir: PathBuf) -> HealthResult<Self> {
        Self::with_storage_key(data_dir, STORAGE_KEY)
    }

    /// Create a `CoreConfig` with an explicit storage key.
    ///
    /// Tests use this to keep several documents side by side in one directory.
    pub fn with_storage_key(data_dir: PathBuf, storage_key: &str) -> HealthResult<Self> {
        if data_dir.as_os_str().is_empty() {
            return Err(HealthError::InvalidConfig(
                "data directory cannot be empty".into(),
            ));
        }
        validate_storage_key(storage_key)?;

        Ok(Self {
            data_dir,
            storage_key: storage_key.to_owned(),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }
}

/// Resolve the data directory from an optional environment value.
///
/// `None` or a blank value falls back to [`DEFAULT_DATA_DIR`].
pub fn data_dir_from_env_value(value: Option<String>) -> PathBuf {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}
