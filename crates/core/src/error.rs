#[derive(Debug, thiserror::Error)]
pub enum HealthError {
    /// A required form field was missing. The message is meant for the user.
    #[error("{0}")]
    Validation(String),
    #[error("Report not found.")]
    ReportNotFound(String),
    #[error("No preview available.")]
    PreviewUnavailable(String),
    #[error("invalid storage key: {0}")]
    InvalidStorageKey(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to read storage slot: {0}")]
    StorageRead(std::io::Error),
    #[error("failed to write storage slot: {0}")]
    StorageWrite(std::io::Error),
    #[error("storage quota exceeded: need {needed} bytes, quota is {quota} bytes")]
    StorageQuotaExceeded { needed: usize, quota: usize },
    #[error("failed to serialize document: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize document: {0}")]
    Deserialization(serde_json::Error),
    #[error("file error: {0}")]
    Files(#[from] healthmate_files::FilesError),
}

impl HealthError {
    /// True for failures caused by the user's input rather than by storage or lookups.
    pub fn is_validation(&self) -> bool {
        matches!(self, HealthError::Validation(_))
    }
}

pub type HealthResult<T> = std::result::Result<T, HealthError>;
