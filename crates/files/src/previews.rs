//! Preview registry implementation
//!
//! The registry owns the bytes of every file uploaded during the current session, keyed by the
//! handle given out at upload time. It is deliberately not persisted: only the handle string is
//! written into the document, and it becomes dead as soon as the registry is dropped.

use crate::FilesError;
use chrono::{DateTime, Utc};
use healthmate_types::NonEmptyText;
use healthmate_uuid::HandleToken;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;

/// Scheme-like prefix carried by every handle issued by this crate.
pub const PREVIEW_HANDLE_PREFIX: &str = "blob:healthmate/";

/// A file chosen in the upload form: its original name and its contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    name: NonEmptyText,
    bytes: Vec<u8>,
}

impl UploadedFile {
    /// Wraps an in-memory file.
    ///
    /// # Errors
    ///
    /// Returns [`FilesError::InvalidFileName`] if `name` is blank.
    pub fn new(name: impl AsRef<str>, bytes: Vec<u8>) -> Result<Self, FilesError> {
        let name = NonEmptyText::new(name.as_ref())
            .map_err(|_| FilesError::InvalidFileName(name.as_ref().to_owned()))?;
        Ok(Self { name, bytes })
    }

    /// Reads a file from disk, keeping its file name as the upload name.
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if the path has no file name or the file cannot be read.
    pub fn from_path(path: &Path) -> Result<Self, FilesError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| FilesError::InvalidFileName(path.display().to_string()))?;

        let bytes = fs::read(path).map_err(|e| {
            FilesError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read upload {}: {}", path.display(), e),
            ))
        })?;

        Self::new(name, bytes)
    }

    pub fn name(&self) -> &NonEmptyText {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Session-local reference to an uploaded file.
///
/// Stored in the document as an opaque string. A handle loaded from storage may have been issued
/// by an earlier session, in which case it no longer resolves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct PreviewHandle(String);

impl PreviewHandle {
    fn generate() -> Self {
        Self(format!("{}{}", PREVIEW_HANDLE_PREFIX, HandleToken::new()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for PreviewHandle {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A live preview: the uploaded bytes plus what we could detect about them.
#[derive(Debug, Clone)]
pub struct PreviewResource {
    pub file_name: NonEmptyText,

    /// Best-effort media type sniffed from the content. Not authoritative.
    pub media_type: Option<String>,

    pub bytes: Vec<u8>,
    pub acquired_at: DateTime<Utc>,
}

/// Outcome of an end-of-session sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub released: usize,
    pub failed: usize,
}

/// Owner of every preview created in the current session.
#[derive(Debug, Default)]
pub struct PreviewRegistry {
    live: HashMap<PreviewHandle, PreviewResource>,
    released: HashSet<PreviewHandle>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an upload and returns its new handle.
    pub fn acquire(&mut self, file: UploadedFile) -> PreviewHandle {
        let handle = PreviewHandle::generate();
        let media_type = infer::get(&file.bytes).map(|kind| kind.mime_type().to_owned());

        tracing::debug!(
            handle = %handle,
            file = %file.name,
            size = file.bytes.len(),
            "acquired preview handle"
        );

        self.live.insert(
            handle.clone(),
            PreviewResource {
                file_name: file.name,
                media_type,
                bytes: file.bytes,
                acquired_at: Utc::now(),
            },
        );
        handle
    }

    /// Looks up a live handle. Dead, released, and foreign handles all resolve to `None`.
    pub fn resolve(&self, handle: &PreviewHandle) -> Option<&PreviewResource> {
        self.live.get(handle)
    }

    pub fn is_live(&self, handle: &PreviewHandle) -> bool {
        self.live.contains_key(handle)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Invalidates a handle and drops its bytes.
    ///
    /// # Errors
    ///
    /// - [`FilesError::AlreadyReleased`] if the handle was released earlier
    /// - [`FilesError::UnknownHandle`] if this registry never issued it
    pub fn release(&mut self, handle: &PreviewHandle) -> Result<(), FilesError> {
        if self.live.remove(handle).is_some() {
            self.released.insert(handle.clone());
            return Ok(());
        }
        if self.released.contains(handle) {
            return Err(FilesError::AlreadyReleased(handle.to_string()));
        }
        Err(FilesError::UnknownHandle(handle.to_string()))
    }

    /// Releases every handle in `handles`, continuing past failures.
    pub fn release_all<'a, I>(&mut self, handles: I) -> SweepReport
    where
        I: IntoIterator<Item = &'a PreviewHandle>,
    {
        let mut report = SweepReport::default();
        for handle in handles {
            match self.release(handle) {
                Ok(()) => report.released += 1,
                Err(e) => {
                    tracing::debug!(handle = %handle, error = %e, "preview release skipped");
                    report.failed += 1;
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

    fn upload(name: &str) -> UploadedFile {
        UploadedFile::new(name, b"%PDF-1.7\n".to_vec()).unwrap()
    }

    #[test]
    fn test_uploaded_file_rejects_blank_name() {
        let result = UploadedFile::new("  ", vec![1, 2, 3]);
        assert!(matches!(result, Err(FilesError::InvalidFileName(_))));
    }

    #[test]
    fn test_uploaded_file_from_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("xray.png");
        fs::write(&path, PNG_MAGIC).unwrap();

        let file = UploadedFile::from_path(&path).unwrap();
        assert_eq!(file.name(), "xray.png");
        assert_eq!(file.size_bytes(), PNG_MAGIC.len() as u64);
    }

    #[test]
    fn test_uploaded_file_from_missing_path() {
        let temp = TempDir::new().unwrap();
        let result = UploadedFile::from_path(&temp.path().join("missing.pdf"));
        assert!(matches!(result, Err(FilesError::Io(_))));
    }

    #[test]
    fn test_acquire_creates_distinct_live_handles() {
        let mut previews = PreviewRegistry::new();
        let a = previews.acquire(upload("a.pdf"));
        let b = previews.acquire(upload("a.pdf"));

        assert_ne!(a, b);
        assert!(a.as_str().starts_with(PREVIEW_HANDLE_PREFIX));
        assert!(previews.is_live(&a));
        assert!(previews.is_live(&b));
        assert_eq!(previews.live_count(), 2);
    }

    #[test]
    fn test_resolve_detects_media_type() {
        let mut previews = PreviewRegistry::new();
        let file = UploadedFile::new("xray.png", PNG_MAGIC.to_vec()).unwrap();
        let handle = previews.acquire(file);

        let resource = previews.resolve(&handle).unwrap();
        assert_eq!(resource.file_name, "xray.png");
        assert_eq!(resource.media_type.as_deref(), Some("image/png"));
    }

    #[test]
    fn test_release_then_release_again() {
        let mut previews = PreviewRegistry::new();
        let handle = previews.acquire(upload("cbc.pdf"));

        assert!(previews.release(&handle).is_ok());
        assert!(!previews.is_live(&handle));
        assert!(previews.resolve(&handle).is_none());
        assert!(matches!(
            previews.release(&handle),
            Err(FilesError::AlreadyReleased(_))
        ));
    }

    #[test]
    fn test_release_foreign_handle() {
        let mut previews = PreviewRegistry::new();
        let stale = PreviewHandle::from("blob:http://localhost/1234".to_owned());

        assert!(matches!(
            previews.release(&stale),
            Err(FilesError::UnknownHandle(_))
        ));
    }

    #[test]
    fn test_sweep_continues_past_double_release() {
        let mut previews = PreviewRegistry::new();
        let first = previews.acquire(upload("one.pdf"));
        let third = previews.acquire(upload("three.pdf"));

        let sweep = previews.release_all([&first, &first, &third]);

        assert_eq!(sweep, SweepReport { released: 2, failed: 1 });
        assert_eq!(previews.live_count(), 0);
    }

    #[test]
    fn test_handle_serialises_as_string() {
        let handle = PreviewHandle::from("blob:healthmate/abc".to_owned());
        assert_eq!(
            serde_json::to_string(&handle).unwrap(),
            "\"blob:healthmate/abc\""
        );
    }
}
