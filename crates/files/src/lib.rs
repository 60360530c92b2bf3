//! HealthMate preview resources
//!
//! Uploaded report files are never copied into the persisted document. Instead each upload is
//! registered with a [`PreviewRegistry`], which hands back a [`PreviewHandle`]: a short,
//! session-local reference that the render layer can use to show the file inline (images) or
//! embedded (PDFs).
//!
//! ## Lifecycle
//!
//! - [`PreviewRegistry::acquire`] creates exactly one handle per upload.
//! - [`PreviewRegistry::release`] invalidates a handle. Releasing twice is an error.
//! - [`PreviewRegistry::release_all`] is the end-of-session sweep. It swallows individual
//!   failures so that one bad handle never blocks the rest.
//!
//! Handles do not survive the session that created them. A handle read back from storage after
//! a restart resolves to nothing, and callers must treat that as "no preview available".
//!
//! ## Example Usage
//!
//! ```
//! use healthmate_files::{PreviewRegistry, UploadedFile};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut previews = PreviewRegistry::new();
//! let file = UploadedFile::new("cbc.pdf", b"%PDF-1.7".to_vec())?;
//! let handle = previews.acquire(file);
//! assert!(previews.is_live(&handle));
//!
//! let sweep = previews.release_all([&handle, &handle]);
//! assert_eq!(sweep.released, 1);
//! assert_eq!(sweep.failed, 1);
//! # Ok(())
//! # }
//! ```

mod previews;

pub use previews::{
    PreviewHandle, PreviewRegistry, PreviewResource, SweepReport, UploadedFile,
    PREVIEW_HANDLE_PREFIX,
};

/// Errors that can occur while managing preview resources
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// The uploaded file has no usable name
    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    /// The handle was released earlier in this session
    #[error("Preview handle already released: {0}")]
    AlreadyReleased(String),

    /// The handle was never issued by this registry (for example, it was stored by an earlier
    /// session)
    #[error("Unknown preview handle: {0}")]
    UnknownHandle(String),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
