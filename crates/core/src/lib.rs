//! # HealthMate Core
//!
//! Core logic for the HealthMate personal health record.
//!
//! A single user uploads report files, records vitals, and browses a timeline that merges the
//! two. All state is one JSON [`Document`] kept in a local key-value slot.
//!
//! - [`store`]: load/save of the document, with a corrupt-or-missing fallback to empty
//! - [`model`]: reports, vitals, the tagged timeline, and the user
//! - [`session`]: the owned application state and every mutation
//! - [`render`]: read-only projections for the report list, timeline, dashboard, and summary
//! - [`navigation`]: panes and location fragments
//! - [`summary`]: the pluggable bilingual summary generator
//!
//! **No UI concerns**: printing, prompts, and argument parsing belong in `healthmate-cli`.

pub mod config;
pub mod constants;
pub mod error;
pub mod model;
pub mod navigation;
pub mod render;
pub mod session;
pub mod store;
pub mod summary;
pub mod validation;

pub use config::CoreConfig;
pub use error::{HealthError, HealthResult};
pub use model::{AiSummary, Document, Language, Report, TimelineEntry, User, VitalEntry};
pub use navigation::{Navigator, Pane};
pub use render::Views;
pub use session::{AuthFlow, Session};
pub use store::{DocumentStore, FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use summary::{PlaceholderSummary, ReportDraft, SummaryGenerator};

pub use healthmate_files::{PreviewHandle, SweepReport, UploadedFile};
pub use healthmate_types::NonEmptyText;
pub use healthmate_uuid::RecordId;
