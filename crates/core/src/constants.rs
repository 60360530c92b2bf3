//! Constants used throughout the HealthMate core crate.
//!
//! Storage names, sentinels, and every user-facing message live here so that the render layer,
//! the session, and the CLI agree on wording.

/// Storage key for the persisted document. Bump the version suffix whenever the schema changes;
/// there is no in-place migration.
pub const STORAGE_KEY: &str = "healthmate_data_v1";

/// Default directory for the file-backed key-value store.
pub const DEFAULT_DATA_DIR: &str = "healthmate_data";

/// Extension given to each key's file in the file-backed store.
pub const SLOT_FILE_EXTENSION: &str = "json";

/// Dashboard value shown when there is nothing to report.
pub const DASHBOARD_EMPTY: &str = "--";

/// Summary pane value shown when no report has been uploaded.
pub const SUMMARY_EMPTY: &str = "—";

pub const NO_REPORTS: &str = "No reports uploaded yet.";
pub const NO_TIMELINE_ITEMS: &str = "No timeline items yet.";
pub const NO_PREVIEW: &str = "No preview available.";

pub const PLACEHOLDER_SUMMARY_EN: &str =
    "AI summary placeholder: This report appears normal. Continue healthy diet.";
pub const PLACEHOLDER_SUMMARY_ROMAN: &str =
    "AI ka khulasa: Report theek nazar aata hai. Sehatmand ghiza jari rakhein.";

pub const MSG_LOGIN_NAME_REQUIRED: &str = "Enter name to login (demo).";
pub const MSG_SIGNUP_NAME_REQUIRED: &str = "Enter name to signup (demo).";
pub const MSG_NAME_REQUIRED: &str = "Enter a name (demo).";
pub const MSG_UPLOAD_FIELDS_REQUIRED: &str = "Please choose file, type and date.";
pub const MSG_VITALS_FIELDS_REQUIRED: &str = "Please fill all vitals fields.";
pub const MSG_REPORT_UPLOADED: &str = "Report uploaded locally ✅ (preview available).";
pub const MSG_VITALS_ADDED: &str = "Vitals added ✅";

/// File-name suffixes rendered as an embedded document.
pub const DOCUMENT_SUFFIXES: &[&str] = &["pdf"];

/// File-name suffixes rendered as an inline image.
pub const IMAGE_SUFFIXES: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp", "svg"];
