//! Read-only projections of the [`Document`] into view models.
//!
//! Nothing in this module mutates the document. After every mutation the session rebuilds all
//! four list projections from scratch with [`render_all`]; there is no incremental update.
//!
//! | projection        | source                         | language-aware |
//! |-------------------|--------------------------------|----------------|
//! | [`report_list`]   | `reports`, newest first        | no             |
//! | [`timeline`]      | `timeline`, newest first       | report rows    |
//! | [`dashboard`]     | first report / first vitals    | no             |
//! | [`summary_pane`]  | first report                   | shows both     |
//!
//! The detail view ([`report_detail`]) and the raw preview ([`raw_preview`]) are rendered on
//! demand for a single report id.

use crate::constants::{
    DASHBOARD_EMPTY, DOCUMENT_SUFFIXES, IMAGE_SUFFIXES, NO_PREVIEW, NO_REPORTS,
    NO_TIMELINE_ITEMS, SUMMARY_EMPTY,
};
use crate::model::{Document, Language, Report, TimelineEntry};
use crate::{HealthError, HealthResult};
use chrono::Local;
use healthmate_files::{PreviewHandle, PreviewRegistry, PreviewResource};
use healthmate_uuid::RecordId;

/// Everything the UI shows outside the detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Views {
    pub reports: ReportListView,
    pub timeline: TimelineView,
    pub dashboard: DashboardView,
    pub summary: SummaryView,
}

/// Rebuilds every list projection.
pub fn render_all(doc: &Document, language: Language) -> Views {
    Views {
        reports: report_list(doc),
        timeline: timeline(doc, language),
        dashboard: dashboard(doc),
        summary: summary_pane(doc),
    }
}

// ============================================================================
// REPORT LIST
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportAction {
    OpenDetail(RecordId),
    OpenPreview(RecordId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub id: RecordId,
    pub report_type: String,
    pub name: String,
    pub date: String,
}

impl ReportRow {
    pub fn actions(&self) -> [ReportAction; 2] {
        [
            ReportAction::OpenDetail(self.id.clone()),
            ReportAction::OpenPreview(self.id.clone()),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportListView {
    pub rows: Vec<ReportRow>,
}

impl ReportListView {
    /// Text to show instead of rows when there are none.
    pub fn placeholder(&self) -> Option<&'static str> {
        self.rows.is_empty().then_some(NO_REPORTS)
    }
}

pub fn report_list(doc: &Document) -> ReportListView {
    ReportListView {
        rows: doc
            .reports
            .iter()
            .map(|r| ReportRow {
                id: r.id.clone(),
                report_type: r.report_type.to_string(),
                name: r.name.to_string(),
                date: r.date.to_string(),
            })
            .collect(),
    }
}

// ============================================================================
// TIMELINE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineRow {
    Report {
        id: RecordId,
        report_type: String,
        name: String,
        date: String,
        /// Summary in the selected language.
        summary: String,
    },
    Vitals {
        id: RecordId,
        bp: String,
        sugar: String,
        weight: String,
        date: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimelineView {
    pub language: Language,
    pub rows: Vec<TimelineRow>,
}

impl TimelineView {
    pub fn placeholder(&self) -> Option<&'static str> {
        self.rows.is_empty().then_some(NO_TIMELINE_ITEMS)
    }
}

pub fn timeline(doc: &Document, language: Language) -> TimelineView {
    let rows = doc
        .timeline
        .iter()
        .map(|entry| match entry {
            TimelineEntry::Report(r) => TimelineRow::Report {
                id: r.id.clone(),
                report_type: r.report_type.to_string(),
                name: r.name.to_string(),
                date: r.date.to_string(),
                summary: r.ai_summary.text(language).to_owned(),
            },
            TimelineEntry::Vitals(v) => TimelineRow::Vitals {
                id: v.id.clone(),
                bp: v.bp.to_string(),
                sugar: v.sugar.to_string(),
                weight: v.weight.to_string(),
                date: v.date.to_string(),
            },
        })
        .collect();

    TimelineView { language, rows }
}

// ============================================================================
// DASHBOARD & SUMMARY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    pub report_count: usize,
    pub last_bp: String,
    pub last_update: String,
}

pub fn dashboard(doc: &Document) -> DashboardView {
    let last_bp = doc
        .latest_vitals()
        .map(|v| v.bp.to_string())
        .unwrap_or_else(|| DASHBOARD_EMPTY.to_owned());

    let last_update = doc
        .latest_report()
        .map(|r| r.date.to_string())
        .or_else(|| doc.latest_vitals().map(|v| v.date.to_string()))
        .unwrap_or_else(|| DASHBOARD_EMPTY.to_owned());

    DashboardView {
        report_count: doc.reports.len(),
        last_bp,
        last_update,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryView {
    pub english: String,
    pub roman: String,
}

/// Summary of the most recent report, in both languages.
pub fn summary_pane(doc: &Document) -> SummaryView {
    let latest = doc.latest_report();
    let or_empty = |text: Option<&str>| {
        text.filter(|t| !t.is_empty())
            .unwrap_or(SUMMARY_EMPTY)
            .to_owned()
    };

    SummaryView {
        english: or_empty(latest.map(|r| r.ai_summary.en.as_str())),
        roman: or_empty(latest.map(|r| r.ai_summary.roman.as_str())),
    }
}

// ============================================================================
// DETAIL & PREVIEW
// ============================================================================

/// How a file can be shown, judged by its name alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewKind {
    EmbeddedDocument,
    Image,
}

/// Picks a preview kind from the file-name suffix (case-insensitive).
pub fn preview_kind(file_name: &str) -> Option<PreviewKind> {
    let (_, ext) = file_name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    if DOCUMENT_SUFFIXES.contains(&ext.as_str()) {
        Some(PreviewKind::EmbeddedDocument)
    } else if IMAGE_SUFFIXES.contains(&ext.as_str()) {
        Some(PreviewKind::Image)
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewView {
    EmbeddedDocument { handle: PreviewHandle },
    Image { handle: PreviewHandle, alt: String },
    Unavailable,
}

impl PreviewView {
    /// Text to show when there is nothing to embed.
    pub fn placeholder(&self) -> Option<&'static str> {
        matches!(self, PreviewView::Unavailable).then_some(NO_PREVIEW)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDetail {
    pub id: RecordId,
    pub title: String,
    pub meta: String,
    pub preview: PreviewView,
    pub summary_en: String,
    pub summary_roman: String,
}

/// Renders the detail view for one report.
///
/// # Errors
///
/// Returns [`HealthError::ReportNotFound`] if no report has exactly this id.
pub fn report_detail(
    doc: &Document,
    previews: &PreviewRegistry,
    id: &RecordId,
) -> HealthResult<ReportDetail> {
    let report = doc
        .find_report(id)
        .ok_or_else(|| HealthError::ReportNotFound(id.to_string()))?;

    let uploaded = report
        .uploaded_at
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S");

    Ok(ReportDetail {
        id: report.id.clone(),
        title: format!("{} — {}", report.report_type, report.name),
        meta: format!("Date: {} • Uploaded: {}", report.date, uploaded),
        preview: preview_view(report, previews),
        summary_en: report.ai_summary.en.clone(),
        summary_roman: report.ai_summary.roman.clone(),
    })
}

fn preview_view(report: &Report, previews: &PreviewRegistry) -> PreviewView {
    let Some(handle) = report.preview_url.as_ref().filter(|h| previews.is_live(h)) else {
        return PreviewView::Unavailable;
    };

    match preview_kind(report.name.as_str()) {
        Some(PreviewKind::EmbeddedDocument) => PreviewView::EmbeddedDocument {
            handle: handle.clone(),
        },
        Some(PreviewKind::Image) => PreviewView::Image {
            handle: handle.clone(),
            alt: report.name.to_string(),
        },
        None => PreviewView::Unavailable,
    }
}

/// A live preview ready to be opened on its own.
#[derive(Debug, Clone, Copy)]
pub struct RawPreview<'a> {
    pub handle: &'a PreviewHandle,
    pub resource: &'a PreviewResource,
}

/// Resolves the raw preview for one report.
///
/// # Errors
///
/// Returns [`HealthError::PreviewUnavailable`] if the report does not exist, has no handle, or
/// its handle is no longer live.
pub fn raw_preview<'a>(
    doc: &'a Document,
    previews: &'a PreviewRegistry,
    id: &RecordId,
) -> HealthResult<RawPreview<'a>> {
    doc.find_report(id)
        .and_then(|r| r.preview_url.as_ref())
        .and_then(|handle| {
            previews
                .resolve(handle)
                .map(|resource| RawPreview { handle, resource })
        })
        .ok_or_else(|| HealthError::PreviewUnavailable(id.to_string()))
}
