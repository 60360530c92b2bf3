//! The persisted record model.
//!
//! A [`Document`] is the whole of a user's stored state: their reports, their vitals, the
//! timeline that merges both, and the signed-in user. It serialises to a single JSON object:
//!
//! ```json
//! {
//!   "reports":  [{ "id": "…", "name": "cbc.pdf", "type": "Blood Test", "date": "2024-01-10",
//!                  "uploadedAt": "…", "previewUrl": "blob:…", "aiSummary": { "en": "…", "roman": "…" } }],
//!   "vitals":   [{ "id": "…", "bp": "120/80", "sugar": "95", "weight": "70kg", "date": "2024-01-11" }],
//!   "timeline": [{ "type": "vitals", … }, { "type": "report", "reportType": "Blood Test", … }],
//!   "user":     { "name": "Ayesha" }
//! }
//! ```
//!
//! Lists are kept most-recent-first: new records are inserted at the front. Records are never
//! edited or removed once created.

use chrono::{DateTime, NaiveDate, Utc};
use healthmate_files::PreviewHandle;
use healthmate_types::NonEmptyText;
use healthmate_uuid::RecordId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::HealthError;

/// Display language for report summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Roman,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Roman => "roman",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = HealthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Language::En),
            "roman" => Ok(Language::Roman),
            other => Err(HealthError::Validation(format!(
                "unknown language '{}' (expected 'en' or 'roman')",
                other
            ))),
        }
    }
}

/// English and Roman Urdu summary text for a report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiSummary {
    #[serde(default)]
    pub en: String,
    #[serde(default)]
    pub roman: String,
}

impl AiSummary {
    pub fn text(&self, language: Language) -> &str {
        match language {
            Language::En => &self.en,
            Language::Roman => &self.roman,
        }
    }
}

/// An uploaded report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: RecordId,
    /// Original file name.
    pub name: NonEmptyText,
    /// Free-text category, e.g. "Blood Test".
    #[serde(rename = "type")]
    pub report_type: NonEmptyText,
    /// Report date as entered by the user.
    pub date: NonEmptyText,
    pub uploaded_at: DateTime<Utc>,
    /// Session-local preview handle. May be dead if the document was loaded from storage.
    pub preview_url: Option<PreviewHandle>,
    pub ai_summary: AiSummary,
}

/// A set of vitals recorded on a given day. Values are stored exactly as entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VitalEntry {
    pub id: RecordId,
    pub bp: NonEmptyText,
    pub sugar: NonEmptyText,
    pub weight: NonEmptyText,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: NonEmptyText,
}

/// One row of the merged timeline: a copy of a report or of a vitals entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TimelineRepr", into = "TimelineRepr")]
pub enum TimelineEntry {
    Report(Report),
    Vitals(VitalEntry),
}

impl TimelineEntry {
    pub fn id(&self) -> &RecordId {
        match self {
            TimelineEntry::Report(r) => &r.id,
            TimelineEntry::Vitals(v) => &v.id,
        }
    }

    /// The wire discriminator: `"report"` or `"vitals"`.
    pub fn kind(&self) -> &'static str {
        match self {
            TimelineEntry::Report(_) => "report",
            TimelineEntry::Vitals(_) => "vitals",
        }
    }
}

// On the wire a timeline entry is the record's own fields plus a `type` discriminator. A report
// already has a `type` field (its category), so inside the timeline the category moves to
// `reportType`.
#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum TimelineRepr {
    Report(TimelineReportRepr),
    Vitals(VitalEntry),
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimelineReportRepr {
    id: RecordId,
    name: NonEmptyText,
    report_type: NonEmptyText,
    date: NonEmptyText,
    uploaded_at: DateTime<Utc>,
    preview_url: Option<PreviewHandle>,
    ai_summary: AiSummary,
}

impl From<TimelineRepr> for TimelineEntry {
    fn from(repr: TimelineRepr) -> Self {
        match repr {
            TimelineRepr::Report(r) => TimelineEntry::Report(Report {
                id: r.id,
                name: r.name,
                report_type: r.report_type,
                date: r.date,
                uploaded_at: r.uploaded_at,
                preview_url: r.preview_url,
                ai_summary: r.ai_summary,
            }),
            TimelineRepr::Vitals(v) => TimelineEntry::Vitals(v),
        }
    }
}

impl From<TimelineEntry> for TimelineRepr {
    fn from(entry: TimelineEntry) -> Self {
        match entry {
            TimelineEntry::Report(r) => TimelineRepr::Report(TimelineReportRepr {
                id: r.id,
                name: r.name,
                report_type: r.report_type,
                date: r.date,
                uploaded_at: r.uploaded_at,
                preview_url: r.preview_url,
                ai_summary: r.ai_summary,
            }),
            TimelineEntry::Vitals(v) => TimelineRepr::Vitals(v),
        }
    }
}

/// The whole persisted state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub reports: Vec<Report>,
    pub vitals: Vec<VitalEntry>,
    pub timeline: Vec<TimelineEntry>,
    pub user: Option<User>,
}

impl Document {
    /// The canonical empty document: no reports, no vitals, no timeline, no user.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn find_report(&self, id: &RecordId) -> Option<&Report> {
        self.reports.iter().find(|r| &r.id == id)
    }

    pub fn latest_report(&self) -> Option<&Report> {
        self.reports.first()
    }

    pub fn latest_vitals(&self) -> Option<&VitalEntry> {
        self.vitals.first()
    }

    /// Every preview handle still referenced by a report.
    pub fn preview_handles(&self) -> impl Iterator<Item = &PreviewHandle> {
        self.reports.iter().filter_map(|r| r.preview_url.as_ref())
    }

    /// True when every report and every vitals entry has exactly one timeline entry and the
    /// timeline holds nothing else.
    pub fn is_consistent(&self) -> bool {
        if self.timeline.len() != self.reports.len() + self.vitals.len() {
            return false;
        }
        let count = |id: &RecordId| self.timeline.iter().filter(|e| e.id() == id).count();
        self.reports.iter().all(|r| count(&r.id) == 1)
            && self.vitals.iter().all(|v| count(&v.id) == 1)
    }

    pub(crate) fn prepend_report(&mut self, report: Report) {
        self.timeline.insert(0, TimelineEntry::Report(report.clone()));
        self.reports.insert(0, report);
    }

    pub(crate) fn prepend_vitals(&mut self, vitals: VitalEntry) {
        self.timeline.insert(0, TimelineEntry::Vitals(vitals.clone()));
        self.vitals.insert(0, vitals);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    pub(crate) fn sample_report(id: &str, name: &str, report_type: &str, date: &str) -> Report {
        Report {
            id: RecordId::parse(id).unwrap(),
            name: NonEmptyText::new(name).unwrap(),
            report_type: NonEmptyText::new(report_type).unwrap(),
            date: NonEmptyText::new(date).unwrap(),
            uploaded_at: Utc.with_ymd_and_hms(2024, 1, 10, 9, 30, 0).unwrap(),
            preview_url: None,
            ai_summary: AiSummary {
                en: format!("{} looks fine", name),
                roman: format!("{} theek hai", name),
            },
        }
    }

    pub(crate) fn sample_vitals(id: &str, bp: &str) -> VitalEntry {
        VitalEntry {
            id: RecordId::parse(id).unwrap(),
            bp: NonEmptyText::new(bp).unwrap(),
            sugar: NonEmptyText::new("95").unwrap(),
            weight: NonEmptyText::new("70kg").unwrap(),
            date: NaiveDate::from_ymd_opt(2024, 1, 11).unwrap(),
        }
    }

    #[test]
    fn test_empty_document_shape() {
        let value = serde_json::to_value(Document::empty()).unwrap();
        assert_eq!(
            value,
            json!({ "reports": [], "vitals": [], "timeline": [], "user": null })
        );
    }

    #[test]
    fn test_report_wire_names() {
        let report = sample_report("r1", "cbc.pdf", "Blood Test", "2024-01-10");
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["type"], "Blood Test");
        assert_eq!(value["name"], "cbc.pdf");
        assert_eq!(value["uploadedAt"], "2024-01-10T09:30:00Z");
        assert_eq!(value["previewUrl"], serde_json::Value::Null);
        assert_eq!(value["aiSummary"]["roman"], "cbc.pdf theek hai");
    }

    #[test]
    fn test_timeline_entries_are_tagged() {
        let report = TimelineEntry::Report(sample_report(
            "r1",
            "cbc.pdf",
            "Blood Test",
            "2024-01-10",
        ));
        let vitals = TimelineEntry::Vitals(sample_vitals("v1", "120/80"));

        let report_value = serde_json::to_value(&report).unwrap();
        assert_eq!(report_value["type"], "report");
        assert_eq!(report_value["reportType"], "Blood Test");
        assert_eq!(report_value["id"], "r1");

        let vitals_value = serde_json::to_value(&vitals).unwrap();
        assert_eq!(vitals_value["type"], "vitals");
        assert_eq!(vitals_value["bp"], "120/80");
        assert_eq!(vitals_value["date"], "2024-01-11");
    }

    #[test]
    fn test_timeline_entry_keeps_report_category() {
        let entry = TimelineEntry::Report(sample_report(
            "r1",
            "cbc.pdf",
            "Blood Test",
            "2024-01-10",
        ));
        let json = serde_json::to_string(&entry).unwrap();
        let back: TimelineEntry = serde_json::from_str(&json).unwrap();

        assert_eq!(back, entry);
        assert_eq!(back.kind(), "report");
    }

    #[test]
    fn test_unknown_timeline_kind_is_rejected() {
        let result: Result<TimelineEntry, _> =
            serde_json::from_value(json!({ "type": "note", "id": "n1" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_prepend_keeps_insertion_order_newest_first() {
        let mut doc = Document::empty();
        doc.prepend_report(sample_report("a", "a.pdf", "A", "2024-03-01"));
        doc.prepend_vitals(sample_vitals("b", "110/70"));
        doc.prepend_report(sample_report("c", "c.pdf", "C", "2020-01-01"));

        let ids: Vec<&str> = doc.timeline.iter().map(|e| e.id().as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
        assert_eq!(doc.latest_report().unwrap().id.as_str(), "c");
        assert!(doc.is_consistent());
    }

    #[test]
    fn test_inconsistent_document_detected() {
        let mut doc = Document::empty();
        doc.reports.push(sample_report("a", "a.pdf", "A", "2024-03-01"));
        assert!(!doc.is_consistent());
    }

    #[test]
    fn test_language_parse() {
        assert_eq!("en".parse::<Language>().unwrap(), Language::En);
        assert_eq!("roman".parse::<Language>().unwrap(), Language::Roman);
        assert!("urdu".parse::<Language>().is_err());
        assert_eq!(Language::default(), Language::En);
    }
}
