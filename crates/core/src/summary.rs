//! Bilingual report summaries.
//!
//! Summaries are produced by a [`SummaryGenerator`] when a report is uploaded and stored with the
//! report. The shipped [`PlaceholderSummary`] returns fixed text; a real generator can be plugged
//! into the session without touching the rest of the core.

use crate::constants::{PLACEHOLDER_SUMMARY_EN, PLACEHOLDER_SUMMARY_ROMAN};
use crate::model::AiSummary;
use healthmate_files::UploadedFile;

/// What a generator gets to look at: the report as it is about to be created.
#[derive(Debug, Clone, Copy)]
pub struct ReportDraft<'a> {
    pub file: &'a UploadedFile,
    pub report_type: &'a str,
    pub date: &'a str,
}

pub trait SummaryGenerator: std::fmt::Debug {
    fn summarise(&self, draft: &ReportDraft<'_>) -> AiSummary;
}

/// Static placeholder text, the same for every report.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceholderSummary;

impl SummaryGenerator for PlaceholderSummary {
    fn summarise(&self, _draft: &ReportDraft<'_>) -> AiSummary {
        AiSummary {
            en: PLACEHOLDER_SUMMARY_EN.to_owned(),
            roman: PLACEHOLDER_SUMMARY_ROMAN.to_owned(),
        }
    }
}
