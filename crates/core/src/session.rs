//! The running application.
//!
//! A [`Session`] owns everything that lives for one page lifetime: the in-memory [`Document`],
//! the store it is persisted to, the preview handles created by uploads, the selected language,
//! and the shown pane. Handlers receive it by `&mut`, so there is only ever one writer.
//!
//! ## Mutation flow
//!
//! Every mutation follows the same steps:
//!
//! 1. validate the whole input, refusing with [`HealthError::Validation`] before any change
//! 2. update the document (new records go to the front of their list and of the timeline)
//! 3. save the document
//! 4. rebuild every view
//!
//! Saving is not transactional. If step 3 fails the in-memory document is already ahead of the
//! stored one; the error is returned to the caller and the views still show the in-memory
//! state. The next successful save brings the two back in line.
//!
//! ## Preview lifetime
//!
//! Uploads acquire a preview handle. All handles referenced by the document are released in one
//! sweep when the session ends, either through [`Session::end`] or when the session is dropped.
//! Individual release failures (handles from an earlier session, double releases) are logged
//! and skipped.

use crate::constants::{
    MSG_LOGIN_NAME_REQUIRED, MSG_NAME_REQUIRED, MSG_SIGNUP_NAME_REQUIRED,
    MSG_UPLOAD_FIELDS_REQUIRED, MSG_VITALS_FIELDS_REQUIRED,
};
use crate::model::{Document, Language, Report, User, VitalEntry};
use crate::navigation::{Navigator, Pane};
use crate::render::{self, RawPreview, ReportDetail, Views};
use crate::store::DocumentStore;
use crate::summary::{PlaceholderSummary, ReportDraft, SummaryGenerator};
use crate::validation::required;
use crate::{HealthError, HealthResult};
use chrono::Utc;
use healthmate_files::{PreviewRegistry, SweepReport, UploadedFile};
use healthmate_uuid::{RecordId, RecordIdGenerator};

/// Demo sign-in flows. Both simply set the current user; they differ only in wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFlow {
    Login,
    Signup,
}

impl AuthFlow {
    fn missing_name_message(self) -> &'static str {
        match self {
            AuthFlow::Login => MSG_LOGIN_NAME_REQUIRED,
            AuthFlow::Signup => MSG_SIGNUP_NAME_REQUIRED,
        }
    }

    /// Message shown after a successful sign-in.
    pub fn confirmation(self, user: &User) -> String {
        match self {
            AuthFlow::Login => format!("Welcome {} — demo login successful.", user.name),
            AuthFlow::Signup => format!("Account created for {} (demo).", user.name),
        }
    }
}

#[derive(Debug)]
pub struct Session {
    store: DocumentStore,
    document: Document,
    previews: PreviewRegistry,
    ids: RecordIdGenerator,
    summaries: Box<dyn SummaryGenerator>,
    language: Language,
    navigator: Navigator,
    views: Views,
    ended: bool,
}

impl Session {
    /// Loads the stored document and renders it.
    ///
    /// `fragment` is the location fragment the page was opened with, if any.
    pub fn open(store: DocumentStore, fragment: Option<&str>) -> Self {
        let document = store.load();
        let language = Language::default();
        let views = render::render_all(&document, language);

        tracing::info!(
            key = store.key(),
            reports = document.reports.len(),
            vitals = document.vitals.len(),
            "session opened"
        );

        Self {
            store,
            document,
            previews: PreviewRegistry::new(),
            ids: RecordIdGenerator::new(),
            summaries: Box::new(PlaceholderSummary),
            language,
            navigator: Navigator::from_fragment(fragment),
            views,
            ended: false,
        }
    }

    /// Replaces the summary generator used for future uploads.
    pub fn with_summary_generator(mut self, generator: Box<dyn SummaryGenerator>) -> Self {
        self.summaries = generator;
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn views(&self) -> &Views {
        &self.views
    }

    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn current_pane(&self) -> Pane {
        self.navigator.current()
    }

    pub fn fragment(&self) -> String {
        self.navigator.fragment()
    }

    pub fn show_pane(&mut self, pane: Pane) {
        self.navigator.show(pane);
    }

    /// Switches the summary language. Only the timeline's report rows change.
    pub fn set_language(&mut self, language: Language) {
        self.language = language;
        self.views.timeline = render::timeline(&self.document, language);
    }

    // ------------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------------

    /// Replaces the current user. No credentials are checked.
    ///
    /// # Errors
    ///
    /// - [`HealthError::Validation`] if `name` is blank (nothing changes)
    /// - a storage error if the save fails (the user is still set in memory)
    pub fn set_user(&mut self, name: &str) -> HealthResult<User> {
        self.apply_user(name, MSG_NAME_REQUIRED)
    }

    /// Demo login or signup: sets the user and shows the dashboard.
    pub fn sign_in(&mut self, flow: AuthFlow, name: &str) -> HealthResult<User> {
        let user = self.apply_user(name, flow.missing_name_message());
        if user.is_ok() {
            self.navigator.show(Pane::Dashboard);
        }
        user
    }

    fn apply_user(&mut self, name: &str, missing_name: &str) -> HealthResult<User> {
        let user = User {
            name: required(name, missing_name)?,
        };
        self.document.user = Some(user.clone());
        tracing::info!(user = %user.name, "user set");
        self.commit()?;
        Ok(user)
    }

    /// Uploads a report and shows the dashboard.
    ///
    /// # Errors
    ///
    /// - [`HealthError::Validation`] if the file is missing or `report_type`/`date` are blank;
    ///   no handle is acquired and nothing changes
    /// - a storage error if the save fails (the report is still added in memory)
    pub fn add_report(
        &mut self,
        file: Option<UploadedFile>,
        report_type: &str,
        date: &str,
    ) -> HealthResult<Report> {
        let missing = || HealthError::Validation(MSG_UPLOAD_FIELDS_REQUIRED.to_owned());
        let file = file.ok_or_else(missing)?;
        let report_type_text = required(report_type, MSG_UPLOAD_FIELDS_REQUIRED)?;
        let date_text = required(date, MSG_UPLOAD_FIELDS_REQUIRED)?;

        let ai_summary = self.summaries.summarise(&ReportDraft {
            file: &file,
            report_type: report_type_text.as_str(),
            date: date_text.as_str(),
        });

        let id = self.ids.new_id();
        let name = file.name().clone();
        let preview_url = Some(self.previews.acquire(file));

        let report = Report {
            id,
            name,
            report_type: report_type_text,
            date: date_text,
            uploaded_at: Utc::now(),
            preview_url,
            ai_summary,
        };

        self.document.prepend_report(report.clone());
        tracing::info!(id = %report.id, name = %report.name, "report added");

        self.navigator.show(Pane::Dashboard);
        self.commit()?;
        Ok(report)
    }

    /// Records today's vitals and shows the timeline.
    ///
    /// # Errors
    ///
    /// - [`HealthError::Validation`] if any field is blank (nothing changes)
    /// - a storage error if the save fails (the entry is still added in memory)
    pub fn add_vitals(&mut self, bp: &str, sugar: &str, weight: &str) -> HealthResult<VitalEntry> {
        let bp = required(bp, MSG_VITALS_FIELDS_REQUIRED)?;
        let sugar = required(sugar, MSG_VITALS_FIELDS_REQUIRED)?;
        let weight = required(weight, MSG_VITALS_FIELDS_REQUIRED)?;

        let vitals = VitalEntry {
            id: self.ids.new_id(),
            bp,
            sugar,
            weight,
            date: Utc::now().date_naive(),
        };

        self.document.prepend_vitals(vitals.clone());
        tracing::info!(id = %vitals.id, "vitals added");

        self.navigator.show(Pane::Timeline);
        self.commit()?;
        Ok(vitals)
    }

    /// Saves, then re-renders regardless of whether the save worked.
    fn commit(&mut self) -> HealthResult<()> {
        let saved = self.store.save(&self.document);
        if let Err(e) = &saved {
            tracing::error!(
                error = %e,
                "failed to save document; in-memory state is ahead of storage"
            );
        }
        self.views = render::render_all(&self.document, self.language);
        saved
    }

    // ------------------------------------------------------------------------
    // Per-report views
    // ------------------------------------------------------------------------

    /// Detail view for one report.
    ///
    /// # Errors
    ///
    /// Returns [`HealthError::ReportNotFound`] for an unknown id.
    pub fn open_report(&self, id: &RecordId) -> HealthResult<ReportDetail> {
        render::report_detail(&self.document, &self.previews, id)
    }

    /// The raw preview for one report.
    ///
    /// # Errors
    ///
    /// Returns [`HealthError::PreviewUnavailable`] if there is nothing live to show.
    pub fn open_preview(&self, id: &RecordId) -> HealthResult<RawPreview<'_>> {
        render::raw_preview(&self.document, &self.previews, id)
    }

    // ------------------------------------------------------------------------
    // Lifetime
    // ------------------------------------------------------------------------

    /// Ends the session, releasing every preview handle the document references.
    pub fn end(mut self) -> SweepReport {
        self.sweep()
    }

    fn sweep(&mut self) -> SweepReport {
        self.ended = true;
        let report = self.previews.release_all(self.document.preview_handles());
        tracing::info!(
            released = report.released,
            skipped = report.failed,
            "preview handles released"
        );
        report
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.ended {
            self.sweep();
        }
    }
}
