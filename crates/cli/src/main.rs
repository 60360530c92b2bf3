//! `healthmate`: command-line host for the HealthMate record.
//!
//! Each invocation is one session: the stored document is loaded, one action runs, the
//! resulting views are printed, and the session ends, releasing any preview handles it
//! created. Previews therefore only exist within a single invocation (see `upload --show` and
//! `upload --preview-out`).
//!
//! Refusals (invalid input, unknown report, no preview) print their message and exit 0. Any
//! other failure, a failed save included, makes the process exit non-zero.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use healthmate_core::config::data_dir_from_env_value;
use healthmate_core::render::{
    DashboardView, PreviewView, ReportDetail, ReportListView, SummaryView, TimelineRow,
    TimelineView,
};
use healthmate_core::{
    constants::{MSG_REPORT_UPLOADED, MSG_VITALS_ADDED},
    AuthFlow, CoreConfig, DocumentStore, HealthError, Language, Pane, RecordId, Session,
    UploadedFile,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "healthmate")]
#[command(about = "HealthMate personal health record (demo)")]
struct Cli {
    /// Directory holding the stored document (overrides HEALTHMATE_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Location fragment to restore, e.g. "#timeline"
    #[arg(long, global = true)]
    fragment: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum LangArg {
    En,
    Roman,
}

impl From<LangArg> for Language {
    fn from(value: LangArg) -> Self {
        match value {
            LangArg::En => Language::En,
            LangArg::Roman => Language::Roman,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Demo login (no password check)
    Login {
        #[arg(default_value = "")]
        name: String,
    },
    /// Demo signup (no password check)
    Signup {
        #[arg(default_value = "")]
        name: String,
    },
    /// Upload a report file
    Upload {
        /// Report file to upload
        #[arg(long)]
        file: Option<PathBuf>,
        /// Report category, e.g. "Blood Test"
        #[arg(long = "type", default_value = "")]
        report_type: String,
        /// Report date (YYYY-MM-DD)
        #[arg(long, default_value = "")]
        date: String,
        /// Show the detail view, including the preview, right after uploading
        #[arg(long)]
        show: bool,
        /// Write the uploaded report's raw preview to this path
        #[arg(long)]
        preview_out: Option<PathBuf>,
    },
    /// Record today's vitals
    Vitals {
        #[arg(long, default_value = "")]
        bp: String,
        #[arg(long, default_value = "")]
        sugar: String,
        #[arg(long, default_value = "")]
        weight: String,
    },
    /// List uploaded reports
    Reports,
    /// Show the timeline
    Timeline {
        #[arg(long, value_enum, default_value = "en")]
        lang: LangArg,
    },
    /// Show the dashboard
    Dashboard,
    /// Show the summary of the latest report
    Summary,
    /// Show a report in full
    Show { id: String },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("healthmate=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let data_dir = cli
        .data_dir
        .unwrap_or_else(|| data_dir_from_env_value(std::env::var("HEALTHMATE_DATA_DIR").ok()));
    let cfg = CoreConfig::new(data_dir)?;
    tracing::debug!(
        data_dir = %cfg.data_dir().display(),
        key = cfg.storage_key(),
        "configuration resolved"
    );

    let Some(command) = cli.command else {
        println!("Use 'healthmate --help' for commands");
        return Ok(());
    };

    let mut session = Session::open(DocumentStore::from_config(&cfg), cli.fragment.as_deref());
    let outcome = run(&mut session, command);
    println!("({})", session.fragment());
    session.end();

    finish(outcome)
}

/// Refusals are reported and the invocation still succeeds; anything else is an error exit.
fn finish(outcome: Result<(), HealthError>) -> anyhow::Result<()> {
    match outcome {
        Ok(()) => Ok(()),
        Err(e) if is_refusal(&e) => {
            eprintln!("{}", e);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn is_refusal(e: &HealthError) -> bool {
    e.is_validation()
        || matches!(
            e,
            HealthError::ReportNotFound(_) | HealthError::PreviewUnavailable(_)
        )
}

fn run(session: &mut Session, command: Commands) -> Result<(), HealthError> {
    match command {
        Commands::Login { name } => sign_in(session, AuthFlow::Login, &name),
        Commands::Signup { name } => sign_in(session, AuthFlow::Signup, &name),
        Commands::Upload {
            file,
            report_type,
            date,
            show,
            preview_out,
        } => {
            let file = file.as_deref().map(UploadedFile::from_path).transpose()?;
            let report = session.add_report(file, &report_type, &date)?;
            println!("{}", MSG_REPORT_UPLOADED);
            print_dashboard(&session.views().dashboard);
            if show {
                print_detail(&session.open_report(&report.id)?);
            }
            if let Some(path) = preview_out {
                write_preview(session, &report.id, &path)?;
            }
            Ok(())
        }
        Commands::Vitals { bp, sugar, weight } => {
            session.add_vitals(&bp, &sugar, &weight)?;
            println!("{}", MSG_VITALS_ADDED);
            print_timeline(&session.views().timeline);
            Ok(())
        }
        Commands::Reports => {
            session.show_pane(Pane::Reports);
            print_reports(&session.views().reports);
            Ok(())
        }
        Commands::Timeline { lang } => {
            session.set_language(lang.into());
            session.show_pane(Pane::Timeline);
            print_timeline(&session.views().timeline);
            Ok(())
        }
        Commands::Dashboard => {
            session.show_pane(Pane::Dashboard);
            print_dashboard(&session.views().dashboard);
            Ok(())
        }
        Commands::Summary => {
            session.show_pane(Pane::Summary);
            print_summary(&session.views().summary);
            Ok(())
        }
        Commands::Show { id } => {
            let id = parse_id(&id)?;
            print_detail(&session.open_report(&id)?);
            Ok(())
        }
    }
}

fn write_preview(session: &Session, id: &RecordId, path: &Path) -> Result<(), HealthError> {
    let preview = session.open_preview(id)?;
    std::fs::write(path, &preview.resource.bytes).map_err(|e| HealthError::Files(e.into()))?;
    println!(
        "Wrote {} ({}, {} bytes) from {} to {}",
        preview.resource.file_name,
        preview
            .resource
            .media_type
            .as_deref()
            .unwrap_or("unknown type"),
        preview.resource.bytes.len(),
        preview.handle,
        path.display()
    );
    Ok(())
}

// An id that cannot be a record id cannot match a report either.
fn parse_id(id: &str) -> Result<RecordId, HealthError> {
    RecordId::parse(id).map_err(|_| HealthError::ReportNotFound(id.to_owned()))
}

fn sign_in(session: &mut Session, flow: AuthFlow, name: &str) -> Result<(), HealthError> {
    let user = session.sign_in(flow, name)?;
    println!("{}", flow.confirmation(&user));
    print_dashboard(&session.views().dashboard);
    Ok(())
}

fn print_reports(view: &ReportListView) {
    if let Some(placeholder) = view.placeholder() {
        println!("{}", placeholder);
        return;
    }
    for row in &view.rows {
        println!("{} — {}  [{}]", row.report_type, row.name, row.id);
        println!("    {}", row.date);
    }
}

fn print_timeline(view: &TimelineView) {
    if let Some(placeholder) = view.placeholder() {
        println!("{}", placeholder);
        return;
    }
    for row in &view.rows {
        match row {
            TimelineRow::Report {
                id,
                report_type,
                name,
                date,
                summary,
            } => {
                println!("REPORT — {} • {}  [{}]", report_type, name, id);
                println!("    {}", date);
                println!("    {}", summary);
            }
            TimelineRow::Vitals {
                bp,
                sugar,
                weight,
                date,
                ..
            } => {
                println!("VITALS");
                println!(
                    "    BP: {} • Sugar: {} • Weight: {} • {}",
                    bp, sugar, weight, date
                );
            }
        }
    }
}

fn print_dashboard(view: &DashboardView) {
    println!("Reports: {}", view.report_count);
    println!("Last BP: {}", view.last_bp);
    println!("Last update: {}", view.last_update);
}

fn print_summary(view: &SummaryView) {
    println!("English: {}", view.english);
    println!("Roman Urdu: {}", view.roman);
}

fn print_detail(detail: &ReportDetail) {
    println!("{}", detail.title);
    println!("{}", detail.meta);
    match &detail.preview {
        PreviewView::EmbeddedDocument { handle } => println!("[document preview: {}]", handle),
        PreviewView::Image { handle, alt } => println!("[image preview: {} ({})]", handle, alt),
        PreviewView::Unavailable => {
            println!("{}", detail.preview.placeholder().unwrap_or_default())
        }
    }
    println!("AI Summary");
    println!("{}", detail.summary_en);
    println!("Roman: {}", detail.summary_roman);
}
