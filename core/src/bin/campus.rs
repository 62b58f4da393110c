//! Campus CLI
//!
//! Command-line front end for the campus events API:
//! - Browse colleges, students, events and registrations
//! - Show the dashboard counters and reports
//! - Register students, mark attendance and collect feedback
//!
//! Results are printed as pretty JSON on stdout. Toasts and logs go to
//! stderr.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{ArgGroup, Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, warn};

use campus_core::logging::init_logging;
use campus_core::utils::{format_date, format_rating, Debouncer};
use campus_core::{
    ApiService, AppState, AttendanceForm, Config, Controller, EventForm, FeedbackForm, Notifier,
    ReqwestTransport, SelectionForm, StudentForm, ToastKind,
};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "campus")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Campus events dashboard on the command line")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL (overrides config and CAMPUS_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Config file (default: <config dir>/campus/config.toml, then ./campus.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check that the API is up
    Health,

    /// List colleges
    Colleges,

    /// List students
    Students {
        /// Case-insensitive match on name or email
        #[arg(short, long)]
        search: Option<String>,
        /// Read search terms from stdin, printing matches as typing settles
        #[arg(long)]
        watch: bool,
    },

    /// List events
    Events {
        /// Only events hosted by this college
        #[arg(short, long)]
        college: Option<i64>,
    },

    /// List registrations for a student or an event
    #[command(group(ArgGroup::new("target").required(true).args(["student", "event"])))]
    Registrations {
        #[arg(long)]
        student: Option<i64>,
        #[arg(long)]
        event: Option<i64>,
    },

    /// Dashboard counters
    Dashboard,

    /// Popularity, participation and top-student reports
    Reports,

    /// Attendance report for an event
    Attendance { event: i64 },

    /// Feedback for an event with its average rating
    Feedback { event: i64 },

    /// Add a student
    AddStudent {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        college: String,
    },

    /// Add an event
    AddEvent {
        #[arg(long, default_value = "")]
        name: String,
        /// Workshop, Seminar, Hackathon, ...
        #[arg(long = "type", default_value = "")]
        event_type: String,
        /// e.g. 2026-03-05T14:30
        #[arg(long, default_value = "")]
        date: String,
        #[arg(long, default_value = "")]
        capacity: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        college: String,
        #[arg(long, default_value = "")]
        created_by: String,
    },

    /// Register a student for an event
    Register { student: String, event: String },

    /// Mark a registered student as present (or absent)
    Attend {
        student: String,
        event: String,
        #[arg(long)]
        absent: bool,
    },

    /// Rate an event on behalf of a registered student
    Rate {
        student: String,
        event: String,
        /// 1 to 5
        rating: String,
        #[arg(long, default_value = "")]
        comment: String,
    },
}

/// Toasts to stderr; the loading indicator is a debug log line.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn show_loading(&self) {
        tracing::debug!("loading");
    }

    fn toast(&self, message: &str, kind: ToastKind) {
        match kind {
            ToastKind::Success => eprintln!("✓ {message}"),
            ToastKind::Error => eprintln!("✗ {message}"),
        }
    }
}

type Campus = Controller<ReqwestTransport, ConsoleNotifier>;

fn load_config(cli: &Cli) -> Result<Config, campus_core::ConfigError> {
    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    Ok(config)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = init_logging(&config.logging) {
        eprintln!("{e}");
    }

    match run(cli.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "command failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config: &Config) -> CliResult {
    let api = ApiService::new(&config.api.base_url)?;
    let mut c: Campus = Controller::new(api, ConsoleNotifier);

    match command {
        Commands::Health => match c.api().health().await {
            Ok(health) => print_json(&health),
            Err(e) => {
                c.notifier().toast(&e.to_string(), ToastKind::Error);
                Err(e.into())
            }
        },

        Commands::Colleges => print_json(c.load_colleges().await?),

        Commands::Students { search, watch } => {
            c.load_students().await?;
            if watch {
                return watch_search(c.state().clone(), config.ui.search_debounce()).await;
            }
            print_json(&c.state().search_students(search.as_deref().unwrap_or("")))
        }

        Commands::Events { college } => {
            c.load_events().await?;
            print_json(&c.state().filter_events(college))
        }

        Commands::Registrations { student, event } => {
            let registrations = match (student, event) {
                (Some(student_id), _) => c.student_registrations(student_id).await?,
                (None, Some(event_id)) => c.event_registrations(event_id).await?,
                (None, None) => Vec::new(),
            };
            print_json(&registrations)
        }

        Commands::Dashboard => print_json(&c.initialize().await?),

        Commands::Reports => print_json(c.load_reports().await?),

        Commands::Attendance { event } => {
            let report = c.event_attendance(event).await?;
            let records: Vec<_> = report
                .attendance_records
                .iter()
                .map(|r| {
                    json!({
                        "student": r.student_name,
                        "email": r.student_email,
                        "attended": r.attendance.attended,
                        "marked_at": format_date(Some(&r.attendance.timestamp)),
                    })
                })
                .collect();
            print_json(&json!({
                "event": report.event.name,
                "date": format_date(Some(&report.event.date)),
                "summary": report.summary,
                "records": records,
            }))
        }

        Commands::Feedback { event } => {
            let summary = c.event_feedback(event).await?;
            let entries: Vec<_> = summary
                .feedback
                .iter()
                .map(|f| {
                    json!({
                        "student": f.registration.student.name,
                        "rating": format_rating(f.feedback.rating),
                        "comment": f.feedback.comment.as_deref().unwrap_or("No comment"),
                    })
                })
                .collect();
            print_json(&json!({
                "total": summary.total,
                "average_rating": summary.average_rating,
                "feedback": entries,
            }))
        }

        Commands::AddStudent {
            name,
            email,
            college,
        } => {
            let form = StudentForm {
                name,
                email,
                college_id: college,
            };
            print_json(&c.add_student(&form).await?)
        }

        Commands::AddEvent {
            name,
            event_type,
            date,
            capacity,
            description,
            college,
            created_by,
        } => {
            let form = EventForm {
                name,
                event_type,
                date,
                capacity,
                description,
                college_id: college,
                created_by,
            };
            print_json(&c.add_event(&form).await?)
        }

        Commands::Register { student, event } => {
            let form = SelectionForm {
                student_id: student,
                event_id: event,
            };
            print_json(&c.add_registration(&form).await?)
        }

        Commands::Attend {
            student,
            event,
            absent,
        } => {
            let form = AttendanceForm {
                selection: SelectionForm {
                    student_id: student,
                    event_id: event,
                },
                attended: if absent { "0" } else { "1" }.to_string(),
            };
            print_json(&c.mark_attendance(&form).await?)
        }

        Commands::Rate {
            student,
            event,
            rating,
            comment,
        } => {
            let form = FeedbackForm {
                selection: SelectionForm {
                    student_id: student,
                    event_id: event,
                },
                rating,
                comment,
            };
            print_json(&c.submit_feedback(&form).await?)
        }
    }
}

/// Search-as-you-type over stdin: each line replaces the pending term and
/// matches print once input has been quiet for `wait`.
async fn watch_search(state: AppState, wait: Duration) -> CliResult {
    let debouncer = Debouncer::new(wait, move |term: String| {
        match serde_json::to_string(&state.search_students(&term)) {
            Ok(line) => println!("{line}"),
            Err(e) => warn!(error = %e, "failed to render matches"),
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        debouncer.call(line);
    }
    while debouncer.is_pending() {
        tokio::time::sleep(debouncer.wait()).await;
    }
    Ok(())
}
