// crates/pulso-cli/src/main.rs
// ============================================================================
// Module: Pulso CLI Entry Point
// Description: Command dispatcher for capture, sync, and session workflows.
// Purpose: Drive the offline submission pipeline from the command line.
// Dependencies: clap, pulso-config, pulso-core, pulso-store-sqlite,
// pulso-transport, serde_json, toml
// ============================================================================

//! ## Overview
//! The Pulso CLI wires the durable store, the HTTP transport, the submission
//! queue, and the session manager from one TOML configuration file and
//! exposes the pipeline as subcommands: `login`, `logout`, `capture`,
//! `sync`, `status`, and `dashboard`. Captured responses are read from TOML
//! questionnaire files; the classification is always shown to the surveyor
//! before the record is queued.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use clap::Parser;
use clap::Subcommand;
use pulso_config::AppConfig;
use pulso_config::ConfigError;
use pulso_core::ClassificationResult;
use pulso_core::DashboardFilters;
use pulso_core::DurableStore;
use pulso_core::QueueError;
use pulso_core::Session;
use pulso_core::SessionError;
use pulso_core::SessionManager;
use pulso_core::StoreError;
use pulso_core::SubmissionQueue;
use pulso_core::SurveyResponse;
use pulso_core::SyncMode;
use pulso_core::SyncOutcome;
use pulso_core::SyncReport;
use pulso_core::Timestamp;
use pulso_core::Transport;
use pulso_core::TransportError;
use pulso_core::classify;
use pulso_core::format_timestamp;
use pulso_core::parse_rfc3339;
use pulso_core::validate;
use pulso_store_sqlite::SqliteStore;
use pulso_transport::HttpTransport;
use pulso_transport::HttpTransportConfig;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Errors
// ============================================================================

/// CLI-level errors rendered to stderr.
///
/// # Invariants
/// - Messages are complete sentences; validation lists are never truncated.
#[derive(Debug, Error)]
enum CliError {
    /// Configuration failure.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Durable store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Submission queue failure.
    #[error(transparent)]
    Queue(#[from] QueueError),
    /// Session management failure.
    #[error(transparent)]
    Session(#[from] SessionError),
    /// Transport failure.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// Questionnaire input failure.
    #[error("capture input error: {0}")]
    Input(String),
    /// No active session where one is required.
    #[error("login required: no active session")]
    LoginRequired,
    /// Session lacks the dashboard capability.
    #[error("this session is not authorized for the dashboard")]
    DashboardForbidden,
    /// Output stream failure.
    #[error("output write failed: {0}")]
    Output(String),
}

// ============================================================================
// SECTION: Arguments
// ============================================================================

/// Pulso field client.
#[derive(Debug, Parser)]
#[command(name = "pulso", version, about = "Offline-first community survey client")]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, default_value = "pulso.toml")]
    config: PathBuf,
    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Log in and silently flush queued records.
    Login {
        /// Account name.
        usuario: String,
        /// Account password.
        #[arg(long)]
        password: String,
    },
    /// Delete the cached session; queued records are untouched.
    Logout,
    /// Validate, classify, and queue a questionnaire file.
    Capture {
        /// TOML questionnaire file.
        input: PathBuf,
        /// Attempt delivery immediately after queueing.
        #[arg(long)]
        send: bool,
        /// Validate and classify without persisting.
        #[arg(long)]
        dry_run: bool,
    },
    /// Deliver pending records to the endpoint.
    Sync,
    /// Show pending count, session state, and sync telemetry.
    Status,
    /// Query the remote dashboard summary.
    Dashboard {
        /// Aggregation window in days.
        #[arg(long, default_value_t = 30)]
        window_days: u32,
        /// Restrict to one informant type label.
        #[arg(long)]
        informant: Option<String>,
        /// Restrict to one community.
        #[arg(long)]
        community: Option<String>,
    },
}

// ============================================================================
// SECTION: Pipeline Wiring
// ============================================================================

/// Fully wired pipeline components.
struct Pipeline {
    /// Submission queue over the store and transport.
    queue: SubmissionQueue,
    /// Session manager over the same store and transport.
    sessions: SessionManager,
    /// Transport handle for direct queries.
    transport: Arc<dyn Transport>,
}

/// Builds the pipeline from a configuration file.
fn build_pipeline(config_path: &Path) -> Result<Pipeline, CliError> {
    let config: AppConfig = pulso_config::load_from_path(config_path)?;
    let store: Arc<dyn DurableStore> =
        Arc::new(SqliteStore::new(&config.store).map_err(StoreError::from)?);
    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(&HttpTransportConfig {
        endpoint: config.endpoint.clone(),
        timeout_ms: config.sync.request_timeout_ms,
        probe_timeout_ms: config.sync.probe_timeout_ms,
    })?);
    let queue =
        SubmissionQueue::new(Arc::clone(&store), Arc::clone(&transport), config.sync.batch_limit);
    let sessions = SessionManager::new(Arc::clone(&store), Arc::clone(&transport));
    Ok(Pipeline {
        queue,
        sessions,
        transport,
    })
}

/// Returns the wall-clock time as a unix-millis timestamp.
fn now_timestamp() -> Timestamp {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    Timestamp::UnixMillis(i64::try_from(now.as_millis()).unwrap_or(i64::MAX))
}

// ============================================================================
// SECTION: Capture Input
// ============================================================================

/// Parses a TOML questionnaire file into a survey response.
///
/// `captured_at` accepts an RFC 3339 string; when absent the current wall
/// clock is stamped, matching the capture form's prefilled timestamp.
fn read_capture_file(path: &Path) -> Result<SurveyResponse, CliError> {
    let raw = std::fs::read_to_string(path).map_err(|err| CliError::Input(err.to_string()))?;
    let parsed: toml::Value =
        toml::from_str(&raw).map_err(|err| CliError::Input(err.to_string()))?;
    let mut value =
        serde_json::to_value(parsed).map_err(|err| CliError::Input(err.to_string()))?;
    let captured_at = match value.get("captured_at").and_then(serde_json::Value::as_str) {
        Some(text) => parse_rfc3339(text).map_err(|err| CliError::Input(err.to_string()))?,
        None => now_timestamp(),
    };
    let captured_at_value =
        serde_json::to_value(captured_at).map_err(|err| CliError::Input(err.to_string()))?;
    if let serde_json::Value::Object(map) = &mut value {
        map.insert("captured_at".to_string(), captured_at_value);
    } else {
        return Err(CliError::Input("questionnaire file must be a TOML table".to_string()));
    }
    serde_json::from_value(value).map_err(|err| CliError::Input(err.to_string()))
}

// ============================================================================
// SECTION: Command Handlers
// ============================================================================

/// Runs the selected subcommand.
fn run(cli: &Cli) -> Result<(), CliError> {
    let pipeline = build_pipeline(&cli.config)?;
    match &cli.command {
        Command::Login {
            usuario,
            password,
        } => run_login(&pipeline, usuario, password),
        Command::Logout => run_logout(&pipeline),
        Command::Capture {
            input,
            send,
            dry_run,
        } => run_capture(&pipeline, input, *send, *dry_run),
        Command::Sync => run_sync(&pipeline),
        Command::Status => run_status(&pipeline),
        Command::Dashboard {
            window_days,
            informant,
            community,
        } => run_dashboard(&pipeline, *window_days, informant.clone(), community.clone()),
    }
}

/// Handles `pulso login`.
fn run_login(pipeline: &Pipeline, usuario: &str, password: &str) -> Result<(), CliError> {
    let outcome = pipeline.sessions.login(usuario, password, now_timestamp(), &pipeline.queue)?;
    write_stdout_line(&format!(
        "logged in as {usuario} (dashboard access: {})",
        if outcome.session.can_dashboard { "yes" } else { "no" }
    ))?;
    Ok(())
}

/// Handles `pulso logout`.
fn run_logout(pipeline: &Pipeline) -> Result<(), CliError> {
    pipeline.sessions.logout()?;
    write_stdout_line("logged out; queued records are preserved")?;
    Ok(())
}

/// Handles `pulso capture`.
fn run_capture(
    pipeline: &Pipeline,
    input: &Path,
    send: bool,
    dry_run: bool,
) -> Result<(), CliError> {
    let response = read_capture_file(input)?;
    if dry_run {
        let errors = validate(&response);
        if !errors.is_empty() {
            return Err(CliError::Queue(QueueError::Rejected(errors)));
        }
        let classification = classify(&response.with_normalized_signals());
        render_classification(&classification)?;
        write_stdout_line("dry run: nothing was queued")?;
        return Ok(());
    }
    let session = require_session(pipeline)?;
    let record = pipeline.queue.create_record(&response, &session, now_timestamp())?;
    render_classification(&record.classification)?;
    write_stdout_line(&format!("queued record {}", record.record_id))?;
    if send {
        let report = pipeline.queue.sync(SyncMode::Interactive, now_timestamp())?;
        render_sync_report(&report)?;
    } else {
        write_stdout_line("record will be delivered on the next sync")?;
    }
    Ok(())
}

/// Handles `pulso sync`.
fn run_sync(pipeline: &Pipeline) -> Result<(), CliError> {
    require_session(pipeline)?;
    let report = pipeline.queue.sync(SyncMode::Interactive, now_timestamp())?;
    render_sync_report(&report)?;
    Ok(())
}

/// Handles `pulso status`.
fn run_status(pipeline: &Pipeline) -> Result<(), CliError> {
    let session = pipeline.sessions.load()?;
    let pending = pipeline.queue.pending_count()?;
    let telemetry = pipeline.queue.telemetry();
    write_stdout_line(&format!(
        "session: {}",
        session.map_or_else(|| "none".to_string(), |s| format!(
            "active (dashboard access: {})",
            if s.can_dashboard { "yes" } else { "no" }
        ))
    ))?;
    write_stdout_line(&format!("pending records: {pending}"))?;
    write_stdout_line(&format!(
        "sync passes: {} (delivered {}, failed {}, offline aborts {})",
        telemetry.passes_started,
        telemetry.delivered_total,
        telemetry.failed_total,
        telemetry.offline_aborts
    ))?;
    if let (Some(outcome), Some(at)) = (telemetry.last_outcome, telemetry.last_pass_at) {
        write_stdout_line(&format!("last pass: {outcome} at {}", format_timestamp(at)))?;
    }
    Ok(())
}

/// Handles `pulso dashboard`.
fn run_dashboard(
    pipeline: &Pipeline,
    window_days: u32,
    informant: Option<String>,
    community: Option<String>,
) -> Result<(), CliError> {
    let session = require_session(pipeline)?;
    if !session.can_dashboard {
        return Err(CliError::DashboardForbidden);
    }
    let filters = DashboardFilters {
        informant,
        community,
    };
    let summary = pipeline.transport.dashboard_summary(&session.token, window_days, &filters)?;
    if let Some(semaphore) = &summary.semaphore {
        write_stdout_line(&format!(
            "system semaphore: {} (mean daily score {:.2})",
            semaphore.color.label(),
            semaphore.mean_daily_score
        ))?;
        for line in &semaphore.rationale {
            write_stdout_line(&format!("  - {line}"))?;
        }
    } else {
        write_stdout_line("system semaphore: no data in window")?;
    }
    write_stdout_line(&format!(
        "responses {} | surveys {} | informants {} | avg score {:.2}",
        summary.kpi.responses, summary.kpi.surveys, summary.kpi.informants, summary.kpi.avg_score
    ))?;
    for (day, score) in &summary.by_day {
        write_stdout_line(&format!("  {day}: {score:.2}"))?;
    }
    Ok(())
}

/// Loads the cached session or fails with a login hint.
fn require_session(pipeline: &Pipeline) -> Result<Session, CliError> {
    pipeline.sessions.load()?.ok_or(CliError::LoginRequired)
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders a classification result to stdout.
fn render_classification(classification: &ClassificationResult) -> Result<(), CliError> {
    write_stdout_line(&format!("semaphore: {}", classification.semaphore.label()))?;
    if let Some(score) = classification.score {
        write_stdout_line(&format!("score: {score}"))?;
    }
    for trigger in &classification.triggers {
        write_stdout_line(&format!("trigger: {}", trigger.description()))?;
    }
    write_stdout_line(&format!("reliability: {}", classification.reliability))?;
    Ok(())
}

/// Renders an interactive sync report to stdout.
fn render_sync_report(report: &SyncReport) -> Result<(), CliError> {
    match report.outcome {
        SyncOutcome::NothingPending => write_stdout_line("nothing to deliver")?,
        SyncOutcome::Offline => {
            write_stdout_line("offline: pending records were left untouched")?;
        }
        SyncOutcome::Completed => {
            if report.failed == 0 {
                write_stdout_line(&format!("sync complete: delivered {}", report.delivered))?;
            } else {
                write_stdout_line(&format!(
                    "sync partial: delivered {}, failed {} (failed records stay pending)",
                    report.delivered, report.failed
                ))?;
            }
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> Result<(), CliError> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}").map_err(|err| CliError::Output(err.to_string()))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) {
    let mut stderr = std::io::stderr();
    let _ = writeln!(&mut stderr, "{message}");
}

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Entry point: parse arguments, run, and map errors to the exit code.
fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Queue(QueueError::Rejected(errors))) => {
            write_stderr_line("the response is incomplete:");
            for error in errors {
                write_stderr_line(&format!("  - {error}"));
            }
            ExitCode::FAILURE
        }
        Err(err) => {
            write_stderr_line(&err.to_string());
            ExitCode::FAILURE
        }
    }
}
