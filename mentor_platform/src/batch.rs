//! Batch mode: run many mentoring sessions described in a TOML file.
//!
//! Sessions run concurrently under a semaphore, each inside its own bounded
//! wait, with optional retries. A summary is printed at the end and the full
//! results can be written out as JSON.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    orchestrator::Orchestrator,
    session::{SessionRequest, SessionService, SessionType},
    settings::Settings,
    student::{ClassYear, Intake},
    wait::{BoundedWait, WaitOutcome},
};

/// Batch job configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    pub job: JobMetadata,
    #[serde(default)]
    pub settings: BatchSettings,
    #[serde(default)]
    pub sessions: Vec<SessionEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobMetadata {
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_version")]
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSettings {
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_sessions: usize,
    pub output_file: Option<PathBuf>,
    /// Skip sessions not yet started once one fails.
    #[serde(default)]
    pub fail_fast: bool,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            max_concurrent_sessions: default_max_concurrent(),
            output_file: None,
            fail_fast: false,
        }
    }
}

/// One `[[sessions]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEntry {
    pub id: String,
    pub student_id: String,
    #[serde(default)]
    pub year: ClassYear,
    #[serde(default)]
    pub major: String,
    pub gpa: Option<f64>,
    #[serde(default)]
    pub session_type: SessionType,
    #[serde(default)]
    pub input: String,
    /// Overrides the configured max wait for this session.
    pub timeout_seconds: Option<u64>,
    #[serde(default)]
    pub retries: u32,
}

impl SessionEntry {
    pub fn request(&self) -> SessionRequest {
        SessionRequest::new(
            Intake {
                student_id: self.student_id.clone(),
                year: self.year,
                major: self.major.clone(),
                gpa: self.gpa,
            },
            self.session_type,
            self.input.clone(),
        )
    }

    fn wait_policy(&self, base: BoundedWait) -> BoundedWait {
        match self.timeout_seconds {
            Some(secs) => BoundedWait::new(Duration::from_secs(secs), base.poll_interval),
            None => base,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Completed,
    Failed,
    TimedOut,
    Skipped,
}

/// Result of a single batch entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryResult {
    pub id: String,
    pub student_id: String,
    pub session_type: SessionType,
    pub status: EntryStatus,
    pub session_id: Option<Uuid>,
    pub report_path: Option<PathBuf>,
    pub error: Option<String>,
    pub duration_ms: u64,
    pub retries_used: u32,
}

impl EntryResult {
    fn new(entry: &SessionEntry, status: EntryStatus) -> Self {
        Self {
            id: entry.id.clone(),
            student_id: entry.student_id.clone(),
            session_type: entry.session_type,
            status,
            session_id: None,
            report_path: None,
            error: None,
            duration_ms: 0,
            retries_used: 0,
        }
    }
}

/// Complete batch execution result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub job_name: String,
    pub status: BatchStatus,
    pub total_sessions: usize,
    pub completed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub total_duration_ms: u64,
    pub results: Vec<EntryResult>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Success,
    PartialSuccess,
    Failed,
}

/// Execute a batch job from configuration file
#[instrument(skip(settings))]
pub async fn run(config_path: PathBuf, settings: &Settings) -> Result<()> {
    info!("Starting batch execution from config: {:?}", config_path);
    let config = load_batch_config(&config_path).context("Failed to load batch configuration")?;
    info!("Loaded batch job: {} (version: {})", config.job.name, config.job.version);

    let orchestrator = Arc::new(
        Orchestrator::from_settings(settings)
            .await
            .context("Failed to initialize orchestrator")?,
    );
    let service = SessionService::new(orchestrator, BoundedWait::from_config(&settings.session));

    let output_file = config.settings.output_file.clone();
    let result = execute_batch(&service, config).await?;
    print_batch_summary(&result);

    if let Some(path) = output_file {
        save_batch_results(&result, &path).context("Failed to save batch results")?;
    }

    match result.status {
        BatchStatus::Success => Ok(()),
        BatchStatus::PartialSuccess => {
            warn!("Batch completed with some failures");
            Ok(())
        }
        BatchStatus::Failed => {
            error!("Batch execution failed");
            Err(anyhow!("Batch '{}': no session completed", result.job_name))
        }
    }
}

/// Load batch configuration from TOML file
pub fn load_batch_config(config_path: &Path) -> Result<BatchConfig> {
    let contents = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {:?}", config_path))?;
    let config: BatchConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse TOML config: {:?}", config_path))?;
    validate_batch_config(&config)?;
    Ok(config)
}

pub fn validate_batch_config(config: &BatchConfig) -> Result<()> {
    if config.sessions.is_empty() {
        bail!("Batch configuration must contain at least one session");
    }
    if config.settings.max_concurrent_sessions == 0 {
        bail!("max_concurrent_sessions must be greater than zero");
    }

    let mut ids = HashSet::new();
    for entry in &config.sessions {
        if !ids.insert(entry.id.as_str()) {
            bail!("Duplicate session id: {}", entry.id);
        }
    }
    Ok(())
}

/// Run every entry; results come back in file order.
pub async fn execute_batch(service: &SessionService, config: BatchConfig) -> Result<BatchResult> {
    let started = Instant::now();
    let total_sessions = config.sessions.len();
    let semaphore = Arc::new(Semaphore::new(config.settings.max_concurrent_sessions));
    let halted = Arc::new(AtomicBool::new(false));
    let fail_fast = config.settings.fail_fast;

    let mut handles = Vec::with_capacity(total_sessions);
    for entry in config.sessions {
        let semaphore = Arc::clone(&semaphore);
        let halted = Arc::clone(&halted);
        let service = service.clone();

        handles.push(tokio::spawn(async move {
            run_slot(&service, entry, &semaphore, &halted, fail_fast).await
        }));
    }

    let mut results = Vec::with_capacity(total_sessions);
    for joined in join_all(handles).await {
        results.push(joined.context("batch worker panicked")??);
    }

    let count = |status: EntryStatus| results.iter().filter(|r| r.status == status).count();
    let completed = count(EntryStatus::Completed);
    let skipped = count(EntryStatus::Skipped);
    let failed = total_sessions - completed - skipped;

    let status = if failed == 0 && skipped == 0 {
        BatchStatus::Success
    } else if completed > 0 {
        BatchStatus::PartialSuccess
    } else {
        BatchStatus::Failed
    };

    Ok(BatchResult {
        job_name: config.job.name,
        status,
        total_sessions,
        completed,
        failed,
        skipped,
        total_duration_ms: started.elapsed().as_millis() as u64,
        results,
    })
}

/// Wait for a permit, then run `entry` unless the batch has been halted.
async fn run_slot(
    service: &SessionService,
    entry: SessionEntry,
    semaphore: &Arc<Semaphore>,
    halted: &AtomicBool,
    fail_fast: bool,
) -> Result<EntryResult> {
    let _permit = Arc::clone(semaphore)
        .acquire_owned()
        .await
        .context("batch semaphore closed")?;
    if halted.load(Ordering::SeqCst) {
        info!("Skipping session {} after earlier failure", entry.id);
        return Ok(EntryResult::new(&entry, EntryStatus::Skipped));
    }

    let result = execute_entry(service, &entry).await;
    if fail_fast && result.status != EntryStatus::Completed {
        error!("Failing fast due to session failure: {}", entry.id);
        halted.store(true, Ordering::SeqCst);
    }
    Ok(result)
}

/// Run one entry with retry on failure or timeout.
#[instrument(skip(service, entry), fields(session = %entry.id))]
async fn execute_entry(service: &SessionService, entry: &SessionEntry) -> EntryResult {
    let started = Instant::now();
    let wait = entry.wait_policy(service.wait_policy());
    let mut result = EntryResult::new(entry, EntryStatus::Failed);

    loop {
        info!("Executing session {} (attempt {})", entry.id, result.retries_used + 1);
        match service.run_with(entry.request(), wait).await {
            WaitOutcome::Completed(report) => {
                result.status = EntryStatus::Completed;
                result.session_id = Some(report.session_id);
                result.report_path = Some(report.report_path);
                result.error = None;
                break;
            }
            WaitOutcome::Failed(e) => {
                warn!("Session {} failed: {}", entry.id, e);
                result.status = EntryStatus::Failed;
                result.error = Some(e);
            }
            WaitOutcome::TimedOut { waited } => {
                warn!("Session {} timed out after {:?}", entry.id, waited);
                result.status = EntryStatus::TimedOut;
                result.error = Some(format!("timed out after {}s", waited.as_secs()));
            }
        }

        if result.retries_used >= entry.retries {
            break;
        }
        result.retries_used += 1;
    }

    result.duration_ms = started.elapsed().as_millis() as u64;
    result
}

fn print_batch_summary(result: &BatchResult) {
    println!("\n=== Batch Execution Summary ===");
    println!("Job: {}", result.job_name);
    println!("Status: {:?}", result.status);
    println!("Total Sessions: {}", result.total_sessions);
    println!("Completed: {}", result.completed);
    println!("Failed: {}", result.failed);
    println!("Skipped: {}", result.skipped);
    println!("Duration: {}ms", result.total_duration_ms);

    for entry in &result.results {
        match (&entry.status, &entry.report_path, &entry.error) {
            (EntryStatus::Completed, Some(path), _) => {
                println!("  + {} ({}): {}", entry.id, entry.session_type, path.display())
            }
            (EntryStatus::Skipped, _, _) => println!("  - {} skipped", entry.id),
            (_, _, error) => println!(
                "  ! {} ({}): {}",
                entry.id,
                entry.session_type,
                error.as_deref().unwrap_or("unknown error")
            ),
        }
    }
    println!("===============================\n");
}

fn save_batch_results(result: &BatchResult, output_file: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(result).context("Failed to serialize batch results")?;
    std::fs::write(output_file, json)
        .with_context(|| format!("Failed to write results to: {:?}", output_file))?;
    info!("Batch results saved to: {:?}", output_file);
    Ok(())
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_max_concurrent() -> usize {
    4
}
