//! `Session`: owns config, safety gate, job runner, platform backend
//! handle, logging, and the report being built, following the "one
//! struct holds every shared handle" shape of a service-layer session
//! object.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use chrono::{DateTime, Utc};
use diskforge_backend::PlatformBackend;
use diskforge_config::DiskForgeConfig;
use diskforge_jobs::{Job, JobOutcome, JobProgress, JobRunner, JobStatus, JobSummary};
use diskforge_safety::{DangerMode, SafetyManager};
use tracing::Dispatch;
use tracing_appender::non_blocking::WorkerGuard;
use uuid::Uuid;

use crate::error::{DiskForgeError, Result};
use crate::jobs::SessionJob;
use crate::logging;
use crate::report::{DangerModeEvent, ErrorRecord, OperationRecord, ReportDocument, SessionReport};

/// Constructs the platform backend lazily, on first access. Boxed
/// rather than a generic parameter since `Session` is handed to callers
/// as a concrete, non-generic type.
pub type BackendFactory = Box<dyn Fn() -> Arc<dyn PlatformBackend> + Send + Sync>;

pub struct Session {
    id: Uuid,
    config: DiskForgeConfig,
    started_at: DateTime<Utc>,
    safety: Arc<SafetyManager>,
    job_runner: Arc<JobRunner>,
    backend: OnceLock<Arc<dyn PlatformBackend>>,
    backend_factory: BackendFactory,
    dispatch: Dispatch,
    _log_guard: Option<WorkerGuard>,
    report: Mutex<SessionReport>,
    closed: AtomicBool,
}

impl Session {
    pub fn new(config: DiskForgeConfig, backend_factory: BackendFactory) -> Self {
        Self::with_id(Uuid::new_v4(), config, backend_factory)
    }

    pub fn with_id(id: Uuid, config: DiskForgeConfig, backend_factory: BackendFactory) -> Self {
        let started_at = Utc::now();
        let short_id = id.to_string()[..8].to_string();
        let (dispatch, log_guard) = logging::build_dispatch(&config.logging, &short_id);

        let safety = Arc::new(SafetyManager::new(config.safety.clone()));
        let job_runner = Arc::new(JobRunner::new());
        let report = Mutex::new(SessionReport::new(id, started_at, config.clone()));

        tracing::dispatcher::with_default(&dispatch, || {
            tracing::info!(session_id = %id, danger_mode = ?safety.danger_mode(), "session started");
        });

        Self {
            id,
            config,
            started_at,
            safety,
            job_runner,
            backend: OnceLock::new(),
            backend_factory,
            dispatch,
            _log_guard: log_guard,
            report,
            closed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn config(&self) -> &DiskForgeConfig {
        &self.config
    }

    /// The platform-specific backend, constructed on first access.
    pub fn platform(&self) -> Arc<dyn PlatformBackend> {
        self.backend.get_or_init(|| (self.backend_factory)()).clone()
    }

    pub fn danger_mode(&self) -> DangerMode {
        self.safety.danger_mode()
    }

    pub fn safety(&self) -> &Arc<SafetyManager> {
        &self.safety
    }

    /// Enable danger mode with the user's acknowledgment phrase, recording
    /// a `danger_mode_events` entry either way. The acknowledgment is
    /// truncated to 50 characters before it reaches the log.
    pub fn enable_danger_mode(&self, acknowledgment: &str) -> bool {
        tracing::dispatcher::with_default(&self.dispatch, || {
            let success = self.safety.enable_danger_mode(acknowledgment);
            let truncated: String = acknowledgment.chars().take(50).collect();

            if success {
                tracing::warn!(acknowledgment = %truncated, "danger mode enabled");
            } else {
                tracing::info!("danger mode enable attempt failed");
            }

            self.report.lock().unwrap().danger_mode_events.push(DangerModeEvent {
                timestamp: Utc::now(),
                action: "enable_attempt".to_string(),
                success,
            });

            success
        })
    }

    pub fn disable_danger_mode(&self) {
        tracing::dispatcher::with_default(&self.dispatch, || {
            self.safety.disable_danger_mode();
            tracing::info!("danger mode disabled");

            self.report.lock().unwrap().danger_mode_events.push(DangerModeEvent {
                timestamp: Utc::now(),
                action: "disable".to_string(),
                success: true,
            });
        });
    }

    /// Run `job` synchronously, gating it on the safety manager first and
    /// recording the outcome in the session report.
    pub fn run_job<J: SessionJob + 'static>(&self, job: Arc<J>) -> JobOutcome {
        tracing::dispatcher::with_default(&self.dispatch, || {
            let job_id = job.id();
            let job_name = job.name().to_string();
            let job_description = job.description().to_string();
            let operation_type = job.operation_type();

            let (allowed, reason) = self.safety.is_operation_allowed(operation_type);
            if !allowed {
                let now = Utc::now();
                let outcome = JobOutcome {
                    success: false,
                    data: None,
                    error: Some(reason),
                    warnings: Vec::new(),
                    artifacts: HashMap::new(),
                    start_time: Some(now),
                    end_time: Some(now),
                };
                tracing::warn!(job_id = %job_id, job_name = %job_name, "operation denied by safety gate");
                self.track_operation(job_id, &job_name, &job_description, &outcome);
                return outcome;
            }

            let plan = job.plan();
            tracing::info!(job_id = %job_id, job_name = %job_name, plan = %plan, "executing job");

            let job_dyn: Arc<dyn Job> = job;
            let outcome = self.job_runner.run_sync(job_dyn);
            self.track_operation(job_id, &job_name, &job_description, &outcome);
            outcome
        })
    }

    /// Submit `job` for asynchronous execution: submit + start, returning
    /// immediately. The caller polls `job_status`/`job_result`/`wait_job`.
    pub fn submit_job<J: SessionJob + 'static>(&self, job: Arc<J>) -> Uuid {
        tracing::dispatcher::with_default(&self.dispatch, || {
            let job_dyn: Arc<dyn Job> = job;
            let id = self.job_runner.submit(job_dyn);
            let _ = self.job_runner.start(id);
            id
        })
    }

    pub fn cancel_job(&self, job_id: Uuid) -> bool {
        self.job_runner.cancel(job_id)
    }

    pub fn pause_job(&self, job_id: Uuid) -> bool {
        self.job_runner.pause(job_id)
    }

    pub fn resume_job(&self, job_id: Uuid) -> bool {
        self.job_runner.resume(job_id)
    }

    pub fn job_status(&self, job_id: Uuid) -> Option<JobStatus> {
        self.job_runner.status(job_id)
    }

    pub fn job_progress(&self, job_id: Uuid) -> Option<JobProgress> {
        self.job_runner.progress(job_id)
    }

    pub fn job_result(&self, job_id: Uuid) -> Option<JobOutcome> {
        self.job_runner.result(job_id)
    }

    pub fn wait_job(&self, job_id: Uuid, timeout: Option<std::time::Duration>) -> Option<JobOutcome> {
        self.job_runner.wait(job_id, timeout)
    }

    pub fn list_jobs(&self, status: Option<JobStatus>) -> Vec<JobSummary> {
        self.job_runner.list_jobs(status)
    }

    /// Current report contents without finalizing `ended_at`.
    pub fn report_snapshot(&self) -> ReportDocument {
        self.report.lock().unwrap().to_document()
    }

    fn short_id(&self) -> String {
        self.id.to_string()[..8].to_string()
    }

    fn track_operation(&self, job_id: Uuid, job_name: &str, job_description: &str, outcome: &JobOutcome) {
        let mut report = self.report.lock().unwrap();

        if let Some(error) = &outcome.error {
            report.errors.push(ErrorRecord {
                timestamp: Utc::now(),
                job_id,
                error: error.clone(),
            });
        }
        if !outcome.warnings.is_empty() {
            report.warnings.extend(outcome.warnings.iter().cloned());
        }

        report.operations.push(OperationRecord {
            timestamp: Utc::now(),
            job_id,
            job_name: job_name.to_string(),
            job_description: job_description.to_string(),
            success: outcome.success,
            duration_seconds: outcome.duration_seconds(),
            error: outcome.error.clone(),
            warnings: outcome.warnings.clone(),
        });
        drop(report);

        if outcome.success {
            tracing::info!(job_id = %job_id, job_name, "operation completed");
        } else {
            tracing::error!(job_id = %job_id, job_name, error = outcome.error.as_deref().unwrap_or(""), "operation failed");
        }
    }

    /// Finalize `ended_at` and persist the report to
    /// `<session_dir>/report_<short-id>.json`, returning that path.
    /// Idempotent: calling `close` again after a successful close just
    /// returns the same path without rewriting the file.
    pub fn close(&self) -> Result<PathBuf> {
        let path = self.config.session_report_path(&self.short_id());

        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(path);
        }

        tracing::dispatcher::with_default(&self.dispatch, || -> Result<PathBuf> {
            let document = {
                let mut report = self.report.lock().unwrap();
                report.ended_at = Some(Utc::now());
                report.to_document()
            };

            self.config.ensure_directories().map_err(DiskForgeError::Config)?;

            let json = serde_json::to_vec_pretty(&document)?;
            let tmp_path = path.with_extension("json.tmp");
            std::fs::write(&tmp_path, &json)?;
            std::fs::rename(&tmp_path, &path)?;

            tracing::info!(
                session_id = %self.id,
                report_path = %path.display(),
                duration_seconds = document.duration_seconds,
                "session closed"
            );

            Ok(path)
        })
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.closed.load(Ordering::SeqCst) {
            if let Err(error) = self.close() {
                tracing::error!(%error, "failed to persist session report on drop");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::{CloneDiskJob, FormatPartitionJob};
    use diskforge_backend::MemoryBackend;
    use diskforge_types::{CloneOptions, FileSystem, FormatOptions};

    fn memory_backend_factory(backend: Arc<MemoryBackend>) -> BackendFactory {
        Box::new(move || backend.clone() as Arc<dyn PlatformBackend>)
    }

    fn test_session(backend: Arc<MemoryBackend>) -> Session {
        let dir = tempfile::tempdir().unwrap();
        let mut config = DiskForgeConfig::default();
        config.session_directory = dir.path().to_path_buf();
        config.logging.file_enabled = false;
        config.logging.console_enabled = false;
        std::mem::forget(dir);
        Session::new(config, memory_backend_factory(backend))
    }

    #[test]
    fn destructive_job_denied_without_danger_mode() {
        let backend = Arc::new(MemoryBackend::new());
        backend.add_disk("/dev/sda", 1024, None);
        let session = test_session(backend.clone());

        let job = Arc::new(FormatPartitionJob::new(
            session.platform(),
            FormatOptions {
                partition_path: "/dev/sda1".into(),
                filesystem: FileSystem::Ext4,
                label: None,
                quick: true,
                dry_run: false,
            },
        ));

        let outcome = session.run_job(job);
        assert!(!outcome.success);
        assert!(outcome.error.unwrap().to_lowercase().contains("danger mode"));

        let report = session.report_snapshot();
        assert_eq!(report.summary.total_operations, 1);
        assert_eq!(report.summary.failed_operations, 1);
    }

    #[test]
    fn clone_job_runs_once_danger_mode_is_enabled() {
        let backend = Arc::new(MemoryBackend::new());
        let data: Vec<u8> = (0..4096).map(|i| (i % 250) as u8).collect();
        backend.add_disk("/dev/src", data.len() as u64, Some(&data));
        backend.add_disk("/dev/tgt", data.len() as u64, None);
        let session = test_session(backend.clone());

        assert!(session.enable_danger_mode("I understand the risks"));

        let job = Arc::new(CloneDiskJob::new(
            session.platform(),
            CloneOptions {
                source_path: "/dev/src".into(),
                target_path: "/dev/tgt".into(),
                verify: true,
                block_size_bytes: Some(512),
                dry_run: false,
            },
        ));

        let outcome = session.run_job(job);
        assert!(outcome.success, "{:?}", outcome.error);
        assert_eq!(backend.device_bytes("/dev/tgt").unwrap(), data);

        let report = session.report_snapshot();
        assert_eq!(report.summary.successful_operations, 1);
        assert_eq!(report.danger_mode_events.len(), 1);
    }

    #[test]
    fn close_persists_report_and_is_idempotent() {
        let backend = Arc::new(MemoryBackend::new());
        let session = test_session(backend);

        let path = session.close().unwrap();
        assert!(path.exists());

        let again = session.close().unwrap();
        assert_eq!(path, again);

        let contents = std::fs::read_to_string(&path).unwrap();
        let document: ReportDocument = serde_json::from_str(&contents).unwrap();
        assert_eq!(document.session_id, session.id());
    }
}
