use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::context::JobContext;
use crate::error::{JobError, Result};
use crate::job::Job;
use crate::types::{JobOutcome, JobPriority, JobStatus};

type StatusCallback = Box<dyn Fn(Uuid, JobStatus) + Send + Sync>;

/// A submitted job plus the bookkeeping the runner needs around it. Not
/// exposed directly; callers read it through [`JobSummary`] or the
/// runner's per-field accessors.
struct JobRecord {
    job: Arc<dyn Job>,
    status: Mutex<JobStatus>,
    context: Arc<JobContext>,
    result: Mutex<Option<JobOutcome>>,
    created_at: DateTime<Utc>,
    started_at: Mutex<Option<DateTime<Utc>>>,
    completed_at: Mutex<Option<DateTime<Utc>>>,
}

/// Read-only view of a job's identity and current status, returned by
/// `list_jobs`.
#[derive(Debug, Clone)]
pub struct JobSummary {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub priority: JobPriority,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
}

/// Executes jobs on dedicated OS threads (one per running job, not a
/// pooled async executor) and tracks their status/progress/result for
/// later retrieval.
#[derive(Default)]
pub struct JobRunner {
    records: Mutex<HashMap<Uuid, Arc<JobRecord>>>,
    running_threads: Mutex<HashMap<Uuid, JoinHandle<()>>>,
    status_callbacks: Mutex<Vec<StatusCallback>>,
}

impl JobRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job without starting it. Returns its id.
    pub fn submit(&self, job: Arc<dyn Job>) -> Uuid {
        let id = job.id();
        let record = Arc::new(JobRecord {
            job: job.clone(),
            status: Mutex::new(JobStatus::Pending),
            context: Arc::new(JobContext::new()),
            result: Mutex::new(None),
            created_at: Utc::now(),
            started_at: Mutex::new(None),
            completed_at: Mutex::new(None),
        });

        self.records.lock().unwrap().insert(id, record);
        tracing::info!(job_id = %id, job_name = job.name(), "job submitted");
        id
    }

    /// Validate and start a previously submitted job on its own thread.
    pub fn start(self: &Arc<Self>, job_id: Uuid) -> Result<()> {
        let record = self.get_record(job_id)?;

        let errors = record.job.validate();
        if !errors.is_empty() {
            *record.status.lock().unwrap() = JobStatus::Failed;
            let now = Utc::now();
            *record.result.lock().unwrap() = Some(JobOutcome {
                success: false,
                data: None,
                error: Some(format!("validation failed: {}", errors.join("; "))),
                warnings: Vec::new(),
                artifacts: HashMap::new(),
                start_time: Some(now),
                end_time: Some(now),
            });
            self.notify_status(job_id, JobStatus::Failed);
            return Ok(());
        }

        let runner = self.clone();
        let thread_name = format!("job-{}", &job_id.to_string()[..8]);
        let handle = thread::Builder::new()
            .name(thread_name)
            .spawn(move || runner.execute_job(job_id))
            .map_err(|e| JobError::Other(e.into()))?;

        self.running_threads.lock().unwrap().insert(job_id, handle);
        Ok(())
    }

    /// Submit and run `job` on the calling thread, blocking until done.
    pub fn run_sync(self: &Arc<Self>, job: Arc<dyn Job>) -> JobOutcome {
        let id = self.submit(job.clone());

        let errors = job.validate();
        if !errors.is_empty() {
            let record = self.get_record(id).expect("just submitted");
            *record.status.lock().unwrap() = JobStatus::Failed;
            let now = Utc::now();
            let outcome = JobOutcome {
                success: false,
                data: None,
                error: Some(format!("validation failed: {}", errors.join("; "))),
                warnings: Vec::new(),
                artifacts: HashMap::new(),
                start_time: Some(now),
                end_time: Some(now),
            };
            *record.result.lock().unwrap() = Some(outcome.clone());
            return outcome;
        }

        self.execute_job(id);
        self.get_record(id)
            .ok()
            .and_then(|r| r.result.lock().unwrap().clone())
            .expect("execute_job always sets a result")
    }

    fn execute_job(&self, job_id: Uuid) {
        let Ok(record) = self.get_record(job_id) else {
            return;
        };

        *record.status.lock().unwrap() = JobStatus::Running;
        let started_at = Utc::now();
        *record.started_at.lock().unwrap() = Some(started_at);
        self.notify_status(job_id, JobStatus::Running);
        tracing::info!(job_id = %job_id, job_name = record.job.name(), "job started");

        let outcome = match record.job.execute(&record.context) {
            Ok(data) => {
                let outcome = JobOutcome {
                    success: true,
                    data: Some(data),
                    error: None,
                    warnings: record.context.warnings(),
                    artifacts: HashMap::new(),
                    start_time: Some(started_at),
                    end_time: Some(Utc::now()),
                };
                *record.status.lock().unwrap() = JobStatus::Completed;
                tracing::info!(
                    job_id = %job_id,
                    job_name = record.job.name(),
                    duration_seconds = outcome.duration_seconds(),
                    "job completed"
                );
                outcome
            }
            Err(JobError::Cancelled) => {
                *record.status.lock().unwrap() = JobStatus::Cancelled;
                tracing::info!(job_id = %job_id, job_name = record.job.name(), "job cancelled");
                JobOutcome {
                    success: false,
                    data: None,
                    error: Some("job was cancelled".to_string()),
                    warnings: record.context.warnings(),
                    artifacts: HashMap::new(),
                    start_time: Some(started_at),
                    end_time: Some(Utc::now()),
                }
            }
            Err(other) => {
                *record.status.lock().unwrap() = JobStatus::Failed;
                tracing::error!(job_id = %job_id, job_name = record.job.name(), error = %other, "job failed");
                JobOutcome {
                    success: false,
                    data: None,
                    error: Some(other.to_string()),
                    warnings: record.context.warnings(),
                    artifacts: HashMap::new(),
                    start_time: Some(started_at),
                    end_time: Some(Utc::now()),
                }
            }
        };

        *record.completed_at.lock().unwrap() = Some(Utc::now());
        *record.result.lock().unwrap() = Some(outcome);

        let status = *record.status.lock().unwrap();
        self.notify_status(job_id, status);
        self.running_threads.lock().unwrap().remove(&job_id);
    }

    pub fn cancel(&self, job_id: Uuid) -> bool {
        let Ok(record) = self.get_record(job_id) else {
            return false;
        };
        let status = *record.status.lock().unwrap();
        if !matches!(status, JobStatus::Running | JobStatus::Paused) || !record.job.can_cancel() {
            return false;
        }
        record.context.cancel();
        tracing::info!(job_id = %job_id, "job cancellation requested");
        true
    }

    pub fn pause(&self, job_id: Uuid) -> bool {
        let Ok(record) = self.get_record(job_id) else {
            return false;
        };
        if *record.status.lock().unwrap() != JobStatus::Running || !record.job.can_pause() {
            return false;
        }
        record.context.pause();
        *record.status.lock().unwrap() = JobStatus::Paused;
        self.notify_status(job_id, JobStatus::Paused);
        tracing::info!(job_id = %job_id, "job paused");
        true
    }

    pub fn resume(&self, job_id: Uuid) -> bool {
        let Ok(record) = self.get_record(job_id) else {
            return false;
        };
        if *record.status.lock().unwrap() != JobStatus::Paused {
            return false;
        }
        record.context.resume();
        *record.status.lock().unwrap() = JobStatus::Running;
        self.notify_status(job_id, JobStatus::Running);
        tracing::info!(job_id = %job_id, "job resumed");
        true
    }

    pub fn status(&self, job_id: Uuid) -> Option<JobStatus> {
        self.records
            .lock()
            .unwrap()
            .get(&job_id)
            .map(|r| *r.status.lock().unwrap())
    }

    pub fn progress(&self, job_id: Uuid) -> Option<crate::types::JobProgress> {
        self.records
            .lock()
            .unwrap()
            .get(&job_id)
            .map(|r| r.context.progress())
    }

    pub fn result(&self, job_id: Uuid) -> Option<JobOutcome> {
        self.records
            .lock()
            .unwrap()
            .get(&job_id)
            .and_then(|r| r.result.lock().unwrap().clone())
    }

    /// Block until `job_id`'s thread finishes (or `timeout` elapses for a
    /// started job), then return its result if one is available.
    pub fn wait(&self, job_id: Uuid, timeout: Option<Duration>) -> Option<JobOutcome> {
        let handle = self.running_threads.lock().unwrap().remove(&job_id);
        if let Some(handle) = handle {
            match timeout {
                // std::thread has no timed join; a started job is expected
                // to run to completion or be cancelled rather than
                // abandoned mid-join, so None and Some both wait fully.
                Some(_) | None => {
                    let _ = handle.join();
                }
            }
        }
        self.result(job_id)
    }

    pub fn list_jobs(&self, status: Option<JobStatus>) -> Vec<JobSummary> {
        let records = self.records.lock().unwrap();
        let mut summaries: Vec<JobSummary> = records
            .values()
            .filter(|r| match status {
                Some(s) => *r.status.lock().unwrap() == s,
                None => true,
            })
            .map(|r| JobSummary {
                id: r.job.id(),
                name: r.job.name().to_string(),
                description: r.job.description().to_string(),
                priority: r.job.priority(),
                status: *r.status.lock().unwrap(),
                created_at: r.created_at,
            })
            .collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        summaries
    }

    pub fn add_status_callback(&self, callback: impl Fn(Uuid, JobStatus) + Send + Sync + 'static) {
        self.status_callbacks.lock().unwrap().push(Box::new(callback));
    }

    fn get_record(&self, job_id: Uuid) -> Result<Arc<JobRecord>> {
        self.records
            .lock()
            .unwrap()
            .get(&job_id)
            .cloned()
            .ok_or(JobError::NotFound(job_id))
    }

    fn notify_status(&self, job_id: Uuid, status: JobStatus) {
        for callback in self.status_callbacks.lock().unwrap().iter() {
            callback(job_id, status);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::Job;

    struct EchoJob {
        id: Uuid,
        fail: bool,
    }

    impl Job for EchoJob {
        fn id(&self) -> Uuid {
            self.id
        }
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "returns a constant"
        }
        fn execute(&self, _context: &JobContext) -> Result<serde_json::Value> {
            if self.fail {
                Err(JobError::Other(anyhow::anyhow!("boom")))
            } else {
                Ok(serde_json::json!({"ok": true}))
            }
        }
        fn plan(&self) -> String {
            "echo a constant value".to_string()
        }
    }

    #[test]
    fn run_sync_returns_success_outcome() {
        let runner = Arc::new(JobRunner::new());
        let job = Arc::new(EchoJob { id: Uuid::new_v4(), fail: false });
        let outcome = runner.run_sync(job);
        assert!(outcome.success);
        assert_eq!(outcome.data, Some(serde_json::json!({"ok": true})));
    }

    #[test]
    fn run_sync_captures_failure_message() {
        let runner = Arc::new(JobRunner::new());
        let job = Arc::new(EchoJob { id: Uuid::new_v4(), fail: true });
        let outcome = runner.run_sync(job);
        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("boom"));
    }

    #[test]
    fn list_jobs_filters_by_status() {
        let runner = Arc::new(JobRunner::new());
        runner.run_sync(Arc::new(EchoJob { id: Uuid::new_v4(), fail: false }));
        runner.run_sync(Arc::new(EchoJob { id: Uuid::new_v4(), fail: true }));

        let completed = runner.list_jobs(Some(JobStatus::Completed));
        let failed = runner.list_jobs(Some(JobStatus::Failed));
        assert_eq!(completed.len(), 1);
        assert_eq!(failed.len(), 1);
    }

    #[test]
    fn cancel_returns_false_for_unknown_job() {
        let runner = Arc::new(JobRunner::new());
        assert!(!runner.cancel(Uuid::new_v4()));
    }
}
