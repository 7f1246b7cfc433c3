use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use crate::error::{JobError, Result};
use crate::types::JobProgress;

type ProgressCallback = Box<dyn Fn(&JobProgress) + Send + Sync>;

/// Handed to a running job's `execute`: the only way it observes
/// cancellation/pause requests or reports progress back to the runner.
pub struct JobContext {
    cancelled: AtomicBool,
    paused: AtomicBool,
    progress: Mutex<JobProgress>,
    progress_callbacks: Mutex<Vec<ProgressCallback>>,
    warnings: Mutex<Vec<String>>,
}

impl Default for JobContext {
    fn default() -> Self {
        Self::new()
    }
}

impl JobContext {
    pub fn new() -> Self {
        Self {
            cancelled: AtomicBool::new(false),
            paused: AtomicBool::new(false),
            progress: Mutex::new(JobProgress::default()),
            progress_callbacks: Mutex::new(Vec::new()),
            warnings: Mutex::new(Vec::new()),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    /// A job's inner loop calls this between units of work; it returns
    /// `Err(JobError::Cancelled)` the moment cancellation is requested.
    pub fn check_cancelled(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(JobError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Blocks while paused, polling for cancellation at `check_interval`.
    pub fn wait_if_paused(&self, check_interval: Duration) -> Result<()> {
        while self.is_paused() {
            if self.is_cancelled() {
                return Err(JobError::Cancelled);
            }
            thread::sleep(check_interval);
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn update_progress(
        &self,
        current: Option<u64>,
        total: Option<u64>,
        message: Option<&str>,
        stage: Option<&str>,
        bytes_processed: Option<u64>,
        bytes_total: Option<u64>,
        rate_bytes_per_sec: Option<f64>,
    ) {
        let snapshot = {
            let mut progress = self.progress.lock().unwrap();
            if let Some(v) = current {
                progress.current = v;
            }
            if let Some(v) = total {
                progress.total = v;
            }
            if let Some(v) = message {
                progress.message = v.to_string();
            }
            if let Some(v) = stage {
                progress.stage = v.to_string();
            }
            if let Some(v) = bytes_processed {
                progress.bytes_processed = v;
            }
            if let Some(v) = bytes_total {
                progress.bytes_total = v;
            }
            if let Some(v) = rate_bytes_per_sec {
                progress.rate_bytes_per_sec = v;
            }
            progress.clone()
        };

        for callback in self.progress_callbacks.lock().unwrap().iter() {
            callback(&snapshot);
        }
    }

    pub fn add_progress_callback(&self, callback: impl Fn(&JobProgress) + Send + Sync + 'static) {
        self.progress_callbacks.lock().unwrap().push(Box::new(callback));
    }

    pub fn progress(&self) -> JobProgress {
        self.progress.lock().unwrap().clone()
    }

    pub fn add_warning(&self, warning: impl Into<String>) {
        self.warnings.lock().unwrap().push(warning.into());
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn check_cancelled_errors_only_after_cancel() {
        let ctx = JobContext::new();
        assert!(ctx.check_cancelled().is_ok());
        ctx.cancel();
        assert!(matches!(ctx.check_cancelled(), Err(JobError::Cancelled)));
    }

    #[test]
    fn progress_callbacks_receive_a_snapshot_on_update() {
        let ctx = JobContext::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let seen2 = seen.clone();
        ctx.add_progress_callback(move |p| {
            seen2.store(p.current as usize, Ordering::SeqCst);
        });
        ctx.update_progress(Some(42), None, None, None, None, None, None);
        assert_eq!(seen.load(Ordering::SeqCst), 42);
    }

    #[test]
    fn warnings_accumulate_in_order() {
        let ctx = JobContext::new();
        ctx.add_warning("first");
        ctx.add_warning("second");
        assert_eq!(ctx.warnings(), vec!["first".to_string(), "second".to_string()]);
    }
}
