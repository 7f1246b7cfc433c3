use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    Running,
    Paused,
    Completed,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum JobPriority {
    Low = 1,
    Normal = 5,
    High = 10,
    Critical = 20,
}

impl Default for JobPriority {
    fn default() -> Self {
        Self::Normal
    }
}

/// Point-in-time progress snapshot for a running job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobProgress {
    pub current: u64,
    pub total: u64,
    pub message: String,
    pub stage: String,
    pub bytes_processed: u64,
    pub bytes_total: u64,
    pub rate_bytes_per_sec: f64,
}

impl Default for JobProgress {
    fn default() -> Self {
        Self {
            current: 0,
            total: 100,
            message: String::new(),
            stage: String::new(),
            bytes_processed: 0,
            bytes_total: 0,
            rate_bytes_per_sec: 0.0,
        }
    }
}

impl JobProgress {
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.current as f64 / self.total as f64 * 100.0).min(100.0)
        }
    }

    /// Seconds remaining, estimated from `bytes_total - bytes_processed`
    /// divided by the current rate. `None` when rate or total is unknown.
    pub fn eta_seconds(&self) -> Option<f64> {
        if self.rate_bytes_per_sec <= 0.0 || self.bytes_total == 0 {
            return None;
        }
        let remaining = self.bytes_total.saturating_sub(self.bytes_processed);
        Some(remaining as f64 / self.rate_bytes_per_sec)
    }
}

/// Outcome of a completed job. `data` holds the job's JSON-serializable
/// result payload so it can be embedded directly into a session report
/// without a type-erasure layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobOutcome {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub warnings: Vec<String>,
    pub artifacts: HashMap<String, serde_json::Value>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl JobOutcome {
    pub fn duration_seconds(&self) -> Option<f64> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds() as f64 / 1000.0),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_is_capped_at_100() {
        let progress = JobProgress {
            current: 150,
            total: 100,
            ..JobProgress::default()
        };
        assert_eq!(progress.percentage(), 100.0);
    }

    #[test]
    fn eta_is_none_without_rate_or_total() {
        assert!(JobProgress::default().eta_seconds().is_none());
    }

    #[test]
    fn eta_computed_from_remaining_bytes_and_rate() {
        let progress = JobProgress {
            bytes_processed: 400,
            bytes_total: 1000,
            rate_bytes_per_sec: 100.0,
            ..JobProgress::default()
        };
        assert_eq!(progress.eta_seconds(), Some(6.0));
    }

    #[test]
    fn duration_seconds_requires_both_timestamps() {
        let outcome = JobOutcome {
            success: true,
            data: None,
            error: None,
            warnings: vec![],
            artifacts: HashMap::new(),
            start_time: None,
            end_time: None,
        };
        assert!(outcome.duration_seconds().is_none());
    }
}
