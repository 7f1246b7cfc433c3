//! Session report: the audit trail every `Session` accumulates and
//! writes out on close.

use chrono::{DateTime, Utc};
use diskforge_config::DiskForgeConfig;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationRecord {
    pub timestamp: DateTime<Utc>,
    pub job_id: Uuid,
    pub job_name: String,
    pub job_description: String,
    pub success: bool,
    pub duration_seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DangerModeEvent {
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub timestamp: DateTime<Utc>,
    pub job_id: Uuid,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_operations: usize,
    pub successful_operations: usize,
    pub failed_operations: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
}

/// The exact shape written to `report_<short-id>.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDocument {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_seconds: Option<f64>,
    pub operations: Vec<OperationRecord>,
    pub danger_mode_events: Vec<DangerModeEvent>,
    pub errors: Vec<ErrorRecord>,
    pub warnings: Vec<String>,
    pub config_snapshot: DiskForgeConfig,
    pub summary: ReportSummary,
}

/// In-progress report a `Session` mutates as operations run; `to_document`
/// derives the final, summarized shape on demand (at `close()`, or for
/// inspection mid-session via `Session::report_snapshot`).
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub operations: Vec<OperationRecord>,
    pub danger_mode_events: Vec<DangerModeEvent>,
    pub errors: Vec<ErrorRecord>,
    pub warnings: Vec<String>,
    pub config_snapshot: DiskForgeConfig,
}

impl SessionReport {
    pub fn new(session_id: Uuid, started_at: DateTime<Utc>, config_snapshot: DiskForgeConfig) -> Self {
        Self {
            session_id,
            started_at,
            ended_at: None,
            operations: Vec::new(),
            danger_mode_events: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            config_snapshot,
        }
    }

    pub fn to_document(&self) -> ReportDocument {
        let duration_seconds = self
            .ended_at
            .map(|end| (end - self.started_at).num_milliseconds() as f64 / 1000.0);

        let total_operations = self.operations.len();
        let successful_operations = self.operations.iter().filter(|op| op.success).count();
        let failed_operations = total_operations - successful_operations;

        ReportDocument {
            session_id: self.session_id,
            started_at: self.started_at,
            ended_at: self.ended_at,
            duration_seconds,
            operations: self.operations.clone(),
            danger_mode_events: self.danger_mode_events.clone(),
            errors: self.errors.clone(),
            warnings: self.warnings.clone(),
            config_snapshot: self.config_snapshot.clone(),
            summary: ReportSummary {
                total_operations,
                successful_operations,
                failed_operations,
                total_errors: self.errors.len(),
                total_warnings: self.warnings.len(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_match_operation_outcomes() {
        let mut report = SessionReport::new(Uuid::new_v4(), Utc::now(), DiskForgeConfig::default());
        report.operations.push(OperationRecord {
            timestamp: Utc::now(),
            job_id: Uuid::new_v4(),
            job_name: "a".into(),
            job_description: "a".into(),
            success: true,
            duration_seconds: Some(1.0),
            error: None,
            warnings: vec![],
        });
        report.operations.push(OperationRecord {
            timestamp: Utc::now(),
            job_id: Uuid::new_v4(),
            job_name: "b".into(),
            job_description: "b".into(),
            success: false,
            duration_seconds: Some(0.5),
            error: Some("boom".into()),
            warnings: vec![],
        });
        report.errors.push(ErrorRecord {
            timestamp: Utc::now(),
            job_id: Uuid::new_v4(),
            error: "boom".into(),
        });
        report.ended_at = Some(report.started_at + chrono::Duration::seconds(5));

        let doc = report.to_document();
        assert_eq!(doc.summary.total_operations, 2);
        assert_eq!(doc.summary.successful_operations, 1);
        assert_eq!(doc.summary.failed_operations, 1);
        assert_eq!(doc.summary.total_errors, 1);
        assert_eq!(doc.duration_seconds, Some(5.0));
    }

    #[test]
    fn document_round_trips_through_json() {
        let report = SessionReport::new(Uuid::new_v4(), Utc::now(), DiskForgeConfig::default());
        let doc = report.to_document();
        let json = serde_json::to_string(&doc).unwrap();
        let back: ReportDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(doc.session_id, back.session_id);
        assert_eq!(doc.summary.total_operations, back.summary.total_operations);
    }
}
