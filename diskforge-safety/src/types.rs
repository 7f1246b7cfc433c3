use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Danger-mode states gating every non-read-only operation.
///
/// `Acknowledged` mirrors the original three-state enum but is never
/// reached by any transition in this implementation or the original —
/// kept for field-shape fidelity, not because anything produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DangerMode {
    Disabled,
    Enabled,
    Acknowledged,
}

/// Coarse risk classification of an operation, used to decide whether
/// danger mode must be enabled before it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationType {
    ReadOnly,
    Create,
    Modify,
    Delete,
    Clone,
    Restore,
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ReadOnly => "READ_ONLY",
            Self::Create => "CREATE",
            Self::Modify => "MODIFY",
            Self::Delete => "DELETE",
            Self::Clone => "CLONE",
            Self::Restore => "RESTORE",
        };
        f.write_str(s)
    }
}

/// Severity of a single preflight check result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

impl Default for Severity {
    fn default() -> Self {
        Self::Info
    }
}

/// Result of one named preflight check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreflightCheck {
    pub name: String,
    pub passed: bool,
    pub message: String,
    pub severity: Severity,
    pub details: HashMap<String, serde_json::Value>,
}

impl PreflightCheck {
    pub fn new(name: impl Into<String>, passed: bool, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            message: message.into(),
            severity: Severity::default(),
            details: HashMap::new(),
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_details(mut self, details: HashMap<String, serde_json::Value>) -> Self {
        self.details = details;
        self
    }
}

/// The combined result of running every registered preflight check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreflightReport {
    pub checks: Vec<PreflightCheck>,
    pub timestamp: DateTime<Utc>,
}

impl PreflightReport {
    pub fn new(checks: Vec<PreflightCheck>) -> Self {
        Self {
            checks,
            timestamp: Utc::now(),
        }
    }

    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn has_errors(&self) -> bool {
        self.checks
            .iter()
            .any(|c| !c.passed && matches!(c.severity, Severity::Error | Severity::Critical))
    }

    pub fn has_warnings(&self) -> bool {
        self.checks
            .iter()
            .any(|c| !c.passed && matches!(c.severity, Severity::Warning))
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![format!("Preflight Check Report ({})", self.timestamp.to_rfc3339())];
        lines.push("=".repeat(60));

        let passed = self.checks.iter().filter(|c| c.passed).count();
        lines.push(format!("Results: {passed}/{} checks passed", self.checks.len()));
        lines.push(String::new());

        for check in &self.checks {
            let status = if check.passed { "OK" } else { "FAIL" };
            lines.push(format!("[{status}] {}: {}", check.name, check.message));
            for (key, value) in &check.details {
                lines.push(format!("    {key}: {value}"));
            }
        }

        lines.join("\n")
    }
}

/// A human-readable plan for an operation, including the confirmation
/// string the caller must echo back for non-create destructive ops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub operation_type: OperationType,
    pub description: String,
    pub target: String,
    pub steps: Vec<String>,
    pub warnings: Vec<String>,
    pub estimated_duration: Option<String>,
    pub preflight_report: Option<PreflightReport>,
    pub confirmation_string: Option<String>,
}

impl ExecutionPlan {
    pub fn plan_text(&self) -> String {
        let mut lines = vec!["=".repeat(60)];
        lines.push(format!("OPERATION: {}", self.description));
        lines.push(format!("TARGET: {}", self.target));
        lines.push(format!("TYPE: {}", self.operation_type));
        lines.push("=".repeat(60));

        if !self.warnings.is_empty() {
            lines.push(String::new());
            lines.push("WARNINGS:".to_string());
            for warning in &self.warnings {
                lines.push(format!("   - {warning}"));
            }
        }

        lines.push(String::new());
        lines.push("EXECUTION STEPS:".to_string());
        for (i, step) in self.steps.iter().enumerate() {
            lines.push(format!("   {}. {step}", i + 1));
        }

        if let Some(duration) = &self.estimated_duration {
            lines.push(String::new());
            lines.push(format!("Estimated duration: {duration}"));
        }

        if let Some(report) = &self.preflight_report {
            lines.push(String::new());
            lines.push(report.summary());
        }

        if let Some(confirmation) = &self.confirmation_string {
            lines.push(String::new());
            lines.push("=".repeat(60));
            lines.push("To proceed, supply the following confirmation string:".to_string());
            lines.push(format!("  {confirmation}"));
            lines.push("=".repeat(60));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_aggregates_pass_fail_and_severity() {
        let report = PreflightReport::new(vec![
            PreflightCheck::new("a", true, "ok"),
            PreflightCheck::new("b", false, "bad").with_severity(Severity::Warning),
        ]);
        assert!(!report.all_passed());
        assert!(report.has_warnings());
        assert!(!report.has_errors());
    }

    #[test]
    fn critical_failure_counts_as_error() {
        let report = PreflightReport::new(vec![
            PreflightCheck::new("a", false, "bad").with_severity(Severity::Critical),
        ]);
        assert!(report.has_errors());
    }

    #[test]
    fn plan_text_includes_confirmation_string_when_present() {
        let plan = ExecutionPlan {
            operation_type: OperationType::Delete,
            description: "Delete partition".into(),
            target: "/dev/sda1".into(),
            steps: vec!["Unmount".into(), "Delete".into()],
            warnings: vec!["data loss".into()],
            estimated_duration: None,
            preflight_report: None,
            confirmation_string: Some("DESTROY-DEVSDA1".into()),
        };
        let text = plan.plan_text();
        assert!(text.contains("DESTROY-DEVSDA1"));
        assert!(text.contains("data loss"));
    }
}
