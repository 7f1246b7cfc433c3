use std::collections::HashSet;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use diskforge_config::SafetyConfig;

use crate::types::{DangerMode, ExecutionPlan, OperationType, PreflightReport};

const ACKNOWLEDGMENT_PHRASE: &str = "i understand the risks";

struct SafetyState {
    danger_mode: DangerMode,
    enabled_at: Option<DateTime<Utc>>,
    acknowledged_operations: HashSet<String>,
}

/// Gatekeeper for every destructive operation: tracks danger-mode state
/// (with lazy auto-expiry), generates and verifies per-target
/// confirmation strings, and builds execution plans for user review.
///
/// All state lives behind one mutex; every method takes `&self` so a
/// single `SafetyManager` can be shared across job threads.
pub struct SafetyManager {
    config: SafetyConfig,
    state: Mutex<SafetyState>,
}

impl SafetyManager {
    pub fn new(config: SafetyConfig) -> Self {
        Self {
            config,
            state: Mutex::new(SafetyState {
                danger_mode: DangerMode::Disabled,
                enabled_at: None,
                acknowledged_operations: HashSet::new(),
            }),
        }
    }

    /// Current danger-mode state, auto-disabling it if the configured
    /// confirmation timeout has elapsed since it was enabled. Checked on
    /// every read rather than via a background timer (spec.md §9: no
    /// background timers, expiry is evaluated lazily).
    pub fn danger_mode(&self) -> DangerMode {
        let mut state = self.state.lock().unwrap();
        if state.danger_mode == DangerMode::Enabled {
            if let Some(enabled_at) = state.enabled_at {
                let elapsed = Utc::now().signed_duration_since(enabled_at);
                if elapsed.num_seconds() > self.config.confirmation_timeout_seconds as i64 {
                    tracing::info!("danger mode auto-disabled due to timeout");
                    state.danger_mode = DangerMode::Disabled;
                    state.enabled_at = None;
                }
            }
        }
        state.danger_mode
    }

    /// Enable danger mode; the caller must echo the exact acknowledgment
    /// phrase ("I understand the risks", case-insensitive).
    pub fn enable_danger_mode(&self, acknowledgment: &str) -> bool {
        if acknowledgment.trim().to_lowercase() != ACKNOWLEDGMENT_PHRASE {
            tracing::warn!(received = acknowledgment, "failed to enable danger mode: incorrect acknowledgment");
            return false;
        }

        let mut state = self.state.lock().unwrap();
        state.danger_mode = DangerMode::Enabled;
        state.enabled_at = Some(Utc::now());
        state.acknowledged_operations.clear();
        drop(state);

        tracing::warn!(
            timeout_seconds = self.config.confirmation_timeout_seconds,
            "danger mode enabled"
        );
        true
    }

    pub fn disable_danger_mode(&self) {
        let mut state = self.state.lock().unwrap();
        state.danger_mode = DangerMode::Disabled;
        state.enabled_at = None;
        state.acknowledged_operations.clear();
        drop(state);
        tracing::info!("danger mode disabled");
    }

    /// Whether `operation_type` may run given the current danger-mode
    /// state. Read-only operations are always allowed.
    pub fn is_operation_allowed(&self, operation_type: OperationType) -> (bool, String) {
        if operation_type == OperationType::ReadOnly {
            return (true, "read-only operations are always allowed".to_string());
        }

        if self.danger_mode() == DangerMode::Disabled {
            return (
                false,
                format!(
                    "operation '{operation_type}' requires danger mode; enable danger mode to perform destructive operations"
                ),
            );
        }

        (true, "operation allowed in danger mode".to_string())
    }

    /// Deterministic confirmation string for `target_identifier`:
    /// `DESTROY-<SANITIZED-UPPERCASED-TARGET>`, stripping everything
    /// except alphanumerics, `/`, `_`, and `-`.
    pub fn generate_confirmation_string(&self, target_identifier: &str) -> String {
        let safe_target: String = target_identifier
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '_' | '-'))
            .collect();
        format!("DESTROY-{}", safe_target.to_uppercase())
    }

    pub fn verify_confirmation(
        &self,
        target_identifier: &str,
        user_input: &str,
        operation_id: &str,
    ) -> (bool, String) {
        let expected = self.generate_confirmation_string(target_identifier);

        if user_input.trim() != expected {
            tracing::warn!(
                expected = %expected,
                received = user_input,
                operation_id,
                "confirmation verification failed"
            );
            return (false, format!("confirmation mismatch, expected: {expected}"));
        }

        self.state
            .lock()
            .unwrap()
            .acknowledged_operations
            .insert(operation_id.to_string());

        tracing::info!(operation_id, target = target_identifier, "operation confirmed");
        (true, "confirmation verified".to_string())
    }

    pub fn is_operation_confirmed(&self, operation_id: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .acknowledged_operations
            .contains(operation_id)
    }

    /// Build an `ExecutionPlan`. Only `Modify`/`Delete`/`Clone`/`Restore`
    /// operations get a confirmation string; `ReadOnly` and `Create` are
    /// reversible enough not to need one.
    #[allow(clippy::too_many_arguments)]
    pub fn create_execution_plan(
        &self,
        operation_type: OperationType,
        description: impl Into<String>,
        target: impl Into<String>,
        steps: Vec<String>,
        warnings: Vec<String>,
        estimated_duration: Option<String>,
        preflight_report: Option<PreflightReport>,
    ) -> ExecutionPlan {
        let target = target.into();
        let confirmation_string = if matches!(
            operation_type,
            OperationType::ReadOnly | OperationType::Create
        ) {
            None
        } else {
            Some(self.generate_confirmation_string(&target))
        };

        ExecutionPlan {
            operation_type,
            description: description.into(),
            target,
            steps,
            warnings,
            estimated_duration,
            preflight_report,
            confirmation_string,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> SafetyManager {
        SafetyManager::new(SafetyConfig::default())
    }

    #[test]
    fn read_only_operations_are_always_allowed() {
        let mgr = manager();
        let (allowed, _) = mgr.is_operation_allowed(OperationType::ReadOnly);
        assert!(allowed);
    }

    #[test]
    fn destructive_operations_are_denied_until_danger_mode_enabled() {
        let mgr = manager();
        let (allowed, reason) = mgr.is_operation_allowed(OperationType::Delete);
        assert!(!allowed);
        assert!(reason.contains("danger mode"));

        assert!(mgr.enable_danger_mode("I understand the risks"));
        let (allowed, _) = mgr.is_operation_allowed(OperationType::Delete);
        assert!(allowed);
    }

    #[test]
    fn enable_danger_mode_rejects_wrong_acknowledgment() {
        let mgr = manager();
        assert!(!mgr.enable_danger_mode("sure, go ahead"));
        assert_eq!(mgr.danger_mode(), DangerMode::Disabled);
    }

    #[test]
    fn confirmation_string_sanitizes_and_uppercases_target() {
        let mgr = manager();
        assert_eq!(
            mgr.generate_confirmation_string("/dev/sda1"),
            "DESTROY-/DEV/SDA1"
        );
        assert_eq!(mgr.generate_confirmation_string("a b!c"), "DESTROY-ABC");
    }

    #[test]
    fn verify_confirmation_records_acknowledged_operation() {
        let mgr = manager();
        let expected = mgr.generate_confirmation_string("/dev/sda1");
        let (ok, _) = mgr.verify_confirmation("/dev/sda1", &expected, "op-1");
        assert!(ok);
        assert!(mgr.is_operation_confirmed("op-1"));
    }

    #[test]
    fn verify_confirmation_rejects_mismatched_input() {
        let mgr = manager();
        let (ok, msg) = mgr.verify_confirmation("/dev/sda1", "WRONG", "op-1");
        assert!(!ok);
        assert!(msg.contains("mismatch"));
        assert!(!mgr.is_operation_confirmed("op-1"));
    }

    #[test]
    fn execution_plan_omits_confirmation_for_create_and_read_only() {
        let mgr = manager();
        let plan = mgr.create_execution_plan(
            OperationType::Create,
            "Create partition",
            "/dev/sda",
            vec!["step".into()],
            vec![],
            None,
            None,
        );
        assert!(plan.confirmation_string.is_none());

        let plan = mgr.create_execution_plan(
            OperationType::Delete,
            "Delete partition",
            "/dev/sda1",
            vec!["step".into()],
            vec![],
            None,
            None,
        );
        assert!(plan.confirmation_string.is_some());
    }
}
