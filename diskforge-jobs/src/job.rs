use uuid::Uuid;

use crate::context::JobContext;
use crate::error::Result;
use crate::types::JobPriority;

/// A unit of work the runner can execute on its own OS thread.
///
/// `execute` must poll `context.check_cancelled()` between steps of any
/// long-running loop, and should report progress via
/// `context.update_progress(...)`. Its return value is stored as the
/// job's `JobOutcome::data`, so it must serialize cleanly to JSON.
pub trait Job: Send + Sync {
    fn id(&self) -> Uuid;
    fn name(&self) -> &str;
    fn description(&self) -> &str;

    fn priority(&self) -> JobPriority {
        JobPriority::Normal
    }

    fn execute(&self, context: &JobContext) -> Result<serde_json::Value>;

    /// Human-readable execution plan, typically built from
    /// `diskforge-safety::SafetyManager::create_execution_plan`.
    fn plan(&self) -> String;

    /// Validation errors that should prevent this job from starting.
    fn validate(&self) -> Vec<String> {
        Vec::new()
    }

    fn can_cancel(&self) -> bool {
        true
    }

    fn can_pause(&self) -> bool {
        true
    }
}
