//! Danger-mode gating, confirmation tokens, and preflight checks that
//! stand between a job and any destructive operation. No module in this
//! crate touches a disk; it only decides whether a caller is allowed to.

pub mod manager;
pub mod preflight;
pub mod types;

pub use manager::SafetyManager;
pub use preflight::{
    check_not_mounted, check_power_status, check_target_size, create_standard_preflight_checker,
    PreflightChecker, PreflightContext,
};
pub use types::{
    DangerMode, ExecutionPlan, OperationType, PreflightCheck, PreflightReport, Severity,
};
