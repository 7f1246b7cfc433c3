use thiserror::Error;

/// Errors a `PlatformBackend` implementation can surface. Job- and
/// safety-level errors (`SafetyDenied`, `Cancelled`, ...) live closer to
/// where they're raised, in `diskforge-safety`/`diskforge-jobs`.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    #[error("invalid device path: {0}")]
    InvalidPath(String),

    #[error("I/O error: {0}")]
    IoFault(#[from] std::io::Error),

    #[error("permission denied, administrator/root privileges are required: {0}")]
    PermissionDenied(String),

    #[error("required tool is not available: {0}")]
    BackendUnavailable(String),

    #[error("command timed out after {timeout_secs}s: {command}")]
    Timeout { command: String, timeout_secs: u64 },

    #[error("operation is not supported by this backend: {0}")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, BackendError>;
