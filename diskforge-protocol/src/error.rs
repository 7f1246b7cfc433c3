use thiserror::Error;

/// Errors the destructive-op protocol can surface. Job bodies translate
/// these into `(false, message)` `OperationOutcome`s; `Cancelled` is
/// recognized specially by the job runner (spec.md §7).
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("{0}")]
    Precondition(String),

    #[error("I/O error: {0}")]
    IoFault(#[from] std::io::Error),

    #[error("permission denied, administrator/root privileges are required: {0}")]
    PermissionDenied(String),

    #[error("verification failed: {0}")]
    VerificationFailed(String),

    #[error(transparent)]
    Backend(#[from] diskforge_backend::BackendError),

    #[error("job was cancelled")]
    Cancelled,
}

impl From<diskforge_jobs::JobError> for ProtocolError {
    fn from(err: diskforge_jobs::JobError) -> Self {
        match err {
            diskforge_jobs::JobError::Cancelled => Self::Cancelled,
            other => Self::Precondition(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
