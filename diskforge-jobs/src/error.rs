use thiserror::Error;

/// Errors a job's `execute` can raise, or the runner can report about a
/// job it was asked to manage.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("job was cancelled")]
    Cancelled,

    #[error("job validation failed: {0}")]
    ValidationFailed(String),

    #[error("job not found: {0}")]
    NotFound(uuid::Uuid),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, JobError>;
