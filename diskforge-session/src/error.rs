//! Top-level error, composed via `#[from]` from every crate `Session`
//! touches.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiskForgeError {
    #[error("configuration error: {0}")]
    Config(#[from] diskforge_config::ConfigError),

    #[error(transparent)]
    Backend(#[from] diskforge_backend::BackendError),

    #[error(transparent)]
    Job(#[from] diskforge_jobs::JobError),

    #[error(transparent)]
    Protocol(#[from] diskforge_protocol::ProtocolError),

    #[error("operation denied: {0}")]
    SafetyDenied(String),

    #[error("failed to persist session report: {0}")]
    ReportIo(#[from] std::io::Error),

    #[error("failed to serialize session report: {0}")]
    ReportSerialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DiskForgeError>;
