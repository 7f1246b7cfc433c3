//! `Session`: the crate end users (CLI, GUI, or another embedder) build
//! against. A `Session` owns everything a sequence of disk operations
//! needs — config, the safety gate, the job runner, a lazily-constructed
//! platform backend, a scoped logger, and the report it writes on close.

pub mod error;
pub mod jobs;
pub mod logging;
pub mod report;
pub mod session;

pub use error::{DiskForgeError, Result};
pub use jobs::{
    CloneDiskJob, ClonePartitionJob, CreateImageJob, CreatePartitionJob, CreateRescueMediaJob,
    DeletePartitionJob, DiskInfoJob, FormatPartitionJob, JobPayload, ListDisksJob, RestoreImageJob,
    SessionJob,
};
pub use report::{DangerModeEvent, ErrorRecord, OperationRecord, ReportDocument, ReportSummary, SessionReport};
pub use session::{BackendFactory, Session};
