//! OS-thread-per-job execution engine: `Job` implementations describe a
//! unit of destructive (or read-only) work, `JobContext` lets them report
//! progress and observe cancellation/pause requests, and `JobRunner`
//! owns their lifecycle. No module here decides whether a job is
//! *allowed* to run — that's `diskforge-safety`'s job.

pub mod context;
pub mod error;
pub mod job;
pub mod runner;
pub mod types;

pub use context::JobContext;
pub use error::{JobError, Result};
pub use job::Job;
pub use runner::{JobRunner, JobSummary};
pub use types::{JobOutcome, JobPriority, JobProgress, JobStatus};
