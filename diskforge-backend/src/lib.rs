//! The platform abstraction boundary: `PlatformBackend` is the only trait
//! the rest of the workspace uses to reach real disks. `MemoryBackend` and
//! `NullBackend` are in-crate fixtures; concrete OS backends (udisks2/zbus
//! on Linux, diskpart/WMI on Windows, diskutil on macOS) live outside this
//! workspace and implement this same trait.

pub mod backend;
pub mod command;
pub mod error;
pub mod memory;
pub mod null;
pub mod raw;

pub use backend::{OperationOutcome, PlatformBackend};
pub use command::CommandResult;
pub use error::{BackendError, Result};
pub use memory::MemoryBackend;
pub use null::NullBackend;
pub use raw::{BoxedRawDevice, RawDevice};
