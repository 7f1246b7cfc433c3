//! Concrete jobs exposed through a `Session`: list, info, create-partition,
//! delete-partition, format, clone, backup, restore, rescue. One struct
//! per operation, each carrying its own options and backend handle
//! rather than reaching back into `Session`.

use std::collections::HashMap;
use std::sync::Arc;

use diskforge_backend::PlatformBackend;
use diskforge_jobs::{Job, JobContext, JobError, Result as JobResult};
use diskforge_safety::OperationType;
use diskforge_types::{
    CloneOptions, Disk, DiskInventory, FormatOptions, ImageInfo, ImageOptions,
    PartitionCreateOptions, RestoreOptions,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The concrete result payload every session-level job produces: a
/// tagged variant standing in for a parametric job result type.
/// Serialized into `JobOutcome::data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum JobPayload {
    Inventory(DiskInventory),
    DiskInfo(Option<Disk>),
    Message(String),
    Image(ImageInfo),
    Artifacts(HashMap<String, String>),
    Unit,
}

fn payload(value: JobPayload) -> JobResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| JobError::Other(e.into()))
}

fn backend_err<E: std::error::Error + Send + Sync + 'static>(e: E) -> JobError {
    JobError::Other(anyhow::Error::new(e))
}

/// `Session::run_job`/`submit_job` are generic over this rather than
/// `Arc<dyn SessionJob>`, so a concrete `J: SessionJob` coerces straight to
/// `Arc<dyn Job>` without needing trait-object upcasting.
pub trait SessionJob: Job {
    /// Risk classification consulted by the safety gate before this job
    /// is allowed to run. Defaults to read-only.
    fn operation_type(&self) -> OperationType {
        OperationType::ReadOnly
    }
}

pub struct ListDisksJob {
    id: Uuid,
    backend: Arc<dyn PlatformBackend>,
}

impl ListDisksJob {
    pub fn new(backend: Arc<dyn PlatformBackend>) -> Self {
        Self { id: Uuid::new_v4(), backend }
    }
}

impl Job for ListDisksJob {
    fn id(&self) -> Uuid {
        self.id
    }
    fn name(&self) -> &str {
        "list_disks"
    }
    fn description(&self) -> &str {
        "Enumerate all disks and partitions"
    }
    fn execute(&self, context: &JobContext) -> JobResult<serde_json::Value> {
        context.update_progress(None, None, Some("reading disk inventory"), None, None, None, None);
        let inventory = self.backend.get_disk_inventory().map_err(backend_err)?;
        payload(JobPayload::Inventory(inventory))
    }
    fn plan(&self) -> String {
        "List all disks and partitions visible to the backend.".to_string()
    }
}

pub struct DiskInfoJob {
    id: Uuid,
    backend: Arc<dyn PlatformBackend>,
    device_path: String,
}

impl DiskInfoJob {
    pub fn new(backend: Arc<dyn PlatformBackend>, device_path: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4(), backend, device_path: device_path.into() }
    }
}

impl Job for DiskInfoJob {
    fn id(&self) -> Uuid {
        self.id
    }
    fn name(&self) -> &str {
        "disk_info"
    }
    fn description(&self) -> &str {
        "Fetch details for a single disk"
    }
    fn execute(&self, context: &JobContext) -> JobResult<serde_json::Value> {
        context.update_progress(None, None, Some(&format!("inspecting {}", self.device_path)), None, None, None, None);
        let disk = self.backend.get_disk_info(&self.device_path).map_err(backend_err)?;
        payload(JobPayload::DiskInfo(disk))
    }
    fn plan(&self) -> String {
        format!("Fetch disk info for {}.", self.device_path)
    }
    fn validate(&self) -> Vec<String> {
        if self.device_path.is_empty() {
            vec!["device path is required".to_string()]
        } else {
            Vec::new()
        }
    }
}

pub struct CreatePartitionJob {
    id: Uuid,
    backend: Arc<dyn PlatformBackend>,
    options: PartitionCreateOptions,
}

impl CreatePartitionJob {
    pub fn new(backend: Arc<dyn PlatformBackend>, options: PartitionCreateOptions) -> Self {
        Self { id: Uuid::new_v4(), backend, options }
    }
}

impl Job for CreatePartitionJob {
    fn id(&self) -> Uuid {
        self.id
    }
    fn name(&self) -> &str {
        "create_partition"
    }
    fn description(&self) -> &str {
        "Create a new partition"
    }
    fn execute(&self, context: &JobContext) -> JobResult<serde_json::Value> {
        context.update_progress(None, None, Some("creating partition"), Some("create"), None, None, None);
        let outcome = self.backend.create_partition(&self.options).map_err(backend_err)?;
        if !outcome.success {
            return Err(JobError::Other(anyhow::anyhow!(outcome.message)));
        }
        payload(JobPayload::Message(outcome.message))
    }
    fn plan(&self) -> String {
        format!(
            "Create Partition\nDisk: {}\nSize: {} bytes\nFilesystem: {}\n\nThis operation modifies the disk's partition table.",
            self.options.disk_path, self.options.size_bytes, self.options.filesystem
        )
    }
    fn validate(&self) -> Vec<String> {
        if self.options.disk_path.is_empty() {
            vec!["disk path is required".to_string()]
        } else {
            Vec::new()
        }
    }
}

impl SessionJob for CreatePartitionJob {
    fn operation_type(&self) -> OperationType {
        OperationType::Create
    }
}

pub struct DeletePartitionJob {
    id: Uuid,
    backend: Arc<dyn PlatformBackend>,
    partition_path: String,
    dry_run: bool,
}

impl DeletePartitionJob {
    pub fn new(backend: Arc<dyn PlatformBackend>, partition_path: impl Into<String>, dry_run: bool) -> Self {
        Self { id: Uuid::new_v4(), backend, partition_path: partition_path.into(), dry_run }
    }
}

impl Job for DeletePartitionJob {
    fn id(&self) -> Uuid {
        self.id
    }
    fn name(&self) -> &str {
        "delete_partition"
    }
    fn description(&self) -> &str {
        "Delete a partition"
    }
    fn execute(&self, context: &JobContext) -> JobResult<serde_json::Value> {
        context.update_progress(None, None, Some(&format!("deleting {}", self.partition_path)), None, None, None, None);
        let outcome = self
            .backend
            .delete_partition(&self.partition_path, self.dry_run)
            .map_err(backend_err)?;
        if !outcome.success {
            return Err(JobError::Other(anyhow::anyhow!(outcome.message)));
        }
        payload(JobPayload::Message(outcome.message))
    }
    fn plan(&self) -> String {
        format!(
            "Delete Partition\nTarget: {}\n\nThis will permanently delete the partition; all data on it will be lost.",
            self.partition_path
        )
    }
}

impl SessionJob for DeletePartitionJob {
    fn operation_type(&self) -> OperationType {
        OperationType::Delete
    }
}

pub struct FormatPartitionJob {
    id: Uuid,
    backend: Arc<dyn PlatformBackend>,
    options: FormatOptions,
}

impl FormatPartitionJob {
    pub fn new(backend: Arc<dyn PlatformBackend>, options: FormatOptions) -> Self {
        Self { id: Uuid::new_v4(), backend, options }
    }
}

impl Job for FormatPartitionJob {
    fn id(&self) -> Uuid {
        self.id
    }
    fn name(&self) -> &str {
        "format_partition"
    }
    fn description(&self) -> &str {
        "Format a partition"
    }
    fn execute(&self, context: &JobContext) -> JobResult<serde_json::Value> {
        context.update_progress(
            None,
            None,
            Some(&format!("formatting {} as {}", self.options.partition_path, self.options.filesystem)),
            None,
            None,
            None,
            None,
        );
        let outcome = self.backend.format_partition(&self.options).map_err(backend_err)?;
        if !outcome.success {
            return Err(JobError::Other(anyhow::anyhow!(outcome.message)));
        }
        payload(JobPayload::Message(outcome.message))
    }
    fn plan(&self) -> String {
        format!(
            "Format Partition\nTarget: {}\nFilesystem: {}\n\nThis will erase all data on the partition.",
            self.options.partition_path, self.options.filesystem
        )
    }
}

impl SessionJob for FormatPartitionJob {
    fn operation_type(&self) -> OperationType {
        OperationType::Modify
    }
}

pub struct CloneDiskJob {
    id: Uuid,
    backend: Arc<dyn PlatformBackend>,
    options: CloneOptions,
}

impl CloneDiskJob {
    pub fn new(backend: Arc<dyn PlatformBackend>, options: CloneOptions) -> Self {
        Self { id: Uuid::new_v4(), backend, options }
    }
}

impl Job for CloneDiskJob {
    fn id(&self) -> Uuid {
        self.id
    }
    fn name(&self) -> &str {
        "clone_disk"
    }
    fn description(&self) -> &str {
        "Clone an entire disk"
    }
    fn execute(&self, context: &JobContext) -> JobResult<serde_json::Value> {
        let outcome = diskforge_protocol::clone_disk(self.backend.as_ref(), context, &self.options)
            .map_err(|e| JobError::Other(e.into()))?;
        if !outcome.success {
            return Err(JobError::Other(anyhow::anyhow!(outcome.message)));
        }
        payload(JobPayload::Message(outcome.message))
    }
    fn plan(&self) -> String {
        format!(
            "Clone Disk\nSource: {}\nTarget: {}\nVerify: {}\n\nThis will destroy all data on {}.",
            self.options.source_path, self.options.target_path, self.options.verify, self.options.target_path
        )
    }
    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.options.source_path.is_empty() {
            errors.push("source path is required".to_string());
        }
        if self.options.target_path.is_empty() {
            errors.push("target path is required".to_string());
        }
        errors
    }
}

impl SessionJob for CloneDiskJob {
    fn operation_type(&self) -> OperationType {
        OperationType::Clone
    }
}

pub struct ClonePartitionJob {
    id: Uuid,
    backend: Arc<dyn PlatformBackend>,
    options: CloneOptions,
}

impl ClonePartitionJob {
    pub fn new(backend: Arc<dyn PlatformBackend>, options: CloneOptions) -> Self {
        Self { id: Uuid::new_v4(), backend, options }
    }
}

impl Job for ClonePartitionJob {
    fn id(&self) -> Uuid {
        self.id
    }
    fn name(&self) -> &str {
        "clone_partition"
    }
    fn description(&self) -> &str {
        "Clone a single partition"
    }
    fn execute(&self, context: &JobContext) -> JobResult<serde_json::Value> {
        let outcome = diskforge_protocol::clone_partition(self.backend.as_ref(), context, &self.options)
            .map_err(|e| JobError::Other(e.into()))?;
        if !outcome.success {
            return Err(JobError::Other(anyhow::anyhow!(outcome.message)));
        }
        payload(JobPayload::Message(outcome.message))
    }
    fn plan(&self) -> String {
        format!(
            "Clone Partition\nSource: {}\nTarget: {}\nVerify: {}\n\nThis will destroy all data on {}.",
            self.options.source_path, self.options.target_path, self.options.verify, self.options.target_path
        )
    }
}

impl SessionJob for ClonePartitionJob {
    fn operation_type(&self) -> OperationType {
        OperationType::Clone
    }
}

pub struct CreateImageJob {
    id: Uuid,
    backend: Arc<dyn PlatformBackend>,
    options: ImageOptions,
}

impl CreateImageJob {
    pub fn new(backend: Arc<dyn PlatformBackend>, options: ImageOptions) -> Self {
        Self { id: Uuid::new_v4(), backend, options }
    }
}

impl Job for CreateImageJob {
    fn id(&self) -> Uuid {
        self.id
    }
    fn name(&self) -> &str {
        "create_image"
    }
    fn description(&self) -> &str {
        "Create a backup image"
    }
    fn execute(&self, context: &JobContext) -> JobResult<serde_json::Value> {
        let info = diskforge_protocol::create_image(self.backend.as_ref(), context, &self.options)
            .map_err(|e| JobError::Other(e.into()))?;
        payload(JobPayload::Image(info))
    }
    fn plan(&self) -> String {
        format!(
            "Create Disk Image\nSource: {}\nOutput: {}\nCompression: {:?}\n\nThis operation reads the source device.",
            self.options.source_path, self.options.image_path, self.options.compression
        )
    }
}

impl SessionJob for CreateImageJob {
    fn operation_type(&self) -> OperationType {
        OperationType::Create
    }
}

pub struct RestoreImageJob {
    id: Uuid,
    backend: Arc<dyn PlatformBackend>,
    options: RestoreOptions,
}

impl RestoreImageJob {
    pub fn new(backend: Arc<dyn PlatformBackend>, options: RestoreOptions) -> Self {
        Self { id: Uuid::new_v4(), backend, options }
    }
}

impl Job for RestoreImageJob {
    fn id(&self) -> Uuid {
        self.id
    }
    fn name(&self) -> &str {
        "restore_image"
    }
    fn description(&self) -> &str {
        "Restore a backup image"
    }
    fn execute(&self, context: &JobContext) -> JobResult<serde_json::Value> {
        let outcome = diskforge_protocol::restore_image(self.backend.as_ref(), context, &self.options)
            .map_err(|e| JobError::Other(e.into()))?;
        if !outcome.success {
            return Err(JobError::Other(anyhow::anyhow!(outcome.message)));
        }
        payload(JobPayload::Message(outcome.message))
    }
    fn plan(&self) -> String {
        format!(
            "Restore Disk Image\nImage: {}\nTarget: {}\nVerify: {}\n\nThis will destroy all data on {}.",
            self.options.image_path, self.options.target_path, self.options.verify, self.options.target_path
        )
    }
}

impl SessionJob for RestoreImageJob {
    fn operation_type(&self) -> OperationType {
        OperationType::Restore
    }
}

pub struct CreateRescueMediaJob {
    id: Uuid,
    backend: Arc<dyn PlatformBackend>,
    output_path: String,
    dry_run: bool,
}

impl CreateRescueMediaJob {
    pub fn new(backend: Arc<dyn PlatformBackend>, output_path: impl Into<String>, dry_run: bool) -> Self {
        Self { id: Uuid::new_v4(), backend, output_path: output_path.into(), dry_run }
    }
}

impl Job for CreateRescueMediaJob {
    fn id(&self) -> Uuid {
        self.id
    }
    fn name(&self) -> &str {
        "create_rescue_media"
    }
    fn description(&self) -> &str {
        "Create bootable rescue media"
    }
    fn execute(&self, context: &JobContext) -> JobResult<serde_json::Value> {
        context.update_progress(None, None, Some("creating rescue media"), None, None, None, None);
        let (outcome, artifacts) = self
            .backend
            .create_rescue_media(&self.output_path, self.dry_run)
            .map_err(backend_err)?;
        if !outcome.success {
            return Err(JobError::Other(anyhow::anyhow!(outcome.message)));
        }
        payload(JobPayload::Artifacts(artifacts))
    }
    fn plan(&self) -> String {
        format!(
            "Create Rescue Media\nOutput: {}\n\nThis creates recovery tools for emergency disk operations.",
            self.output_path
        )
    }
}

impl SessionJob for CreateRescueMediaJob {
    fn operation_type(&self) -> OperationType {
        OperationType::Create
    }
}

impl SessionJob for ListDisksJob {}
impl SessionJob for DiskInfoJob {}
