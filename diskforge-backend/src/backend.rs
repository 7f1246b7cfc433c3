use std::collections::HashMap;

use diskforge_types::{
    ConvertDiskOptions, Disk, DiskInventory, FormatOptions, ImageInfo, MigrationOptions,
    Partition, PartitionCreateOptions, PartitionRecoveryOptions, ResizeMoveOptions, WipeOptions,
};

use crate::command::CommandResult;
use crate::error::Result;
use crate::raw::BoxedRawDevice;

/// Outcome of a mutating backend operation: every such method returns
/// a `(success, message)` pair rather than throwing on expected
/// failures.
#[derive(Debug, Clone)]
pub struct OperationOutcome {
    pub success: bool,
    pub message: String,
}

impl OperationOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// The abstract interface a platform-specific implementation provides.
/// The core never assumes a concrete OS; it is parameterized over this
/// capability trait rather than a class hierarchy of backend types.
///
/// Every observing method is assumed idempotent and cheap; every
/// mutating method is destructive and must be gated by
/// `diskforge-safety` before being called.
pub trait PlatformBackend: Send + Sync {
    /// Lowercase platform tag, e.g. "linux", "windows".
    fn name(&self) -> &str;

    fn requires_admin(&self) -> bool;

    fn is_admin(&self) -> bool;

    // ---- Inventory ----

    fn get_disk_inventory(&self) -> Result<DiskInventory>;

    fn get_disk_info(&self, device_path: &str) -> Result<Option<Disk>>;

    fn get_partition_info(&self, device_path: &str) -> Result<Option<Partition>>;

    fn refresh_disk(&self, device_path: &str) -> Result<Option<Disk>>;

    fn get_mounted_devices(&self) -> Result<HashMap<String, String>>;

    fn is_device_mounted(&self, device_path: &str) -> Result<bool>;

    fn is_system_device(&self, device_path: &str) -> Result<bool>;

    fn get_smart_info(&self, device_path: &str) -> Result<Option<serde_json::Value>>;

    // ---- Partition operations ----

    fn create_partition(
        &self,
        options: &PartitionCreateOptions,
    ) -> Result<OperationOutcome>;

    fn delete_partition(&self, partition_path: &str, dry_run: bool) -> Result<OperationOutcome>;

    fn format_partition(&self, options: &FormatOptions) -> Result<OperationOutcome>;

    fn resize_partition(&self, options: &ResizeMoveOptions) -> Result<OperationOutcome>;

    fn resize_move_partition(&self, options: &ResizeMoveOptions) -> Result<OperationOutcome>;

    fn merge_partitions(
        &self,
        first_path: &str,
        second_path: &str,
        dry_run: bool,
    ) -> Result<OperationOutcome>;

    fn split_partition(
        &self,
        partition_path: &str,
        split_offset_bytes: u64,
        dry_run: bool,
    ) -> Result<OperationOutcome>;

    fn extend_partition(
        &self,
        partition_path: &str,
        new_size_bytes: u64,
        dry_run: bool,
    ) -> Result<OperationOutcome>;

    fn shrink_partition(
        &self,
        partition_path: &str,
        new_size_bytes: u64,
        dry_run: bool,
    ) -> Result<OperationOutcome>;

    fn wipe_device(&self, options: &WipeOptions) -> Result<OperationOutcome>;

    fn align_partition_4k(&self, partition_path: &str, dry_run: bool) -> Result<OperationOutcome>;

    fn convert_disk_partition_style(
        &self,
        options: &ConvertDiskOptions,
    ) -> Result<OperationOutcome>;

    fn migrate_system(&self, options: &MigrationOptions) -> Result<OperationOutcome>;

    fn recover_partitions(
        &self,
        options: &PartitionRecoveryOptions,
    ) -> Result<(OperationOutcome, HashMap<String, String>)>;

    // ---- Mount ----

    fn mount_partition(
        &self,
        partition_path: &str,
        mount_point: &str,
        options: &[String],
    ) -> Result<OperationOutcome>;

    fn unmount_partition(&self, partition_path: &str, force: bool) -> Result<OperationOutcome>;

    // ---- Rescue media ----

    fn create_rescue_media(
        &self,
        output_path: &str,
        dry_run: bool,
    ) -> Result<(OperationOutcome, HashMap<String, String>)>;

    // ---- Raw device access (used by diskforge-protocol) ----

    /// Open a device or file for raw reading (source of a clone/image).
    fn open_reader(&self, path: &str) -> Result<BoxedRawDevice>;

    /// Open a device or file for raw writing (target of a
    /// clone/restore, or the destination of an image file).
    fn open_writer(&self, path: &str) -> Result<BoxedRawDevice>;

    fn get_image_info(&self, image_path: &str) -> Result<Option<ImageInfo>>;

    // ---- Utility ----

    fn run_command(
        &self,
        argv: &[String],
        timeout_secs: u64,
        check: bool,
        capture: bool,
    ) -> Result<CommandResult>;

    fn validate_device_path(&self, path: &str) -> (bool, String);
}
