use std::collections::HashMap;

use diskforge_types::{
    ConvertDiskOptions, Disk, DiskInventory, FormatOptions, ImageInfo, MigrationOptions,
    Partition, PartitionCreateOptions, PartitionRecoveryOptions, ResizeMoveOptions, WipeOptions,
};

use crate::backend::{OperationOutcome, PlatformBackend};
use crate::command::CommandResult;
use crate::error::{BackendError, Result};
use crate::raw::BoxedRawDevice;

/// A backend that reports an empty inventory and refuses every mutating
/// operation. Useful as a safe default when no real backend has been
/// wired up yet (e.g. unsupported platform, or a dry-run-only context).
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBackend;

impl PlatformBackend for NullBackend {
    fn name(&self) -> &str {
        "null"
    }

    fn requires_admin(&self) -> bool {
        false
    }

    fn is_admin(&self) -> bool {
        false
    }

    fn get_disk_inventory(&self) -> Result<DiskInventory> {
        Ok(DiskInventory::new(self.name()))
    }

    fn get_disk_info(&self, _device_path: &str) -> Result<Option<Disk>> {
        Ok(None)
    }

    fn get_partition_info(&self, _device_path: &str) -> Result<Option<Partition>> {
        Ok(None)
    }

    fn refresh_disk(&self, _device_path: &str) -> Result<Option<Disk>> {
        Ok(None)
    }

    fn get_mounted_devices(&self) -> Result<HashMap<String, String>> {
        Ok(HashMap::new())
    }

    fn is_device_mounted(&self, _device_path: &str) -> Result<bool> {
        Ok(false)
    }

    fn is_system_device(&self, _device_path: &str) -> Result<bool> {
        Ok(false)
    }

    fn get_smart_info(&self, _device_path: &str) -> Result<Option<serde_json::Value>> {
        Ok(None)
    }

    fn create_partition(&self, _options: &PartitionCreateOptions) -> Result<OperationOutcome> {
        Err(BackendError::BackendUnavailable(self.name().into()))
    }

    fn delete_partition(&self, _partition_path: &str, _dry_run: bool) -> Result<OperationOutcome> {
        Err(BackendError::BackendUnavailable(self.name().into()))
    }

    fn format_partition(&self, _options: &FormatOptions) -> Result<OperationOutcome> {
        Err(BackendError::BackendUnavailable(self.name().into()))
    }

    fn resize_partition(&self, _options: &ResizeMoveOptions) -> Result<OperationOutcome> {
        Err(BackendError::BackendUnavailable(self.name().into()))
    }

    fn resize_move_partition(&self, _options: &ResizeMoveOptions) -> Result<OperationOutcome> {
        Err(BackendError::BackendUnavailable(self.name().into()))
    }

    fn merge_partitions(
        &self,
        _first_path: &str,
        _second_path: &str,
        _dry_run: bool,
    ) -> Result<OperationOutcome> {
        Err(BackendError::BackendUnavailable(self.name().into()))
    }

    fn split_partition(
        &self,
        _partition_path: &str,
        _split_offset_bytes: u64,
        _dry_run: bool,
    ) -> Result<OperationOutcome> {
        Err(BackendError::BackendUnavailable(self.name().into()))
    }

    fn extend_partition(
        &self,
        _partition_path: &str,
        _new_size_bytes: u64,
        _dry_run: bool,
    ) -> Result<OperationOutcome> {
        Err(BackendError::BackendUnavailable(self.name().into()))
    }

    fn shrink_partition(
        &self,
        _partition_path: &str,
        _new_size_bytes: u64,
        _dry_run: bool,
    ) -> Result<OperationOutcome> {
        Err(BackendError::BackendUnavailable(self.name().into()))
    }

    fn wipe_device(&self, _options: &WipeOptions) -> Result<OperationOutcome> {
        Err(BackendError::BackendUnavailable(self.name().into()))
    }

    fn align_partition_4k(&self, _partition_path: &str, _dry_run: bool) -> Result<OperationOutcome> {
        Err(BackendError::BackendUnavailable(self.name().into()))
    }

    fn convert_disk_partition_style(
        &self,
        _options: &ConvertDiskOptions,
    ) -> Result<OperationOutcome> {
        Err(BackendError::BackendUnavailable(self.name().into()))
    }

    fn migrate_system(&self, _options: &MigrationOptions) -> Result<OperationOutcome> {
        Err(BackendError::BackendUnavailable(self.name().into()))
    }

    fn recover_partitions(
        &self,
        _options: &PartitionRecoveryOptions,
    ) -> Result<(OperationOutcome, HashMap<String, String>)> {
        Err(BackendError::BackendUnavailable(self.name().into()))
    }

    fn mount_partition(
        &self,
        _partition_path: &str,
        _mount_point: &str,
        _options: &[String],
    ) -> Result<OperationOutcome> {
        Err(BackendError::BackendUnavailable(self.name().into()))
    }

    fn unmount_partition(&self, _partition_path: &str, _force: bool) -> Result<OperationOutcome> {
        Err(BackendError::BackendUnavailable(self.name().into()))
    }

    fn create_rescue_media(
        &self,
        _output_path: &str,
        _dry_run: bool,
    ) -> Result<(OperationOutcome, HashMap<String, String>)> {
        Err(BackendError::BackendUnavailable(self.name().into()))
    }

    fn open_reader(&self, path: &str) -> Result<BoxedRawDevice> {
        Err(BackendError::DeviceNotFound(path.to_string()))
    }

    fn open_writer(&self, path: &str) -> Result<BoxedRawDevice> {
        Err(BackendError::DeviceNotFound(path.to_string()))
    }

    fn get_image_info(&self, _image_path: &str) -> Result<Option<ImageInfo>> {
        Ok(None)
    }

    fn run_command(
        &self,
        argv: &[String],
        _timeout_secs: u64,
        _check: bool,
        _capture: bool,
    ) -> Result<CommandResult> {
        Err(BackendError::BackendUnavailable(argv.join(" ")))
    }

    fn validate_device_path(&self, path: &str) -> (bool, String) {
        (false, format!("no backend available to validate {path}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inventory_is_always_empty() {
        let backend = NullBackend;
        let inv = backend.get_disk_inventory().unwrap();
        assert!(inv.disks.is_empty());
    }

    #[test]
    fn mutating_operations_report_backend_unavailable() {
        let backend = NullBackend;
        let err = backend
            .wipe_device(&WipeOptions {
                device_path: "/dev/sda".into(),
                secure: false,
                dry_run: false,
            })
            .unwrap_err();
        assert!(matches!(err, BackendError::BackendUnavailable(_)));
    }
}
