//! In-memory reference backend used by test suites across the workspace
//! to exercise clone/verify flows without real block devices. Not a
//! production backend: concrete platform glue is out of scope for this
//! core.

use std::collections::HashMap;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::sync::{Arc, Mutex};

use diskforge_types::{
    ConvertDiskOptions, Disk, DiskInventory, DiskType, FormatOptions, ImageInfo, MigrationOptions,
    Partition, PartitionCreateOptions, PartitionRecoveryOptions, PartitionStyle,
    ResizeMoveOptions, WipeOptions,
};

use crate::backend::{OperationOutcome, PlatformBackend};
use crate::command::CommandResult;
use crate::error::{BackendError, Result};
use crate::raw::{BoxedRawDevice, RawDevice};

type SharedBuffer = Arc<Mutex<Vec<u8>>>;

struct MemCursor {
    buffer: SharedBuffer,
    position: u64,
}

impl Read for MemCursor {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let buffer = self.buffer.lock().unwrap();
        let pos = self.position as usize;
        if pos >= buffer.len() {
            return Ok(0);
        }
        let available = &buffer[pos..];
        let n = available.len().min(out.len());
        out[..n].copy_from_slice(&available[..n]);
        self.position += n as u64;
        Ok(n)
    }
}

impl Write for MemCursor {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut buffer = self.buffer.lock().unwrap();
        let pos = self.position as usize;
        if pos + data.len() > buffer.len() {
            buffer.resize(pos + data.len(), 0);
        }
        buffer[pos..pos + data.len()].copy_from_slice(data);
        self.position += data.len() as u64;
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for MemCursor {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let len = self.buffer.lock().unwrap().len() as i64;
        let new_pos = match pos {
            SeekFrom::Start(p) => p as i64,
            SeekFrom::End(p) => len + p,
            SeekFrom::Current(p) => self.position as i64 + p,
        };
        if new_pos < 0 {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "negative seek"));
        }
        self.position = new_pos as u64;
        Ok(self.position)
    }
}

impl RawDevice for MemCursor {
    fn len_bytes(&self) -> u64 {
        self.buffer.lock().unwrap().len() as u64
    }

    fn sync(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A named in-memory device: a fixed-size disk/partition plus its
/// metadata, addressable by `device_path`.
#[derive(Clone)]
pub struct MemoryDevice {
    pub disk: Disk,
    buffer: SharedBuffer,
}

pub struct MemoryBackend {
    devices: Mutex<HashMap<String, MemoryDevice>>,
    images: Mutex<HashMap<String, (SharedBuffer, ImageInfo)>>,
    mounted: Mutex<HashMap<String, String>>,
    system_devices: Mutex<Vec<String>>,
    admin: bool,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            devices: Mutex::new(HashMap::new()),
            images: Mutex::new(HashMap::new()),
            mounted: Mutex::new(HashMap::new()),
            system_devices: Mutex::new(Vec::new()),
            admin: true,
        }
    }

    /// Register an in-memory device of `size_bytes`, optionally seeded
    /// with `initial_data` (truncated/zero-padded to `size_bytes`).
    pub fn add_disk(&self, device_path: &str, size_bytes: u64, initial_data: Option<&[u8]>) {
        let mut data = initial_data.map(|d| d.to_vec()).unwrap_or_default();
        data.resize(size_bytes as usize, 0);

        let disk = Disk {
            device_path: device_path.to_string(),
            model: "Memory Disk".into(),
            serial: None,
            vendor: None,
            firmware_version: None,
            wwn: None,
            interface: None,
            size_bytes,
            sector_size: 512,
            disk_type: DiskType::Virtual,
            partition_style: PartitionStyle::Unknown,
            is_removable: false,
            is_read_only: false,
            is_system_disk: false,
            partitions: Vec::new(),
            smart_info: None,
        };

        self.devices.lock().unwrap().insert(
            device_path.to_string(),
            MemoryDevice {
                disk,
                buffer: Arc::new(Mutex::new(data)),
            },
        );
    }

    pub fn mark_system_disk(&self, device_path: &str) {
        self.system_devices
            .lock()
            .unwrap()
            .push(device_path.to_string());
    }

    pub fn mark_mounted(&self, device_path: &str, mount_point: &str) {
        self.mounted
            .lock()
            .unwrap()
            .insert(device_path.to_string(), mount_point.to_string());
    }

    pub fn device_bytes(&self, device_path: &str) -> Option<Vec<u8>> {
        self.devices
            .lock()
            .unwrap()
            .get(device_path)
            .map(|d| d.buffer.lock().unwrap().clone())
    }

    fn get_buffer(&self, path: &str) -> Result<SharedBuffer> {
        if let Some(dev) = self.devices.lock().unwrap().get(path) {
            return Ok(dev.buffer.clone());
        }
        if let Some((buf, _)) = self.images.lock().unwrap().get(path) {
            return Ok(buf.clone());
        }
        Err(BackendError::DeviceNotFound(path.to_string()))
    }

    fn unsupported(op: &str) -> Result<OperationOutcome> {
        Err(BackendError::Unsupported(op.to_string()))
    }
}

impl PlatformBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    fn requires_admin(&self) -> bool {
        false
    }

    fn is_admin(&self) -> bool {
        self.admin
    }

    fn get_disk_inventory(&self) -> Result<DiskInventory> {
        let mut inv = DiskInventory::new(self.name());
        inv.disks = self
            .devices
            .lock()
            .unwrap()
            .values()
            .map(|d| d.disk.clone())
            .collect();
        inv.disks.sort_by(|a, b| a.device_path.cmp(&b.device_path));
        Ok(inv)
    }

    fn get_disk_info(&self, device_path: &str) -> Result<Option<Disk>> {
        Ok(self
            .devices
            .lock()
            .unwrap()
            .get(device_path)
            .map(|d| d.disk.clone()))
    }

    fn get_partition_info(&self, device_path: &str) -> Result<Option<Partition>> {
        Ok(self
            .devices
            .lock()
            .unwrap()
            .values()
            .find_map(|d| d.disk.partition_by_device_path(device_path).cloned()))
    }

    fn refresh_disk(&self, device_path: &str) -> Result<Option<Disk>> {
        self.get_disk_info(device_path)
    }

    fn get_mounted_devices(&self) -> Result<HashMap<String, String>> {
        Ok(self.mounted.lock().unwrap().clone())
    }

    fn is_device_mounted(&self, device_path: &str) -> Result<bool> {
        Ok(self.mounted.lock().unwrap().contains_key(device_path))
    }

    fn is_system_device(&self, device_path: &str) -> Result<bool> {
        Ok(self
            .system_devices
            .lock()
            .unwrap()
            .iter()
            .any(|d| d == device_path))
    }

    fn get_smart_info(&self, _device_path: &str) -> Result<Option<serde_json::Value>> {
        Ok(None)
    }

    fn create_partition(&self, _options: &PartitionCreateOptions) -> Result<OperationOutcome> {
        Self::unsupported("create_partition")
    }

    fn delete_partition(&self, _partition_path: &str, _dry_run: bool) -> Result<OperationOutcome> {
        Self::unsupported("delete_partition")
    }

    fn format_partition(&self, _options: &FormatOptions) -> Result<OperationOutcome> {
        Self::unsupported("format_partition")
    }

    fn resize_partition(&self, _options: &ResizeMoveOptions) -> Result<OperationOutcome> {
        Self::unsupported("resize_partition")
    }

    fn resize_move_partition(&self, _options: &ResizeMoveOptions) -> Result<OperationOutcome> {
        Self::unsupported("resize_move_partition")
    }

    fn merge_partitions(
        &self,
        _first_path: &str,
        _second_path: &str,
        _dry_run: bool,
    ) -> Result<OperationOutcome> {
        Self::unsupported("merge_partitions")
    }

    fn split_partition(
        &self,
        _partition_path: &str,
        _split_offset_bytes: u64,
        _dry_run: bool,
    ) -> Result<OperationOutcome> {
        Self::unsupported("split_partition")
    }

    fn extend_partition(
        &self,
        _partition_path: &str,
        _new_size_bytes: u64,
        _dry_run: bool,
    ) -> Result<OperationOutcome> {
        Self::unsupported("extend_partition")
    }

    fn shrink_partition(
        &self,
        _partition_path: &str,
        _new_size_bytes: u64,
        _dry_run: bool,
    ) -> Result<OperationOutcome> {
        Self::unsupported("shrink_partition")
    }

    fn wipe_device(&self, options: &WipeOptions) -> Result<OperationOutcome> {
        if options.dry_run {
            return Ok(OperationOutcome::ok(format!(
                "would wipe {}",
                options.device_path
            )));
        }
        let buffer = self.get_buffer(&options.device_path)?;
        let mut buf = buffer.lock().unwrap();
        buf.iter_mut().for_each(|b| *b = 0);
        Ok(OperationOutcome::ok(format!("wiped {}", options.device_path)))
    }

    fn align_partition_4k(&self, _partition_path: &str, _dry_run: bool) -> Result<OperationOutcome> {
        Self::unsupported("align_partition_4k")
    }

    fn convert_disk_partition_style(
        &self,
        _options: &ConvertDiskOptions,
    ) -> Result<OperationOutcome> {
        Self::unsupported("convert_disk_partition_style")
    }

    fn migrate_system(&self, _options: &MigrationOptions) -> Result<OperationOutcome> {
        Self::unsupported("migrate_system")
    }

    fn recover_partitions(
        &self,
        _options: &PartitionRecoveryOptions,
    ) -> Result<(OperationOutcome, HashMap<String, String>)> {
        Err(BackendError::Unsupported("recover_partitions".into()))
    }

    fn mount_partition(
        &self,
        partition_path: &str,
        mount_point: &str,
        _options: &[String],
    ) -> Result<OperationOutcome> {
        self.mounted
            .lock()
            .unwrap()
            .insert(partition_path.to_string(), mount_point.to_string());
        Ok(OperationOutcome::ok(format!(
            "mounted {partition_path} at {mount_point}"
        )))
    }

    fn unmount_partition(&self, partition_path: &str, _force: bool) -> Result<OperationOutcome> {
        self.mounted.lock().unwrap().remove(partition_path);
        Ok(OperationOutcome::ok(format!("unmounted {partition_path}")))
    }

    fn create_rescue_media(
        &self,
        _output_path: &str,
        _dry_run: bool,
    ) -> Result<(OperationOutcome, HashMap<String, String>)> {
        Err(BackendError::Unsupported("create_rescue_media".into()))
    }

    fn open_reader(&self, path: &str) -> Result<BoxedRawDevice> {
        let buffer = self.get_buffer(path)?;
        Ok(Box::new(MemCursor { buffer, position: 0 }))
    }

    fn open_writer(&self, path: &str) -> Result<BoxedRawDevice> {
        let buffer = match self.devices.lock().unwrap().get(path) {
            Some(dev) => dev.buffer.clone(),
            None => {
                // Writer targets (images) are created on first open.
                let buffer: SharedBuffer = Arc::new(Mutex::new(Vec::new()));
                self.images.lock().unwrap().insert(
                    path.to_string(),
                    (buffer.clone(), ImageInfo::new(path, "")),
                );
                buffer
            }
        };
        Ok(Box::new(MemCursor { buffer, position: 0 }))
    }

    fn get_image_info(&self, image_path: &str) -> Result<Option<ImageInfo>> {
        Ok(self
            .images
            .lock()
            .unwrap()
            .get(image_path)
            .map(|(_, info)| info.clone()))
    }

    fn run_command(
        &self,
        argv: &[String],
        _timeout_secs: u64,
        _check: bool,
        _capture: bool,
    ) -> Result<CommandResult> {
        Ok(CommandResult {
            returncode: 0,
            stdout: String::new(),
            stderr: String::new(),
            command: argv.to_vec(),
            duration: std::time::Duration::from_millis(0),
        })
    }

    fn validate_device_path(&self, path: &str) -> (bool, String) {
        if self.devices.lock().unwrap().contains_key(path) {
            (true, "valid".into())
        } else {
            (false, format!("unknown device: {path}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registered_disk_appears_in_inventory() {
        let backend = MemoryBackend::new();
        backend.add_disk("/dev/sda", 4 * 1024 * 1024, None);

        let inv = backend.get_disk_inventory().unwrap();
        assert_eq!(inv.disks.len(), 1);
        assert_eq!(inv.disks[0].device_path, "/dev/sda");
    }

    #[test]
    fn reader_and_writer_share_the_same_backing_buffer() {
        let backend = MemoryBackend::new();
        backend.add_disk("/dev/sda", 16, Some(b"0123456789abcdef"));

        let mut writer = backend.open_writer("/dev/sda").unwrap();
        writer.write_all(b"XXXX").unwrap();

        let bytes = backend.device_bytes("/dev/sda").unwrap();
        assert_eq!(&bytes[..4], b"XXXX");
        assert_eq!(&bytes[4..], b"456789abcdef");
    }

    #[test]
    fn wipe_device_zeroes_the_buffer() {
        let backend = MemoryBackend::new();
        backend.add_disk("/dev/sda", 8, Some(b"deadbeef"));
        backend
            .wipe_device(&WipeOptions {
                device_path: "/dev/sda".into(),
                secure: true,
                dry_run: false,
            })
            .unwrap();
        assert_eq!(backend.device_bytes("/dev/sda").unwrap(), vec![0u8; 8]);
    }
}
