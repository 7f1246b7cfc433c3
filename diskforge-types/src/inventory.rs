use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::disk::Disk;
use crate::partition::Partition;

/// Point-in-time snapshot of the disk/partition graph obtained from a
/// `PlatformBackend`. Never assumed to track the live system: every call
/// to the backend produces a fresh `DiskInventory`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskInventory {
    pub disks: Vec<Disk>,
    pub captured_at: DateTime<Utc>,
    pub platform: String,
    /// Non-fatal parse errors accumulated while normalizing backend output.
    pub parse_errors: Vec<String>,
}

impl DiskInventory {
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            disks: Vec::new(),
            captured_at: Utc::now(),
            platform: platform.into(),
            parse_errors: Vec::new(),
        }
    }

    pub fn find_disk(&self, device_path: &str) -> Option<&Disk> {
        self.disks.iter().find(|d| d.device_path == device_path)
    }

    /// Look up a partition anywhere in the inventory, returning the owning
    /// disk alongside it (arena + index pattern, spec.md §9 — there is no
    /// partition-to-disk back-pointer in the model itself).
    pub fn find_partition(&self, device_path: &str) -> Option<(&Disk, &Partition)> {
        self.disks.iter().find_map(|disk| {
            disk.partition_by_device_path(device_path)
                .map(|part| (disk, part))
        })
    }

    /// Any device path, disk or partition, known to this inventory.
    pub fn contains_device(&self, device_path: &str) -> bool {
        self.find_disk(device_path).is_some() || self.find_partition(device_path).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk::DiskType;
    use crate::filesystem::FileSystem;
    use crate::partition::{PartitionFlags, PartitionStyle};

    fn sample_inventory() -> DiskInventory {
        let mut inv = DiskInventory::new("linux");
        inv.disks.push(Disk {
            device_path: "/dev/sda".into(),
            model: "Test".into(),
            serial: None,
            vendor: None,
            firmware_version: None,
            wwn: None,
            interface: None,
            size_bytes: 1_000_000_000,
            sector_size: 512,
            disk_type: DiskType::Ssd,
            partition_style: PartitionStyle::Gpt,
            is_removable: false,
            is_read_only: false,
            is_system_disk: false,
            partitions: vec![Partition {
                device_path: "/dev/sda1".into(),
                number: 1,
                partition_type_uuid: None,
                start_sector: 2048,
                end_sector: 206847,
                size_bytes: 500_000_000,
                filesystem: FileSystem::Ext4,
                label: Some("root".into()),
                uuid: None,
                flags: PartitionFlags::empty(),
                used_space_bytes: None,
                free_space_bytes: None,
                mountpoint: Some("/".into()),
            }],
            smart_info: None,
        });
        inv
    }

    #[test]
    fn finds_disk_by_path() {
        let inv = sample_inventory();
        assert!(inv.find_disk("/dev/sda").is_some());
        assert!(inv.find_disk("/dev/sdz").is_none());
    }

    #[test]
    fn finds_partition_with_owning_disk() {
        let inv = sample_inventory();
        let (disk, part) = inv.find_partition("/dev/sda1").expect("partition present");
        assert_eq!(disk.device_path, "/dev/sda");
        assert_eq!(part.label.as_deref(), Some("root"));
    }

    #[test]
    fn contains_device_covers_disks_and_partitions() {
        let inv = sample_inventory();
        assert!(inv.contains_device("/dev/sda"));
        assert!(inv.contains_device("/dev/sda1"));
        assert!(!inv.contains_device("/dev/sdb"));
    }
}
