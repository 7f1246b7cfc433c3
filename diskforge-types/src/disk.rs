use serde::{Deserialize, Serialize};
use std::fmt;

use crate::partition::{Partition, PartitionStyle};

/// Coarse classification of the physical/virtual medium backing a disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiskType {
    Hdd,
    Ssd,
    Nvme,
    Usb,
    Virtual,
    Raid,
    Loop,
    Unknown,
}

impl fmt::Display for DiskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Hdd => "HDD",
            Self::Ssd => "SSD",
            Self::Nvme => "NVMe",
            Self::Usb => "USB",
            Self::Virtual => "Virtual",
            Self::Raid => "RAID",
            Self::Loop => "Loop",
            Self::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// SMART health snapshot for a disk, captured at inventory time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartInfo {
    pub available: bool,
    pub healthy: bool,
    pub temperature_celsius: Option<i16>,
    pub power_on_hours: Option<u64>,
    pub reallocated_sectors: Option<u64>,
    pub pending_sectors: Option<u64>,
    /// Opaque, backend-specific raw attribute payload (e.g. the full
    /// `smartctl -j` JSON document) kept for audit/debugging but not
    /// interpreted by the core.
    pub raw: serde_json::Value,
}

impl Default for SmartInfo {
    fn default() -> Self {
        Self {
            available: false,
            healthy: true,
            temperature_celsius: None,
            power_on_hours: None,
            reallocated_sectors: None,
            pending_sectors: None,
            raw: serde_json::Value::Null,
        }
    }
}

/// A physical or virtual disk and its partitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disk {
    pub device_path: String,
    pub model: String,
    pub serial: Option<String>,
    pub vendor: Option<String>,
    pub firmware_version: Option<String>,
    pub wwn: Option<String>,
    pub interface: Option<String>,

    pub size_bytes: u64,
    pub sector_size: u64,

    pub disk_type: DiskType,
    pub partition_style: PartitionStyle,

    pub is_removable: bool,
    pub is_read_only: bool,
    pub is_system_disk: bool,

    /// Ordered by `Partition::number`.
    pub partitions: Vec<Partition>,

    pub smart_info: Option<SmartInfo>,
}

impl Disk {
    pub fn size_sectors(&self) -> u64 {
        if self.sector_size == 0 {
            0
        } else {
            self.size_bytes / self.sector_size
        }
    }

    pub fn total_partition_size(&self) -> u64 {
        self.partitions.iter().map(|p| p.size_bytes).sum()
    }

    pub fn unallocated_bytes(&self) -> u64 {
        self.size_bytes.saturating_sub(self.total_partition_size())
    }

    pub fn partition_by_number(&self, number: u32) -> Option<&Partition> {
        self.partitions.iter().find(|p| p.number == number)
    }

    pub fn partition_by_device_path(&self, path: &str) -> Option<&Partition> {
        self.partitions.iter().find(|p| p.device_path == path)
    }
}
