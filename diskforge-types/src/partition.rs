use enumflags2::{bitflags, BitFlags};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::filesystem::FileSystem;

/// Partition table style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartitionStyle {
    Gpt,
    Mbr,
    Raw,
    Unknown,
}

impl PartitionStyle {
    /// Parse a backend-reported table type string or numeric code.
    ///
    /// Accepts both vendor-tool spellings (`gpt`, `dos`, `mbr`, `msdos`,
    /// `loop`) and the numeric codes some tools emit (`2` for GPT, `1` for
    /// MBR), per spec.md §4.2.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "gpt" | "2" => Self::Gpt,
            "dos" | "mbr" | "msdos" | "1" => Self::Mbr,
            "loop" => Self::Raw,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for PartitionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Gpt => "GPT",
            Self::Mbr => "MBR",
            Self::Raw => "RAW",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Partition attribute flags. Modeled as a bitflag set (spec.md calls it
/// a "set") rather than a `Vec`/`HashSet`, matching the teacher's use of
/// `enumflags2` for partition attributes.
#[bitflags]
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartitionFlag {
    Boot = 1 << 0,
    Esp = 1 << 1,
    Hidden = 1 << 2,
    System = 1 << 3,
    Active = 1 << 4,
    Lvm = 1 << 5,
    Raid = 1 << 6,
    Swap = 1 << 7,
    MsftRes = 1 << 8,
    MsftData = 1 << 9,
    Diag = 1 << 10,
    ReadOnly = 1 << 11,
}

pub type PartitionFlags = BitFlags<PartitionFlag>;

/// Known GPT partition type GUIDs mapped to the flag(s) they imply.
///
/// An unknown GUID implies no flags (spec.md §4.2: "Unknown GUIDs do not
/// add flags"). Table is intentionally small — only the GUIDs the spec
/// requires at minimum (Microsoft + UEFI ESP) plus the common Linux ones
/// the original Linux backend recognized.
pub const GPT_TYPE_GUID_FLAGS: &[(&str, PartitionFlag)] = &[
    ("c12a7328-f81f-11d2-ba4b-00a0c93ec93b", PartitionFlag::Esp),
    ("21686148-6449-6e6f-744e-656564454649", PartitionFlag::Boot),
    ("0657fd6d-a4ab-43c4-84e5-0933c84b4f4f", PartitionFlag::Swap),
    ("e6d6d379-f507-44c2-a23c-238f2a3df928", PartitionFlag::Lvm),
    ("a19d880f-05fc-4d3b-a006-743f0f84911e", PartitionFlag::Raid),
    ("e3c9e316-0b5c-4db8-817d-f92df00215ae", PartitionFlag::MsftRes),
    ("ebd0a0a2-b9e5-4433-87c0-68b6b72699c7", PartitionFlag::MsftData),
    ("de94bba4-06d1-4d40-a16a-bfd50179d6ac", PartitionFlag::Diag),
];

/// Look up the flag implied by a GPT partition type GUID, if any.
pub fn flag_for_gpt_type_guid(guid: &str) -> Option<PartitionFlag> {
    let needle = guid.trim().to_lowercase();
    GPT_TYPE_GUID_FLAGS
        .iter()
        .find(|(g, _)| *g == needle)
        .map(|(_, flag)| *flag)
}

/// A single partition, owned by its parent `Disk`.
///
/// There is no back-pointer to the parent disk: code that needs it looks
/// the partition up through `DiskInventory` (arena + index, per
/// spec.md §9).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    pub device_path: String,
    pub number: u32,
    pub partition_type_uuid: Option<String>,

    pub start_sector: u64,
    pub end_sector: u64,
    pub size_bytes: u64,

    pub filesystem: FileSystem,
    pub label: Option<String>,
    pub uuid: Option<String>,
    pub flags: PartitionFlags,
    pub used_space_bytes: Option<u64>,
    pub free_space_bytes: Option<u64>,

    pub mountpoint: Option<String>,
}

impl Partition {
    /// `size_sectors = end - start + 1`. Callers must uphold
    /// `end_sector >= start_sector` when constructing a `Partition`.
    pub fn size_sectors(&self) -> u64 {
        self.end_sector - self.start_sector + 1
    }

    pub fn is_mounted(&self) -> bool {
        self.mountpoint.is_some()
    }

    pub fn is_boot(&self) -> bool {
        self.flags.contains(PartitionFlag::Boot) || self.flags.contains(PartitionFlag::Esp)
    }

    pub fn is_system(&self) -> bool {
        self.flags.contains(PartitionFlag::System)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_sectors_is_inclusive() {
        let p = sample_partition(100, 199);
        assert_eq!(p.size_sectors(), 100);
    }

    #[test]
    fn boot_flag_follows_boot_or_esp() {
        let mut p = sample_partition(0, 0);
        assert!(!p.is_boot());
        p.flags.insert(PartitionFlag::Esp);
        assert!(p.is_boot());
    }

    #[test]
    fn known_esp_guid_maps_to_esp_flag() {
        assert_eq!(
            flag_for_gpt_type_guid("C12A7328-F81F-11D2-BA4B-00A0C93EC93B"),
            Some(PartitionFlag::Esp)
        );
    }

    #[test]
    fn unknown_guid_maps_to_nothing() {
        assert_eq!(flag_for_gpt_type_guid("00000000-0000-0000-0000-000000000000"), None);
    }

    #[test]
    fn partition_style_parses_numeric_and_named_forms() {
        assert_eq!(PartitionStyle::parse("gpt"), PartitionStyle::Gpt);
        assert_eq!(PartitionStyle::parse("2"), PartitionStyle::Gpt);
        assert_eq!(PartitionStyle::parse("dos"), PartitionStyle::Mbr);
        assert_eq!(PartitionStyle::parse("msdos"), PartitionStyle::Mbr);
        assert_eq!(PartitionStyle::parse("1"), PartitionStyle::Mbr);
        assert_eq!(PartitionStyle::parse("loop"), PartitionStyle::Raw);
        assert_eq!(PartitionStyle::parse("zfs"), PartitionStyle::Unknown);
    }

    fn sample_partition(start: u64, end: u64) -> Partition {
        Partition {
            device_path: "/dev/sda1".into(),
            number: 1,
            partition_type_uuid: None,
            start_sector: start,
            end_sector: end,
            size_bytes: (end - start + 1) * 512,
            filesystem: FileSystem::Ext4,
            label: None,
            uuid: None,
            flags: PartitionFlags::empty(),
            used_space_bytes: None,
            free_space_bytes: None,
            mountpoint: None,
        }
    }
}
