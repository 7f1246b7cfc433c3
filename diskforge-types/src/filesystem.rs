use serde::{Deserialize, Serialize};
use std::fmt;

/// Known filesystem kinds the core understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileSystem {
    Ntfs,
    Fat32,
    Fat16,
    Exfat,
    Ext2,
    Ext3,
    Ext4,
    Xfs,
    Btrfs,
    Zfs,
    Swap,
    Apfs,
    HfsPlus,
    ReFs,
    Raw,
    Unknown,
}

impl FileSystem {
    /// Case-insensitive parse, including vendor-tool aliases.
    ///
    /// `linux_raid_member`, `lvm2_member`, and `crypto_luks` report as RAW:
    /// the core treats them as opaque container formats, not filesystems.
    pub fn parse(value: &str) -> Self {
        let normalized = value.trim().to_lowercase();
        match normalized.as_str() {
            "ntfs" => Self::Ntfs,
            "vfat" | "fat32" | "fat" => Self::Fat32,
            "fat16" => Self::Fat16,
            "exfat" => Self::Exfat,
            "ext2" => Self::Ext2,
            "ext3" => Self::Ext3,
            "ext4" => Self::Ext4,
            "xfs" => Self::Xfs,
            "btrfs" => Self::Btrfs,
            "zfs" | "zfs_member" => Self::Zfs,
            "swap" | "linux-swap" | "linux_swap" => Self::Swap,
            "apfs" => Self::Apfs,
            "hfsplus" | "hfs+" => Self::HfsPlus,
            "refs" => Self::ReFs,
            "raw" | "linux_raid_member" | "lvm2_member" | "crypto_luks" => Self::Raw,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for FileSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ntfs => "NTFS",
            Self::Fat32 => "FAT32",
            Self::Fat16 => "FAT16",
            Self::Exfat => "exFAT",
            Self::Ext2 => "ext2",
            Self::Ext3 => "ext3",
            Self::Ext4 => "ext4",
            Self::Xfs => "XFS",
            Self::Btrfs => "Btrfs",
            Self::Zfs => "ZFS",
            Self::Swap => "swap",
            Self::Apfs => "APFS",
            Self::HfsPlus => "HFS+",
            Self::ReFs => "ReFS",
            Self::Raw => "raw",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(FileSystem::parse("ExT4"), FileSystem::Ext4);
        assert_eq!(FileSystem::parse("  ntfs  "), FileSystem::Ntfs);
    }

    #[test]
    fn resolves_known_aliases() {
        assert_eq!(FileSystem::parse("vfat"), FileSystem::Fat32);
        assert_eq!(FileSystem::parse("linux_raid_member"), FileSystem::Raw);
        assert_eq!(FileSystem::parse("lvm2_member"), FileSystem::Raw);
        assert_eq!(FileSystem::parse("crypto_luks"), FileSystem::Raw);
    }

    #[test]
    fn unrecognized_values_are_unknown() {
        assert_eq!(FileSystem::parse("qcow2"), FileSystem::Unknown);
    }
}
