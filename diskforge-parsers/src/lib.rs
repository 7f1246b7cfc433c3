//! Normalization layer turning raw platform-tool output (`lsblk`, `blkid`,
//! `sfdisk`, `findmnt`, `df`, `/proc/mounts`) into the canonical
//! `diskforge-types` model. Parsing never panics and never propagates a
//! hard error for malformed tool output: a `PlatformBackend` is expected
//! to keep functioning with partial information, recording gaps in
//! `DiskInventory::parse_errors` rather than failing outright.

pub mod blkid;
pub mod disk_type;
pub mod inventory;
pub mod lsblk;
pub mod mounts;
pub mod partition_table;
pub mod sfdisk;

pub use blkid::{parse_blkid_output, BlkidMap};
pub use disk_type::parse_disk_type;
pub use inventory::parse_inventory;
pub use lsblk::{build_disk_from_lsblk, build_partition_from_lsblk, parse_lsblk_json};
pub use mounts::{parse_df_output, parse_findmnt_json, parse_proc_mounts, parse_proc_mounts_text, DfUsage};
pub use partition_table::{parse_partition_flags, parse_partition_style};
pub use sfdisk::{parse_sfdisk_dump, SfdiskDump, SfdiskPartitionEntry};
