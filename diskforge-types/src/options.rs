//! Operation option records consumed by `PlatformBackend` methods.
//!
//! Each record names its target(s), desired-state fields, and the common
//! flags (`dry_run`, `verify`, `align_to_mb`) spec.md §3 calls for.

use serde::{Deserialize, Serialize};

use crate::filesystem::FileSystem;
use crate::image::Compression;
use crate::partition::PartitionStyle;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionCreateOptions {
    pub disk_path: String,
    pub size_bytes: u64,
    pub offset_bytes: Option<u64>,
    pub filesystem: FileSystem,
    pub label: Option<String>,
    pub partition_type_uuid: Option<String>,
    pub align_to_mb: u64,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatOptions {
    pub partition_path: String,
    pub filesystem: FileSystem,
    pub label: Option<String>,
    pub quick: bool,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResizeMoveOptions {
    pub partition_path: String,
    pub new_size_bytes: u64,
    pub new_start_sector: Option<u64>,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WipeOptions {
    pub device_path: String,
    /// Overwrite with zeros (vs. just destroying metadata/signatures).
    pub secure: bool,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloneOptions {
    pub source_path: String,
    pub target_path: String,
    pub verify: bool,
    pub block_size_bytes: Option<u64>,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageOptions {
    pub source_path: String,
    pub image_path: String,
    pub compression: Compression,
    pub verify: bool,
    pub block_size_bytes: Option<u64>,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestoreOptions {
    pub image_path: String,
    pub target_path: String,
    pub verify: bool,
    pub block_size_bytes: Option<u64>,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionRecoveryOptions {
    pub disk_path: String,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertDiskOptions {
    pub disk_path: String,
    pub target_style: PartitionStyle,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationOptions {
    pub source_disk_path: String,
    pub target_disk_path: String,
    pub dry_run: bool,
}
