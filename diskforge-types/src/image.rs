use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Compression applied to an image's payload bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    Gzip,
    Lz4,
    Zstd,
    None,
}

impl Compression {
    /// File suffix an image path gains when written with this compression.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Gzip => ".gz",
            Self::Lz4 => ".lz4",
            Self::Zstd => ".zst",
            Self::None => "",
        }
    }

    /// Infer compression from an image path's suffix, used when a sidecar
    /// is missing (spec.md §6: "compression from path suffix").
    pub fn infer_from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("gz") => Self::Gzip,
            Some("lz4") => Self::Lz4,
            Some("zst") => Self::Zstd,
            _ => Self::None,
        }
    }
}

/// Sidecar metadata describing a backup image artifact, serialized next to
/// the image as `<image>.meta.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageInfo {
    pub path: String,
    pub source_device: Option<String>,
    pub source_size_bytes: u64,
    pub image_size_bytes: u64,
    pub compression: Option<Compression>,
    pub created_at: DateTime<Utc>,
    pub checksum: Option<String>,
    pub checksum_algorithm: String,
    pub format_version: String,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl ImageInfo {
    pub fn new(path: impl Into<String>, source_device: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source_device: Some(source_device.into()),
            source_size_bytes: 0,
            image_size_bytes: 0,
            compression: None,
            created_at: Utc::now(),
            checksum: None,
            checksum_algorithm: "sha256".into(),
            format_version: "1".into(),
            metadata: HashMap::new(),
        }
    }

    /// Best-effort reconstruction when the `.meta.json` sidecar is
    /// missing: compression is inferred from the path suffix, size comes
    /// from the file itself, source and checksum are unknown. Per
    /// spec.md §6, a missing sidecar is recoverable, not fatal.
    pub fn from_path_best_effort(path: &Path, image_size_bytes: u64) -> Self {
        Self {
            path: path.to_string_lossy().into_owned(),
            source_device: None,
            source_size_bytes: 0,
            image_size_bytes,
            compression: Some(Compression::infer_from_path(path)),
            created_at: Utc::now(),
            checksum: None,
            checksum_algorithm: "sha256".into(),
            format_version: "1".into(),
            metadata: HashMap::new(),
        }
    }

    pub fn sidecar_path(image_path: &Path) -> std::path::PathBuf {
        let mut s = image_path.as_os_str().to_os_string();
        s.push(".meta.json");
        std::path::PathBuf::from(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_round_trip_preserves_all_fields() {
        let mut info = ImageInfo::new("/tmp/sda.img.zst", "/dev/sda");
        info.source_size_bytes = 4096;
        info.image_size_bytes = 2048;
        info.compression = Some(Compression::Zstd);
        info.checksum = Some("deadbeef".into());
        info.metadata.insert("note".into(), serde_json::json!("test"));

        let json = serde_json::to_string(&info).unwrap();
        let back: ImageInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(info, back);
    }

    #[test]
    fn tolerates_unknown_keys_and_missing_optionals() {
        let json = serde_json::json!({
            "path": "/tmp/a.img",
            "source_device": null,
            "source_size_bytes": 0,
            "image_size_bytes": 0,
            "compression": null,
            "created_at": "2024-01-01T00:00:00Z",
            "checksum": null,
            "checksum_algorithm": "sha256",
            "format_version": "1",
            "metadata": {},
            "totally_unknown_future_field": 42,
        });
        let info: ImageInfo = serde_json::from_value(json).unwrap();
        assert_eq!(info.path, "/tmp/a.img");
    }

    #[test]
    fn infers_compression_from_suffix() {
        assert_eq!(
            Compression::infer_from_path(std::path::Path::new("disk.img.gz")),
            Compression::Gzip
        );
        assert_eq!(
            Compression::infer_from_path(std::path::Path::new("disk.img.zst")),
            Compression::Zstd
        );
        assert_eq!(
            Compression::infer_from_path(std::path::Path::new("disk.img")),
            Compression::None
        );
    }

    #[test]
    fn zero_byte_image_is_representable() {
        let info = ImageInfo::new("/tmp/empty.img", "/dev/sdz");
        assert_eq!(info.source_size_bytes, 0);
    }
}
