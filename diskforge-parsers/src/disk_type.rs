use diskforge_types::DiskType;

/// Classify a disk from its reported transport, rotation flag, and device
/// path. Transport takes priority over rotation; path-based heuristics
/// (`/dev/loop*`, `/dev/md*`, device-mapper) only apply once transport is
/// absent or uninformative.
pub fn parse_disk_type(transport: Option<&str>, rotational: Option<&str>, path: &str) -> DiskType {
    if let Some(tran) = transport {
        let tran_lower = tran.to_lowercase();
        if tran_lower.contains("nvme") || path.starts_with("/dev/nvme") {
            return DiskType::Nvme;
        }
        if tran_lower.contains("usb") {
            return DiskType::Usb;
        }
        if tran_lower.contains("sata") || tran_lower.contains("ata") {
            return if rotational == Some("0") {
                DiskType::Ssd
            } else {
                DiskType::Hdd
            };
        }
    }

    if path.starts_with("/dev/loop") {
        return DiskType::Loop;
    }
    if path.starts_with("/dev/md") {
        return DiskType::Raid;
    }
    if path.starts_with("/dev/dm-") || path.starts_with("/dev/mapper/") {
        return DiskType::Virtual;
    }

    match rotational {
        Some("0") => DiskType::Ssd,
        Some("1") => DiskType::Hdd,
        _ => DiskType::Unknown,
    }
}
