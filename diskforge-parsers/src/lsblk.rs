use std::collections::HashMap;

use diskforge_types::units::parse_bytes;
use diskforge_types::{Disk, DiskType, FileSystem, Partition, PartitionFlags, PartitionStyle};
use serde_json::Value;

use crate::blkid::BlkidMap;
use crate::disk_type::parse_disk_type;
use crate::partition_table::{parse_partition_flags, parse_partition_style};

/// Parse `lsblk --json` output into its top-level `blockdevices` array.
/// Malformed JSON yields an empty list; callers treat that as "nothing
/// discovered", never as an error, matching the tolerance the rest of the
/// inventory pipeline has for partial backend output.
pub fn parse_lsblk_json(output: &str) -> Vec<Value> {
    serde_json::from_str::<Value>(output)
        .ok()
        .and_then(|v| v.get("blockdevices").cloned())
        .and_then(|v| v.as_array().cloned())
        .unwrap_or_default()
}

fn as_device_path(block: &Value) -> String {
    let raw = block
        .get("path")
        .and_then(Value::as_str)
        .or_else(|| block.get("name").and_then(Value::as_str))
        .unwrap_or("");
    if raw.starts_with("/dev/") {
        raw.to_string()
    } else {
        format!("/dev/{raw}")
    }
}

/// lsblk emits sizes as either a bare integer or a numeric string
/// depending on version/flags; accept either, defaulting to 0.
fn as_u64_loose(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Size-field variant of [`as_u64_loose`] that also handles the `"N
/// units"` form (`"500G"`, `"1.5 GB"`) some lsblk versions/vendor tools
/// emit, per spec.md §4.2. A string that is neither a bare integer nor a
/// recognized unit string parses to 0 and records a non-fatal error
/// against `device_path`/`field` instead of silently collapsing to 0.
fn as_u64_sized(value: Option<&Value>, device_path: &str, field: &str, errors: &mut Vec<String>) -> u64 {
    match value {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if let Ok(n) = trimmed.parse::<u64>() {
                n
            } else if let Some(n) = parse_bytes(trimmed) {
                n
            } else {
                errors.push(format!(
                    "{device_path}: unrecognized size unit in {field} value {trimmed:?}"
                ));
                0
            }
        }
        _ => 0,
    }
}

fn as_bool_loose(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s == "1",
        Some(Value::Number(n)) => n.as_u64() == Some(1),
        _ => false,
    }
}

fn as_str_trimmed(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

/// Build a `Disk` from one `lsblk` top-level block device entry, enriching
/// it with `blkid` attributes and the current mount map, and recursing
/// into `children` for partitions. Unrecognized size-unit strings push a
/// non-fatal message onto `errors` rather than failing the parse.
pub fn build_disk_from_lsblk(
    block: &Value,
    blkid_info: &BlkidMap,
    mounts: &HashMap<String, String>,
    system_devices: &std::collections::HashSet<String>,
    errors: &mut Vec<String>,
) -> Disk {
    let device_path = as_device_path(block);

    let transport = block.get("tran").and_then(Value::as_str);
    let rota = block.get("rota").and_then(|v| match v {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(if *b { "1".into() } else { "0".into() }),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    });
    let disk_type = parse_disk_type(transport, rota.as_deref(), &device_path);

    let size_bytes = as_u64_sized(block.get("size"), &device_path, "size", errors);
    let sector_size = block
        .get("phy-sec")
        .or_else(|| block.get("log-sec"))
        .map(as_u64_loose_value)
        .filter(|&v| v > 0)
        .unwrap_or(512);

    let partitions = block
        .get("children")
        .and_then(Value::as_array)
        .map(|children| {
            children
                .iter()
                .filter_map(|child| build_partition_from_lsblk(child, blkid_info, mounts, errors))
                .collect()
        })
        .unwrap_or_default();

    Disk {
        device_path: device_path.clone(),
        model: as_str_trimmed(block.get("model")).unwrap_or_else(|| "Unknown".to_string()),
        serial: as_str_trimmed(block.get("serial")),
        vendor: as_str_trimmed(block.get("vendor")),
        firmware_version: None,
        wwn: as_str_trimmed(block.get("wwn")),
        interface: transport.map(str::to_string),
        size_bytes,
        sector_size,
        disk_type,
        partition_style: parse_partition_style(block.get("pttype").and_then(Value::as_str)),
        is_removable: as_bool_loose(block.get("rm")),
        is_read_only: as_bool_loose(block.get("ro")),
        is_system_disk: system_devices.contains(&device_path),
        partitions,
        smart_info: None,
    }
}

fn as_u64_loose_value(value: &Value) -> u64 {
    as_u64_loose(Some(value))
}

/// Build a `Partition` from one `lsblk` child entry. Returns `None` for
/// child entries that aren't partitions (e.g. dm/crypt children lsblk
/// sometimes nests under a disk). Unrecognized size-unit strings push a
/// non-fatal message onto `errors` rather than failing the parse.
pub fn build_partition_from_lsblk(
    block: &Value,
    blkid_info: &BlkidMap,
    mounts: &HashMap<String, String>,
    errors: &mut Vec<String>,
) -> Option<Partition> {
    let block_type = block.get("type").and_then(Value::as_str).unwrap_or("");
    if !matches!(block_type, "part" | "partition" | "") {
        return None;
    }

    let device_path = as_device_path(block);
    let blkid_attrs = blkid_info.get(&device_path);

    let fstype = block
        .get("fstype")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| blkid_attrs.and_then(|a| a.get("TYPE").cloned()));
    let filesystem = fstype
        .as_deref()
        .map(FileSystem::parse)
        .unwrap_or(FileSystem::Unknown);

    let size_bytes = as_u64_sized(block.get("size"), &device_path, "size", errors);

    let part_num = device_path
        .rfind(|c: char| !c.is_ascii_digit())
        .map(|idx| device_path[idx + 1..].parse().unwrap_or(0))
        .unwrap_or(0);

    let mountpoint = mounts
        .get(&device_path)
        .cloned()
        .or_else(|| as_str_trimmed(block.get("mountpoint")));

    let used_bytes = block.get("fsused").map(as_u64_loose_value);
    let free_bytes = block
        .get("fssize")
        .map(as_u64_loose_value)
        .zip(used_bytes)
        .map(|(total, used)| total.saturating_sub(used));

    let partition_type_uuid = block
        .get("parttype")
        .and_then(Value::as_str)
        .map(str::to_string);

    let flags: PartitionFlags = parse_partition_flags(
        block.get("pttype").and_then(Value::as_str),
        partition_type_uuid.as_deref(),
    )
    .into_iter()
    .collect();

    Some(Partition {
        device_path,
        number: part_num,
        partition_type_uuid,
        start_sector: 0,
        end_sector: 0,
        size_bytes,
        filesystem,
        label: block
            .get("label")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| blkid_attrs.and_then(|a| a.get("LABEL").cloned())),
        uuid: block
            .get("uuid")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| blkid_attrs.and_then(|a| a.get("UUID").cloned())),
        flags,
        used_space_bytes: used_bytes,
        free_space_bytes: free_bytes,
        mountpoint,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn blkid_map() -> BlkidMap {
        HashMap::new()
    }

    #[test]
    fn builds_disk_with_partitions_from_children() {
        let block: Value = serde_json::from_str(
            r#"{
                "name": "sda",
                "path": "/dev/sda",
                "size": "1000000000",
                "model": " Samsung SSD ",
                "tran": "sata",
                "rota": "0",
                "pttype": "gpt",
                "rm": false,
                "ro": false,
                "children": [{
                    "name": "sda1",
                    "path": "/dev/sda1",
                    "type": "part",
                    "size": 500000000,
                    "fstype": "ext4",
                    "label": "root",
                    "mountpoint": "/"
                }]
            }"#,
        )
        .unwrap();

        let mut errors = Vec::new();
        let disk = build_disk_from_lsblk(&block, &blkid_map(), &HashMap::new(), &HashSet::new(), &mut errors);
        assert!(errors.is_empty());
        assert_eq!(disk.device_path, "/dev/sda");
        assert_eq!(disk.model, "Samsung SSD");
        assert_eq!(disk.disk_type, DiskType::Ssd);
        assert_eq!(disk.partition_style, PartitionStyle::Gpt);
        assert_eq!(disk.partitions.len(), 1);
        assert_eq!(disk.partitions[0].number, 1);
        assert_eq!(disk.partitions[0].filesystem, FileSystem::Ext4);
        assert_eq!(disk.partitions[0].mountpoint.as_deref(), Some("/"));
    }

    #[test]
    fn partition_number_extracted_from_trailing_digits() {
        let block: Value = serde_json::from_str(
            r#"{"name": "nvme0n1p12", "path": "/dev/nvme0n1p12", "type": "part", "size": 1024}"#,
        )
        .unwrap();
        let mut errors = Vec::new();
        let part = build_partition_from_lsblk(&block, &blkid_map(), &HashMap::new(), &mut errors).unwrap();
        assert_eq!(part.number, 12);
    }

    #[test]
    fn non_partition_children_are_skipped() {
        let block: Value =
            serde_json::from_str(r#"{"name": "dm-0", "type": "crypt", "size": 1024}"#).unwrap();
        let mut errors = Vec::new();
        assert!(build_partition_from_lsblk(&block, &blkid_map(), &HashMap::new(), &mut errors).is_none());
    }

    #[test]
    fn blkid_fills_in_missing_label_and_filesystem() {
        let mut blkid = blkid_map();
        let mut attrs = HashMap::new();
        attrs.insert("TYPE".to_string(), "xfs".to_string());
        attrs.insert("LABEL".to_string(), "data".to_string());
        blkid.insert("/dev/sdb1".to_string(), attrs);

        let block: Value =
            serde_json::from_str(r#"{"name": "sdb1", "type": "part", "size": 2048}"#).unwrap();
        let mut errors = Vec::new();
        let part = build_partition_from_lsblk(&block, &blkid, &HashMap::new(), &mut errors).unwrap();
        assert_eq!(part.filesystem, FileSystem::Xfs);
        assert_eq!(part.label.as_deref(), Some("data"));
    }

    #[test]
    fn unrecognized_size_unit_records_non_fatal_error_and_parses_as_zero() {
        let block: Value = serde_json::from_str(
            r#"{"name": "sdc1", "type": "part", "size": "7 florps"}"#,
        )
        .unwrap();
        let mut errors = Vec::new();
        let part = build_partition_from_lsblk(&block, &blkid_map(), &HashMap::new(), &mut errors).unwrap();
        assert_eq!(part.size_bytes, 0);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("/dev/sdc1"));
    }

    #[test]
    fn human_formatted_size_string_is_parsed_without_error() {
        let block: Value = serde_json::from_str(
            r#"{"name": "sdd1", "type": "part", "size": "500G"}"#,
        )
        .unwrap();
        let mut errors = Vec::new();
        let part = build_partition_from_lsblk(&block, &blkid_map(), &HashMap::new(), &mut errors).unwrap();
        assert_eq!(part.size_bytes, 500 * 1024 * 1024 * 1024);
        assert!(errors.is_empty());
    }
}
