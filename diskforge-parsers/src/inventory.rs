use std::collections::HashMap;
use std::collections::HashSet;

use diskforge_types::DiskInventory;

use crate::blkid::parse_blkid_output;
use crate::lsblk::{build_disk_from_lsblk, parse_lsblk_json};

/// Assemble a `DiskInventory` from one `lsblk --json` snapshot plus the
/// auxiliary tool output needed to enrich it, per spec.md §4.2: "Parsers
/// return `(Inventory, non-fatal errors)`; they never fail hard." The
/// non-fatal errors are returned inline, in `DiskInventory::parse_errors`,
/// rather than as a separate tuple member, since that is where every
/// consumer (session report, CLI) already expects to find them.
///
/// `lsblk_json`/`blkid_output` are the raw tool output text; `mounts` and
/// `system_devices` are the already-resolved device maps (see
/// `parse_findmnt_json`/`parse_proc_mounts` and the backend's own
/// system-disk detection).
pub fn parse_inventory(
    lsblk_json: &str,
    blkid_output: &str,
    mounts: &HashMap<String, String>,
    system_devices: &HashSet<String>,
) -> DiskInventory {
    let mut inventory = DiskInventory::new("linux");
    let mut errors = Vec::new();

    let blkid_info = parse_blkid_output(blkid_output);
    let blocks = parse_lsblk_json(lsblk_json);

    if blocks.is_empty() && !lsblk_json.trim().is_empty() {
        errors.push("lsblk output did not parse as JSON or had no blockdevices".to_string());
    }

    inventory.disks = blocks
        .iter()
        .map(|block| build_disk_from_lsblk(block, &blkid_info, mounts, system_devices, &mut errors))
        .collect();

    inventory.parse_errors = errors;
    inventory
}
