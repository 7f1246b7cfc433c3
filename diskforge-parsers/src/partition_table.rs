use diskforge_types::{flag_for_gpt_type_guid, PartitionFlag, PartitionStyle};

/// Parse a partition table type string (`lsblk`'s `pttype`, or `sfdisk`'s
/// `label:`) into a `PartitionStyle`. A missing value is `Unknown`, not an
/// error: not every block device sits inside a partition table.
pub fn parse_partition_style(pttype: Option<&str>) -> PartitionStyle {
    match pttype {
        Some(value) => PartitionStyle::parse(value),
        None => PartitionStyle::Unknown,
    }
}

/// Derive the flag(s) implied by a partition's GPT type GUID. `pttype` is
/// accepted for symmetry with the original tool output shape but only the
/// partition's own type GUID (`parttype`) carries flag information; MBR
/// tables have no equivalent lookup table here.
pub fn parse_partition_flags(_pttype: Option<&str>, parttype: Option<&str>) -> Vec<PartitionFlag> {
    parttype
        .and_then(flag_for_gpt_type_guid)
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_pttype_is_unknown() {
        assert_eq!(parse_partition_style(None), PartitionStyle::Unknown);
    }

    #[test]
    fn known_guid_yields_single_flag() {
        let flags = parse_partition_flags(Some("gpt"), Some("c12a7328-f81f-11d2-ba4b-00a0c93ec93b"));
        assert_eq!(flags, vec![PartitionFlag::Esp]);
    }

    #[test]
    fn missing_parttype_yields_no_flags() {
        assert!(parse_partition_flags(Some("gpt"), None).is_empty());
    }
}
