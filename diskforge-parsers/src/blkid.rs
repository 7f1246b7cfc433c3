use std::collections::HashMap;

/// Per-device attribute map as produced by [`parse_blkid_output`], keyed
/// by device path then upper-cased attribute name.
pub type BlkidMap = HashMap<String, HashMap<String, String>>;

/// Parse `blkid` line-oriented output into a per-device attribute map.
///
/// Each line looks like `/dev/sda1: UUID="xxxx" TYPE="ext4" PARTUUID="xxxx"`.
/// Attribute keys are upper-cased; malformed or empty lines are skipped.
pub fn parse_blkid_output(output: &str) -> BlkidMap {
    let mut result = HashMap::new();

    for line in output.trim().lines() {
        let Some((device, rest)) = line.split_once(':') else {
            continue;
        };
        let device = device.trim().to_string();
        if device.is_empty() {
            continue;
        }

        let mut attrs = HashMap::new();
        let mut remainder = rest;
        while let Some(eq) = remainder.find('=') {
            let key = remainder[..eq].trim();
            remainder = &remainder[eq + 1..];
            let Some(open) = remainder.find('"') else {
                break;
            };
            let after_open = &remainder[open + 1..];
            let Some(close) = after_open.find('"') else {
                break;
            };
            let value = &after_open[..close];
            if !key.is_empty() {
                attrs.insert(key.to_uppercase(), value.to_string());
            }
            remainder = &after_open[close + 1..];
        }

        result.insert(device, attrs);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_device_attributes() {
        let output = r#"/dev/sda1: UUID="1234-5678" TYPE="ext4" PARTUUID="abcd""#;
        let parsed = parse_blkid_output(output);
        let attrs = parsed.get("/dev/sda1").expect("device present");
        assert_eq!(attrs.get("UUID").map(String::as_str), Some("1234-5678"));
        assert_eq!(attrs.get("TYPE").map(String::as_str), Some("ext4"));
        assert_eq!(attrs.get("PARTUUID").map(String::as_str), Some("abcd"));
    }

    #[test]
    fn parses_multiple_lines() {
        let output = "/dev/sda1: UUID=\"a\" TYPE=\"ext4\"\n/dev/sda2: TYPE=\"swap\"\n";
        let parsed = parse_blkid_output(output);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed["/dev/sda2"].get("TYPE").map(String::as_str), Some("swap"));
    }

    #[test]
    fn ignores_blank_and_malformed_lines() {
        let output = "\n   \n/dev/sda1 UUID=\"a\"\n";
        let parsed = parse_blkid_output(output);
        assert!(parsed.is_empty());
    }
}
