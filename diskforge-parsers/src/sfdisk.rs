use std::collections::HashMap;

/// A single entry from an `sfdisk --dump` partition list.
#[derive(Debug, Clone, PartialEq)]
pub struct SfdiskPartitionEntry {
    pub device: String,
    pub attrs: HashMap<String, String>,
}

/// Parsed form of an `sfdisk --dump` report.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SfdiskDump {
    pub label: Option<String>,
    pub label_id: Option<String>,
    pub device: Option<String>,
    pub unit: String,
    pub partitions: Vec<SfdiskPartitionEntry>,
}

/// Parse `sfdisk --dump` text output: a small header (`label:`,
/// `label-id:`, `device:`, `unit:`) followed by `/dev/...: key=value, ...`
/// partition lines.
pub fn parse_sfdisk_dump(output: &str) -> SfdiskDump {
    let mut result = SfdiskDump {
        unit: "sectors".to_string(),
        ..Default::default()
    };

    for raw_line in output.trim().lines() {
        let line = raw_line.trim();

        if let Some(value) = line.strip_prefix("label:") {
            result.label = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("label-id:") {
            result.label_id = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("device:") {
            result.device = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("unit:") {
            result.unit = value.trim().to_string();
        } else if line.starts_with("/dev/") {
            let Some((device, attrs_str)) = line.split_once(':') else {
                continue;
            };
            let mut attrs = HashMap::new();
            for attr in attrs_str.trim().split(',') {
                let attr = attr.trim();
                if let Some((key, value)) = attr.split_once('=') {
                    attrs.insert(key.trim().to_string(), value.trim().to_string());
                }
            }
            result.partitions.push(SfdiskPartitionEntry {
                device: device.trim().to_string(),
                attrs,
            });
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_and_partitions() {
        let output = "\
label: gpt
label-id: 12345678-1234-1234-1234-123456789abc
device: /dev/sda
unit: sectors

/dev/sda1 : start=2048, size=1048576, type=esp
/dev/sda2 : start=1050624, size=2097152, type=linux
";
        let dump = parse_sfdisk_dump(output);
        assert_eq!(dump.label.as_deref(), Some("gpt"));
        assert_eq!(dump.device.as_deref(), Some("/dev/sda"));
        assert_eq!(dump.partitions.len(), 2);
        assert_eq!(dump.partitions[0].device, "/dev/sda1");
        assert_eq!(dump.partitions[0].attrs.get("type").map(String::as_str), Some("esp"));
    }

    #[test]
    fn defaults_unit_to_sectors() {
        let dump = parse_sfdisk_dump("label: dos\n");
        assert_eq!(dump.unit, "sectors");
    }
}
