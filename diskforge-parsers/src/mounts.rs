use std::collections::HashMap;
use std::fs;

/// Filesystem usage figures in bytes, as reported by `df`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DfUsage {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub available_bytes: u64,
}

/// Parse `findmnt --json` output into a `device -> mountpoint` map.
/// Recurses into the nested `children` arrays findmnt reports for bind
/// mounts and submounts. Malformed JSON yields an empty map rather than
/// an error: mount discovery is advisory, not load-bearing.
pub fn parse_findmnt_json(output: &str) -> HashMap<String, String> {
    let mut result = HashMap::new();

    let Ok(parsed) = serde_json::from_str::<serde_json::Value>(output) else {
        return result;
    };

    fn walk(fs: &serde_json::Value, out: &mut HashMap<String, String>) {
        if let (Some(source), Some(target)) = (
            fs.get("source").and_then(|v| v.as_str()),
            fs.get("target").and_then(|v| v.as_str()),
        ) {
            if source.starts_with("/dev/") {
                out.insert(source.to_string(), target.to_string());
            }
        }
        if let Some(children) = fs.get("children").and_then(|v| v.as_array()) {
            for child in children {
                walk(child, out);
            }
        }
    }

    if let Some(filesystems) = parsed.get("filesystems").and_then(|v| v.as_array()) {
        for fs in filesystems {
            walk(fs, &mut result);
        }
    }

    result
}

/// Parse `/proc/mounts`, used as the fallback mount source when `findmnt`
/// is unavailable.
pub fn parse_proc_mounts_text(text: &str) -> HashMap<String, String> {
    let mut result = HashMap::new();
    for line in text.lines() {
        let mut parts = line.split_whitespace();
        let (Some(device), Some(target)) = (parts.next(), parts.next()) else {
            continue;
        };
        if device.starts_with("/dev/") {
            result.insert(device.to_string(), target.to_string());
        }
    }
    result
}

/// Read and parse `/proc/mounts` from the live system. Missing or
/// unreadable files yield an empty map.
pub fn parse_proc_mounts() -> HashMap<String, String> {
    match fs::read_to_string("/proc/mounts") {
        Ok(text) => parse_proc_mounts_text(&text),
        Err(_) => HashMap::new(),
    }
}

/// Parse `df`'s default (1K-block) tabular output into per-device usage.
pub fn parse_df_output(output: &str) -> HashMap<String, DfUsage> {
    let mut result = HashMap::new();
    let mut lines = output.trim().lines();
    lines.next(); // header

    for line in lines {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 6 || !parts[0].starts_with("/dev/") {
            continue;
        }
        let (Ok(total_kb), Ok(used_kb), Ok(avail_kb)) = (
            parts[1].parse::<u64>(),
            parts[2].parse::<u64>(),
            parts[3].parse::<u64>(),
        ) else {
            continue;
        };
        result.insert(
            parts[0].to_string(),
            DfUsage {
                total_bytes: total_kb * 1024,
                used_bytes: used_kb * 1024,
                available_bytes: avail_kb * 1024,
            },
        );
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn findmnt_recurses_into_children() {
        let output = serde_json::json!({
            "filesystems": [{
                "source": "/dev/sda1",
                "target": "/",
                "children": [{
                    "source": "/dev/sda2",
                    "target": "/boot"
                }]
            }]
        })
        .to_string();

        let mounts = parse_findmnt_json(&output);
        assert_eq!(mounts.get("/dev/sda1").map(String::as_str), Some("/"));
        assert_eq!(mounts.get("/dev/sda2").map(String::as_str), Some("/boot"));
    }

    #[test]
    fn findmnt_malformed_json_yields_empty_map() {
        assert!(parse_findmnt_json("not json").is_empty());
    }

    #[test]
    fn proc_mounts_skips_non_device_lines() {
        let text = "tmpfs /tmp tmpfs rw 0 0\n/dev/sda1 / ext4 rw 0 0\n";
        let mounts = parse_proc_mounts_text(text);
        assert_eq!(mounts.len(), 1);
        assert_eq!(mounts.get("/dev/sda1").map(String::as_str), Some("/"));
    }

    #[test]
    fn df_output_converts_1k_blocks_to_bytes() {
        let output = "Filesystem 1K-blocks Used Available Use% Mounted\n/dev/sda1 1000000 400000 600000 40% /\n";
        let usage = parse_df_output(output);
        let entry = usage.get("/dev/sda1").expect("entry present");
        assert_eq!(entry.total_bytes, 1_000_000 * 1024);
        assert_eq!(entry.used_bytes, 400_000 * 1024);
        assert_eq!(entry.available_bytes, 600_000 * 1024);
    }
}
