//! Byte-size formatting and parsing helpers shared across the workspace.

use num_format::{Locale, ToFormattedString};

const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Convert bytes to a human-readable string, e.g. "1.50 GB".
pub fn format_bytes(bytes: u64, with_raw: bool) -> String {
    let mut val = bytes as f64;
    let mut steps = 0;

    while val > 1024.0 && steps < UNITS.len() - 1 {
        val /= 1024.0;
        steps += 1;
    }

    let unit = UNITS[steps];
    if with_raw {
        format!("{:.2} {} ({} bytes)", val, unit, bytes.to_formatted_string(&Locale::en))
    } else {
        format!("{:.2} {}", val, unit)
    }
}

/// Parse a human-readable size string back into bytes. Accepts both the
/// spaced, two-letter form `format_bytes` produces ("1.50 GB") and the
/// compact single-letter forms vendor tools emit ("500G", "1.5GB").
///
/// Returns `None` for strings with an unrecognized unit or malformed number;
/// callers in the parser layer turn that into a non-fatal Inventory error.
pub fn parse_bytes(pretty: &str) -> Option<u64> {
    let trimmed = pretty.trim();
    let split_at = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let (number_str, unit) = trimmed.split_at(split_at);
    let unit = unit.trim();
    if number_str.is_empty() || unit.is_empty() {
        return None;
    }

    let mut val: f64 = number_str.parse().ok()?;
    if val < 0.0 {
        return None;
    }

    let unit_upper = unit.to_uppercase();
    let steps = UNITS.iter().position(|u| *u == unit_upper).or_else(|| {
        let first = unit_upper.chars().next()?;
        UNITS.iter().position(|u| u.starts_with(first))
    })?;

    for _ in 0..steps {
        val *= 1024.0;
    }

    Some(val.round() as u64)
}
