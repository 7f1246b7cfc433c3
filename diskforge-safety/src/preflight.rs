use std::collections::HashMap;

use crate::types::{PreflightCheck, PreflightReport, Severity};

/// Arbitrary key/value context a preflight check reads from, mirroring
/// the loosely-typed `dict[str, Any]` the original checks closed over.
pub type PreflightContext = HashMap<String, serde_json::Value>;

type CheckFn = Box<dyn Fn(&PreflightContext) -> PreflightCheck + Send + Sync>;

/// Ordered collection of named preflight checks run together before a
/// destructive operation. Each check is infallible by construction
/// (returns a `PreflightCheck` directly) rather than via the original's
/// try/except-per-check wrapping — a check that cannot gather the data it
/// needs reports `passed: false` itself instead of panicking.
#[derive(Default)]
pub struct PreflightChecker {
    checks: Vec<(String, CheckFn)>,
}

impl PreflightChecker {
    pub fn new() -> Self {
        Self { checks: Vec::new() }
    }

    pub fn add_check(
        &mut self,
        name: impl Into<String>,
        check_fn: impl Fn(&PreflightContext) -> PreflightCheck + Send + Sync + 'static,
    ) {
        self.checks.push((name.into(), Box::new(check_fn)));
    }

    pub fn run_checks(&self, context: &PreflightContext) -> PreflightReport {
        let results = self.checks.iter().map(|(_, check_fn)| check_fn(context)).collect();
        PreflightReport::new(results)
    }
}

/// Battery/AC-power check. Reads `battery_percent` (0-100) and
/// `power_plugged` (bool) from the context; absent keys mean "no battery
/// detected", the desktop/server case, which always passes.
pub fn check_power_status(context: &PreflightContext) -> PreflightCheck {
    let Some(percent) = context.get("battery_percent").and_then(|v| v.as_f64()) else {
        return PreflightCheck::new("Power Status", true, "no battery detected (desktop/server)");
    };

    let plugged = context
        .get("power_plugged")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    if plugged {
        let mut details = HashMap::new();
        details.insert("battery_percent".to_string(), serde_json::json!(percent));
        return PreflightCheck::new("Power Status", true, "system is on AC power").with_details(details);
    }

    let mut details = HashMap::new();
    details.insert("battery_percent".to_string(), serde_json::json!(percent));
    let passed = percent > 50.0;
    PreflightCheck::new(
        "Power Status",
        passed,
        format!("system on battery ({percent:.0}%)"),
    )
    .with_severity(if passed { Severity::Warning } else { Severity::Error })
    .with_details(details)
}

/// Confirms `target_size` (bytes) is at least `source_size` (bytes).
pub fn check_target_size(context: &PreflightContext) -> PreflightCheck {
    let source_size = context.get("source_size").and_then(|v| v.as_u64()).unwrap_or(0);
    let target_size = context.get("target_size").and_then(|v| v.as_u64()).unwrap_or(0);

    if target_size == 0 {
        return PreflightCheck::new("Target Size", false, "could not determine target size")
            .with_severity(Severity::Error);
    }

    let mut details = HashMap::new();
    details.insert("source_size".to_string(), serde_json::json!(source_size));
    details.insert("target_size".to_string(), serde_json::json!(target_size));

    if target_size < source_size {
        return PreflightCheck::new(
            "Target Size",
            false,
            format!("target ({target_size} bytes) is smaller than source ({source_size} bytes)"),
        )
        .with_severity(Severity::Error)
        .with_details(details);
    }

    PreflightCheck::new("Target Size", true, "target has sufficient size").with_details(details)
}

/// Confirms `target_path` does not appear in `mounted_paths`.
pub fn check_not_mounted(context: &PreflightContext) -> PreflightCheck {
    let target_path = context
        .get("target_path")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();
    let mounted_paths: Vec<String> = context
        .get("mounted_paths")
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default();

    if mounted_paths.contains(&target_path) {
        let mut details = HashMap::new();
        details.insert("mounted_paths".to_string(), serde_json::json!(mounted_paths));
        return PreflightCheck::new(
            "Mount Status",
            false,
            format!("target {target_path} is currently mounted"),
        )
        .with_severity(Severity::Error)
        .with_details(details);
    }

    PreflightCheck::new("Mount Status", true, "target is not mounted")
}

/// The standard checker every destructive operation runs through:
/// power status, target size, and mount status.
pub fn create_standard_preflight_checker() -> PreflightChecker {
    let mut checker = PreflightChecker::new();
    checker.add_check("Power Status", check_power_status);
    checker.add_check("Target Size", check_target_size);
    checker.add_check("Mount Status", check_not_mounted);
    checker
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(pairs: &[(&str, serde_json::Value)]) -> PreflightContext {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn power_status_passes_without_battery_key() {
        let check = check_power_status(&ctx(&[]));
        assert!(check.passed);
    }

    #[test]
    fn power_status_warns_above_fifty_percent_on_battery() {
        let check = check_power_status(&ctx(&[
            ("battery_percent", serde_json::json!(75.0)),
            ("power_plugged", serde_json::json!(false)),
        ]));
        assert!(check.passed);
        assert_eq!(check.severity, Severity::Warning);
    }

    #[test]
    fn power_status_errors_below_fifty_percent_on_battery() {
        let check = check_power_status(&ctx(&[
            ("battery_percent", serde_json::json!(20.0)),
            ("power_plugged", serde_json::json!(false)),
        ]));
        assert!(!check.passed);
        assert_eq!(check.severity, Severity::Error);
    }

    #[test]
    fn target_size_fails_when_smaller_than_source() {
        let check = check_target_size(&ctx(&[
            ("source_size", serde_json::json!(1000)),
            ("target_size", serde_json::json!(500)),
        ]));
        assert!(!check.passed);
    }

    #[test]
    fn target_size_fails_when_zero() {
        let check = check_target_size(&ctx(&[]));
        assert!(!check.passed);
    }

    #[test]
    fn not_mounted_fails_when_target_is_in_mounted_list() {
        let check = check_not_mounted(&ctx(&[
            ("target_path", serde_json::json!("/dev/sda1")),
            ("mounted_paths", serde_json::json!(["/dev/sda1", "/dev/sdb1"])),
        ]));
        assert!(!check.passed);
    }

    #[test]
    fn standard_checker_runs_all_three_checks() {
        let checker = create_standard_preflight_checker();
        let report = checker.run_checks(&ctx(&[]));
        assert_eq!(report.checks.len(), 3);
    }
}
