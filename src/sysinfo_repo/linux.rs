// Linux-specific helpers: thermal zone and /proc/uptime.

use std::path::Path;

/// Read a sysfs thermal zone (millidegrees) as °C rounded to one decimal.
pub(super) fn read_thermal_zone(path: &Path) -> Option<f64> {
    let raw = std::fs::read_to_string(path).ok()?;
    parse_millidegrees(&raw)
}

fn parse_millidegrees(raw: &str) -> Option<f64> {
    let milli: i64 = raw.trim().parse().ok()?;
    Some(crate::models::round1(milli as f64 / 1000.0))
}

/// Seconds since boot with sub-second precision (first field of /proc/uptime).
#[cfg(target_os = "linux")]
pub(super) fn read_proc_uptime() -> Option<f64> {
    let content = std::fs::read_to_string("/proc/uptime").ok()?;
    parse_proc_uptime(&content)
}

#[cfg(not(target_os = "linux"))]
pub(super) fn read_proc_uptime() -> Option<f64> {
    None
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_proc_uptime(content: &str) -> Option<f64> {
    content.split_whitespace().next()?.parse().ok()
}
