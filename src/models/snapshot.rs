// Telemetry snapshot models

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Round to one decimal place (percentages, temperatures).
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Used/total pair for memory or disk; `Default` is the unavailable sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct UsageStats {
    pub used: u64,
    pub total: u64,
    pub percent: f64,
}

impl UsageStats {
    pub fn from_used_total(used: u64, total: u64) -> Self {
        let percent = if total > 0 {
            round1(used as f64 / total as f64 * 100.0)
        } else {
            0.0
        };
        Self {
            used,
            total,
            percent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Uptime {
    pub seconds: f64,
    pub formatted: String,
}

impl Uptime {
    pub fn from_secs(seconds: f64) -> Self {
        let whole = seconds.max(0.0) as u64;
        let days = whole / 86_400;
        let hours = (whole % 86_400) / 3_600;
        let minutes = (whole % 3_600) / 60;
        Self {
            seconds,
            formatted: format!("{days}d {hours}h {minutes}m"),
        }
    }

    pub fn unknown() -> Self {
        Self {
            seconds: 0.0,
            formatted: "unknown".into(),
        }
    }
}

impl Default for Uptime {
    fn default() -> Self {
        Self::unknown()
    }
}

/// systemd unit state; serializes to lowercase JSON (e.g. "active").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Active,
    Inactive,
    Failed,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ServiceState {
    /// Parse `systemctl is-active` output (e.g. "active", "failed").
    pub fn from_systemctl(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "active" => ServiceState::Active,
            "inactive" => ServiceState::Inactive,
            "failed" => ServiceState::Failed,
            _ => ServiceState::Unknown,
        }
    }
}

/// One point-in-time system measurement. Immutable once appended to history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub timestamp: DateTime<Local>,
    pub cpu_percent: f64,
    pub memory: UsageStats,
    pub disk: UsageStats,
    pub cpu_temp: Option<f64>,
    pub uptime: Uptime,
    pub service_states: BTreeMap<String, ServiceState>,
    /// Wallet balance in satoshi.
    pub remote_balance: Option<i64>,
}

impl Snapshot {
    /// Snapshot with every field at its unavailable sentinel.
    pub fn sentinel(timestamp: DateTime<Local>) -> Self {
        Self {
            timestamp,
            cpu_percent: 0.0,
            memory: UsageStats::default(),
            disk: UsageStats::default(),
            cpu_temp: None,
            uptime: Uptime::unknown(),
            service_states: BTreeMap::new(),
            remote_balance: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uptime_formats_days_hours_minutes() {
        let up = Uptime::from_secs(2.0 * 86_400.0 + 3.0 * 3_600.0 + 4.0 * 60.0 + 59.9);
        assert_eq!(up.formatted, "2d 3h 4m");
    }

    #[test]
    fn usage_percent_rounds_to_one_decimal() {
        let u = UsageStats::from_used_total(1, 3);
        assert_eq!(u.percent, 33.3);
        assert_eq!(UsageStats::from_used_total(5, 0).percent, 0.0);
    }

    #[test]
    fn service_state_from_systemctl() {
        assert_eq!(ServiceState::from_systemctl("active\n"), ServiceState::Active);
        assert_eq!(ServiceState::from_systemctl("inactive"), ServiceState::Inactive);
        assert_eq!(ServiceState::from_systemctl("failed"), ServiceState::Failed);
        assert_eq!(ServiceState::from_systemctl("activating"), ServiceState::Unknown);
        assert_eq!(ServiceState::from_systemctl(""), ServiceState::Unknown);
    }
}
