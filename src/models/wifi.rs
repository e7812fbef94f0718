// Wireless scan and connection models

use serde::{Deserialize, Serialize};

/// Access point security as reported to the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Security {
    #[default]
    #[serde(rename = "")]
    Open,
    #[serde(rename = "WEP")]
    Wep,
    #[serde(rename = "WPA")]
    Wpa,
    #[serde(rename = "WPA2")]
    Wpa2,
}

impl Security {
    /// Classify tool flags, e.g. nmcli "WPA1 WPA2" or wpa_cli "[WPA2-PSK-CCMP][ESS]".
    pub fn from_flags(flags: &str) -> Self {
        let flags = flags.to_uppercase();
        if flags.contains("WPA2") || flags.contains("WPA3") || flags.contains("RSN") {
            Security::Wpa2
        } else if flags.contains("WPA") {
            Security::Wpa
        } else if flags.contains("WEP") {
            Security::Wep
        } else {
            Security::Open
        }
    }

    pub fn is_secured(self) -> bool {
        self != Security::Open
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiNetwork {
    pub ssid: String,
    /// 0..=100
    pub signal: u8,
    pub security: Security,
    pub connected: bool,
}

/// Scan outcome. An empty list with `error` set means the scan itself failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub networks: Vec<WifiNetwork>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScanResult {
    pub fn ok(networks: Vec<WifiNetwork>) -> Self {
        Self {
            networks,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            networks: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// Derived on every status query; never cached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionState {
    pub connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConnectionState {
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn connected(ssid: Option<String>, ip: Option<String>) -> Self {
        Self {
            connected: true,
            ssid,
            ip,
            error: None,
        }
    }

    /// Status could not be determined; reported as not connected.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectRequest {
    #[serde(default)]
    pub ssid: String,
    #[serde(default)]
    pub password: Option<String>,
}
