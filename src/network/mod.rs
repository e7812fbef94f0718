// Wireless management behind interchangeable tool backends.
// Backends return typed errors; NetworkAdapter is the boundary where every
// failure becomes data (ScanResult.error, ActionOutcome, ConnectionState.error).

mod demo;
mod escape;
mod nmcli;
mod signal;
mod wpa_cli;

pub use demo::DemoBackend;
pub use escape::{escape_field, split_escaped, split_terse};
pub use nmcli::NmcliBackend;
pub use signal::{WEAKEST_DBM, dbm_to_percent, parse_dbm_percent, parse_percent};
pub use wpa_cli::WpaCliBackend;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use crate::command::CommandRunner;
use crate::config::{WifiBackendKind, WifiConfig};
use crate::error::WifiError;
use crate::models::{ActionOutcome, ConnectionState, ScanResult, WifiNetwork};

/// One concrete wireless tool.
#[async_trait]
pub trait WifiBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Trigger a rescan, wait for it to settle, and return rows in tool order.
    async fn scan(&self) -> Result<Vec<WifiNetwork>, WifiError>;

    /// A single association attempt. `Ok` carries the user-facing message.
    async fn connect(&self, ssid: &str, password: Option<&str>) -> Result<String, WifiError>;

    async fn status(&self) -> Result<ConnectionState, WifiError>;
}

pub struct NetworkAdapter {
    backend: Arc<dyn WifiBackend>,
}

impl NetworkAdapter {
    pub fn new(backend: Arc<dyn WifiBackend>) -> Self {
        Self { backend }
    }

    /// Backend from config; dev mode always gets the canned backend.
    pub fn from_config(config: &WifiConfig, dev_mode: bool, runner: Arc<dyn CommandRunner>) -> Self {
        let backend: Arc<dyn WifiBackend> = if dev_mode {
            Arc::new(DemoBackend)
        } else {
            match config.backend {
                WifiBackendKind::Nmcli => Arc::new(NmcliBackend::new(
                    runner,
                    config.settle_delay(),
                    config.command_timeout(),
                )),
                WifiBackendKind::WpaCli => Arc::new(WpaCliBackend::new(
                    runner,
                    config.interface.clone(),
                    config.settle_delay(),
                    config.command_timeout(),
                )),
            }
        };
        Self::new(backend)
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Deduplicated networks, strongest first. An empty list may mean the scan
    /// failed; `error` tells the two apart.
    pub async fn scan(&self) -> ScanResult {
        match self.backend.scan().await {
            Ok(raw) => ScanResult::ok(finalize_scan(raw)),
            Err(e) => {
                warn!(error = %e, operation = "wifi_scan", backend = self.backend.name(), "wifi scan failed");
                ScanResult::failed(e.to_string())
            }
        }
    }

    /// No retry: the tool retries association itself, and re-invoking could
    /// create duplicate profiles. An empty password means an open network.
    pub async fn connect(&self, ssid: &str, password: Option<&str>) -> ActionOutcome {
        if ssid.trim().is_empty() {
            return ActionOutcome::invalid("SSID required");
        }
        let password = password.filter(|p| !p.is_empty());
        match self.backend.connect(ssid, password).await {
            Ok(message) => {
                tracing::info!(ssid, backend = self.backend.name(), "wifi connect issued");
                ActionOutcome::ok(message)
            }
            Err(e) => {
                warn!(error = %e, operation = "wifi_connect", ssid, "wifi connect failed");
                ActionOutcome::failed(e.to_string())
            }
        }
    }

    /// A status that cannot be determined is reported as disconnected.
    pub async fn status(&self) -> ConnectionState {
        match self.backend.status().await {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, operation = "wifi_status", "wifi status unavailable");
                ConnectionState::failed(e.to_string())
            }
        }
    }
}

/// Drop blank SSIDs, keep the first row per SSID in tool order, then sort by
/// signal descending (stable, so equal signals keep tool order). A multi-AP
/// network is connected if any of its rows is in use.
pub fn finalize_scan(raw: Vec<WifiNetwork>) -> Vec<WifiNetwork> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut networks: Vec<WifiNetwork> = Vec::new();
    for network in raw.into_iter().filter(|n| !n.ssid.trim().is_empty()) {
        match index.get(&network.ssid) {
            Some(&kept) => networks[kept].connected |= network.connected,
            None => {
                index.insert(network.ssid.clone(), networks.len());
                networks.push(network);
            }
        }
    }
    networks.sort_by(|a, b| b.signal.cmp(&a.signal));
    networks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Security;

    fn net(ssid: &str, signal: u8) -> WifiNetwork {
        WifiNetwork {
            ssid: ssid.into(),
            signal,
            security: Security::Wpa2,
            connected: false,
        }
    }

    #[test]
    fn dedup_keeps_first_then_sorts() {
        let out = finalize_scan(vec![net("X", 40), net("Y", 90), net("X", 10)]);
        let pairs: Vec<(&str, u8)> = out.iter().map(|n| (n.ssid.as_str(), n.signal)).collect();
        assert_eq!(pairs, vec![("Y", 90), ("X", 40)]);
    }

    #[test]
    fn dedup_keeps_first_even_when_later_is_stronger() {
        let out = finalize_scan(vec![net("X", 10), net("X", 99)]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].signal, 10);
    }

    #[test]
    fn in_use_duplicate_marks_kept_row_connected() {
        let mut in_use = net("Home", 60);
        in_use.connected = true;
        let out = finalize_scan(vec![net("Home", 82), in_use, net("Attic", 70)]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].ssid, "Home");
        assert_eq!(out[0].signal, 82);
        assert!(out[0].connected);
        assert!(!out[1].connected);
    }

    #[test]
    fn blank_ssids_dropped() {
        let out = finalize_scan(vec![net("", 90), net("   ", 80), net("Z", 5)]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].ssid, "Z");
    }
}
