// wpa_supplicant backend driven through `wpa_cli -i <iface>` plus `ip` for the address.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use super::WifiBackend;
use super::signal::parse_dbm_percent;
use crate::command::CommandRunner;
use crate::error::WifiError;
use crate::models::{ConnectionState, Security, WifiNetwork};

const WPA_CLI: &str = "wpa_cli";

pub struct WpaCliBackend {
    runner: Arc<dyn CommandRunner>,
    interface: String,
    settle_delay: Duration,
    timeout: Duration,
}

impl WpaCliBackend {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        interface: impl Into<String>,
        settle_delay: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            runner,
            interface: interface.into(),
            settle_delay,
            timeout,
        }
    }

    /// Trimmed stdout of `wpa_cli -i <iface> <args>`.
    async fn wpa_cli(&self, args: &[&str]) -> Result<String, WifiError> {
        let mut full = Vec::with_capacity(args.len() + 2);
        full.extend_from_slice(&["-i", self.interface.as_str()]);
        full.extend_from_slice(args);
        let out = self.runner.run(WPA_CLI, &full, self.timeout).await?;
        if !out.success {
            return Err(WifiError::Rejected(
                out.diagnostic().unwrap_or("wpa_cli failed").to_string(),
            ));
        }
        Ok(out.stdout.trim().to_string())
    }

    async fn current_ssid(&self) -> Result<Option<String>, WifiError> {
        let status = self.wpa_cli(&["status"]).await?;
        Ok(parse_status_ssid(&status))
    }

    async fn interface_ip(&self) -> Option<String> {
        let args = ["-4", "-o", "addr", "show", self.interface.as_str()];
        match self.runner.run("ip", &args, self.timeout).await {
            Ok(out) if out.success => parse_inet_address(&out.stdout),
            Ok(out) => {
                tracing::debug!(detail = out.diagnostic().unwrap_or(""), "ip addr failed");
                None
            }
            Err(e) => {
                tracing::debug!(error = %e, "ip addr failed");
                None
            }
        }
    }

    async fn configure_and_enable(
        &self,
        net_id: &str,
        ssid: &str,
        password: Option<&str>,
    ) -> Result<(), WifiError> {
        let mut settings = vec![("ssid", format!("\"{ssid}\""))];
        match password {
            Some(password) => settings.push(("psk", format!("\"{password}\""))),
            None => settings.push(("key_mgmt", "NONE".to_string())),
        }
        for (key, value) in &settings {
            let reply = self
                .wpa_cli(&["set_network", net_id, *key, value.as_str()])
                .await?;
            if !reply.contains("OK") {
                return Err(WifiError::Rejected(format!("Failed to set network {key}")));
            }
        }

        let reply = self.wpa_cli(&["enable_network", net_id]).await?;
        if !reply.contains("OK") {
            return Err(WifiError::Rejected("Failed to enable network".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl WifiBackend for WpaCliBackend {
    fn name(&self) -> &'static str {
        WPA_CLI
    }

    async fn scan(&self) -> Result<Vec<WifiNetwork>, WifiError> {
        if let Err(e) = self.wpa_cli(&["scan"]).await {
            tracing::debug!(error = %e, "wpa_cli scan trigger failed");
        }
        tokio::time::sleep(self.settle_delay).await;

        let raw = self.wpa_cli(&["scan_results"]).await?;
        let current = self.current_ssid().await.unwrap_or_else(|e| {
            tracing::debug!(error = %e, "current ssid unavailable during scan");
            None
        });
        parse_scan_results(&raw, current.as_deref())
    }

    /// add → set → enable → save, then re-read status after the settle delay.
    /// Association is asynchronous, so "not yet on the network" is still a success.
    async fn connect(&self, ssid: &str, password: Option<&str>) -> Result<String, WifiError> {
        let net_id = self.wpa_cli(&["add_network"]).await?;
        if net_id.is_empty() || !net_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(WifiError::UnexpectedOutput {
                tool: WPA_CLI,
                detail: format!("add_network returned {net_id:?}"),
            });
        }

        if let Err(e) = self.configure_and_enable(&net_id, ssid, password).await {
            if let Err(remove_err) = self.wpa_cli(&["remove_network", net_id.as_str()]).await {
                tracing::warn!(error = %remove_err, net_id = %net_id, "failed to remove half-configured network");
            }
            return Err(e);
        }

        if let Err(e) = self.wpa_cli(&["save_config"]).await {
            tracing::warn!(error = %e, "wpa_cli save_config failed; network not persisted");
        }

        tokio::time::sleep(self.settle_delay).await;
        let current = self.current_ssid().await.unwrap_or(None);
        if current.as_deref() == Some(ssid) {
            Ok(format!("Connected to {ssid}"))
        } else {
            Ok(format!("Connecting to {ssid}..."))
        }
    }

    async fn status(&self) -> Result<ConnectionState, WifiError> {
        match self.current_ssid().await? {
            Some(ssid) => Ok(ConnectionState::connected(
                Some(ssid),
                self.interface_ip().await,
            )),
            None => Ok(ConnectionState::disconnected()),
        }
    }
}

/// `scan_results` rows: bssid / frequency / signal dBm / flags / ssid.
/// Rows present but none readable is an error, not an empty scan.
pub(crate) fn parse_scan_results(
    raw: &str,
    current_ssid: Option<&str>,
) -> Result<Vec<WifiNetwork>, WifiError> {
    let rows: Vec<&str> = raw
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.starts_with("bssid"))
        .collect();
    let networks: Vec<WifiNetwork> = rows
        .iter()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split('\t').collect();
            if parts.len() < 5 {
                return None;
            }
            let ssid = parts[4].trim();
            Some(WifiNetwork {
                ssid: ssid.to_string(),
                signal: parse_dbm_percent(parts[2]),
                security: Security::from_flags(parts[3]),
                connected: current_ssid == Some(ssid),
            })
        })
        .collect();
    if networks.is_empty() && !rows.is_empty() {
        return Err(WifiError::UnexpectedOutput {
            tool: WPA_CLI,
            detail: format!("no readable row in {} line(s) of scan_results", rows.len()),
        });
    }
    Ok(networks)
}

pub(crate) fn parse_status_ssid(status: &str) -> Option<String> {
    status
        .lines()
        .find_map(|line| line.strip_prefix("ssid="))
        .filter(|ssid| !ssid.is_empty())
        .map(str::to_string)
}

/// Address from `ip -4 -o addr show <iface>`, without the prefix length.
pub(crate) fn parse_inet_address(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let (_, rest) = line.split_once("inet ")?;
        let address = rest.split('/').next()?.trim();
        (!address.is_empty()).then(|| address.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCAN: &str = "bssid / frequency / signal level / flags / ssid\n\
        aa:bb:cc:dd:ee:01\t2437\t-45\t[WPA2-PSK-CCMP][ESS]\tHome\n\
        aa:bb:cc:dd:ee:02\t2412\t-80\t[ESS]\tCoffee\n\
        aa:bb:cc:dd:ee:03\t5180\t-50\t[WPA2-PSK-CCMP][ESS]\t\n\
        aa:bb:cc:dd:ee:04\t5180\tweird\t[WEP][ESS]\tOld\n";

    #[test]
    fn scan_results_rows() {
        let nets = parse_scan_results(SCAN, Some("Home")).unwrap();
        assert_eq!(nets.len(), 4);
        assert_eq!(nets[0].ssid, "Home");
        assert_eq!(nets[0].signal, 75);
        assert!(nets[0].connected);
        assert_eq!(nets[1].security, Security::Open);
        assert!(!nets[1].connected);
        assert_eq!(nets[2].ssid, "");
        assert_eq!(nets[3].signal, 0);
        assert_eq!(nets[3].security, Security::Wep);
    }

    #[test]
    fn scan_results_header_only_is_empty() {
        let nets = parse_scan_results("bssid / frequency / signal level / flags / ssid\n", None);
        assert!(nets.unwrap().is_empty());
    }

    #[test]
    fn scan_results_unreadable_rows_are_an_error() {
        let err = parse_scan_results("Selected interface 'wlan0'\nFAIL\n", None).unwrap_err();
        assert!(matches!(err, WifiError::UnexpectedOutput { tool: "wpa_cli", .. }));
    }

    #[test]
    fn status_ssid_ignores_bssid_line() {
        let status = "bssid=aa:bb:cc:dd:ee:01\nfreq=2437\nssid=Home\nwpa_state=COMPLETED\n";
        assert_eq!(parse_status_ssid(status), Some("Home".into()));
        assert_eq!(parse_status_ssid("wpa_state=DISCONNECTED\n"), None);
    }

    #[test]
    fn inet_address_from_ip_output() {
        let out = "3: wlan0    inet 192.168.1.100/24 brd 192.168.1.255 scope global dynamic wlan0\n";
        assert_eq!(parse_inet_address(out), Some("192.168.1.100".into()));
        assert_eq!(parse_inet_address(""), None);
    }
}
