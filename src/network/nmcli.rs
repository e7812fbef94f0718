// NetworkManager backend driven through `nmcli -t` (terse, escaped ':' records).

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use super::WifiBackend;
use super::escape::split_terse;
use super::signal::parse_percent;
use crate::command::{CommandOutput, CommandRunner};
use crate::error::WifiError;
use crate::models::{ConnectionState, Security, WifiNetwork};

const NMCLI: &str = "nmcli";

pub struct NmcliBackend {
    runner: Arc<dyn CommandRunner>,
    settle_delay: Duration,
    timeout: Duration,
}

impl NmcliBackend {
    pub fn new(runner: Arc<dyn CommandRunner>, settle_delay: Duration, timeout: Duration) -> Self {
        Self {
            runner,
            settle_delay,
            timeout,
        }
    }

    async fn nmcli(&self, args: &[&str]) -> Result<CommandOutput, WifiError> {
        Ok(self.runner.run(NMCLI, args, self.timeout).await?)
    }

    /// Run a read-only query; a non-zero exit becomes `Rejected`.
    async fn query(&self, args: &[&str]) -> Result<String, WifiError> {
        let out = self.nmcli(args).await?;
        if !out.success {
            return Err(WifiError::Rejected(
                out.diagnostic().unwrap_or("nmcli query failed").to_string(),
            ));
        }
        Ok(out.stdout)
    }
}

#[async_trait]
impl WifiBackend for NmcliBackend {
    fn name(&self) -> &'static str {
        NMCLI
    }

    async fn scan(&self) -> Result<Vec<WifiNetwork>, WifiError> {
        // NetworkManager refuses rescans issued too close together; the cached
        // list is still worth returning then.
        match self.nmcli(&["device", "wifi", "rescan"]).await {
            Ok(out) if !out.success => {
                tracing::debug!(detail = out.diagnostic().unwrap_or(""), "nmcli rescan refused");
            }
            Err(e) => tracing::debug!(error = %e, "nmcli rescan failed"),
            Ok(_) => {}
        }
        tokio::time::sleep(self.settle_delay).await;

        let table = self
            .query(&[
                "-t",
                "-f",
                "SSID,SIGNAL,SECURITY,IN-USE",
                "device",
                "wifi",
                "list",
                "--rescan",
                "no",
            ])
            .await?;
        parse_wifi_list(&table)
    }

    async fn connect(&self, ssid: &str, password: Option<&str>) -> Result<String, WifiError> {
        let mut args = vec!["device", "wifi", "connect", ssid];
        if let Some(password) = password {
            args.extend(["password", password]);
        }
        let out = self.nmcli(&args).await?;
        if out.success {
            Ok(format!("Connected to {ssid}"))
        } else {
            Err(WifiError::Rejected(
                out.diagnostic()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Failed to connect to {ssid}")),
            ))
        }
    }

    async fn status(&self) -> Result<ConnectionState, WifiError> {
        let table = self
            .query(&["-t", "-f", "DEVICE,TYPE,STATE,CONNECTION", "device", "status"])
            .await?;
        let Some(active) = find_connected_wifi(&table) else {
            return Ok(ConnectionState::disconnected());
        };
        let details = self
            .query(&["-t", "-f", "IP4.ADDRESS", "device", "show", active.device.as_str()])
            .await?;
        let ssid = match self.in_use_ssid(&active.device).await {
            Some(ssid) => Some(ssid),
            None => {
                tracing::debug!(device = %active.device, "in-use ssid not listed; using profile name");
                active.connection
            }
        };
        Ok(ConnectionState::connected(ssid, parse_ip4_address(&details)))
    }
}

impl NmcliBackend {
    /// The profile name can differ from the SSID ("Home 1"), so ask the cached
    /// scan list which SSID the device is associated with.
    async fn in_use_ssid(&self, device: &str) -> Option<String> {
        let args = [
            "-t", "-f", "IN-USE,SSID", "device", "wifi", "list", "ifname", device, "--rescan", "no",
        ];
        match self.query(&args).await {
            Ok(table) => parse_in_use_ssid(&table),
            Err(e) => {
                tracing::debug!(error = %e, "nmcli in-use ssid lookup failed");
                None
            }
        }
    }
}

/// Rows of `-f SSID,SIGNAL,SECURITY,IN-USE device wifi list`, in tool order.
/// A non-empty table with no readable row is an error, not an empty scan.
pub(crate) fn parse_wifi_list(table: &str) -> Result<Vec<WifiNetwork>, WifiError> {
    let rows: Vec<&str> = table.lines().filter(|line| !line.trim().is_empty()).collect();
    let networks: Vec<WifiNetwork> = rows
        .iter()
        .filter_map(|line| {
            let fields = split_terse(line);
            if fields.len() < 4 {
                tracing::debug!(line, "skipping short nmcli wifi row");
                return None;
            }
            Some(WifiNetwork {
                ssid: fields[0].clone(),
                signal: parse_percent(&fields[1]),
                security: Security::from_flags(&fields[2]),
                connected: fields[3].trim() == "*",
            })
        })
        .collect();
    if networks.is_empty() && !rows.is_empty() {
        return Err(WifiError::UnexpectedOutput {
            tool: NMCLI,
            detail: format!("no readable row in {} line(s) of wifi list", rows.len()),
        });
    }
    Ok(networks)
}

/// SSID of the `*` row from `-f IN-USE,SSID device wifi list`.
pub(crate) fn parse_in_use_ssid(table: &str) -> Option<String> {
    table.lines().find_map(|line| {
        let fields = split_terse(line);
        if fields.len() < 2 || fields[0].trim() != "*" {
            return None;
        }
        Some(fields[1].clone()).filter(|ssid| !ssid.is_empty())
    })
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ActiveDevice {
    pub device: String,
    /// NetworkManager names wifi profiles after the SSID by default.
    pub connection: Option<String>,
}

/// First wireless device in state "connected" from `-f DEVICE,TYPE,STATE,CONNECTION device status`.
pub(crate) fn find_connected_wifi(table: &str) -> Option<ActiveDevice> {
    table.lines().find_map(|line| {
        let fields = split_terse(line);
        if fields.len() < 4 {
            return None;
        }
        let is_wifi = matches!(fields[1].as_str(), "wifi" | "802-11-wireless");
        // "connected (externally)" still counts; "connecting" does not.
        let is_connected = fields[2].split_whitespace().next() == Some("connected");
        (is_wifi && is_connected).then(|| ActiveDevice {
            device: fields[0].clone(),
            connection: Some(fields[3].clone()).filter(|c| !c.is_empty()),
        })
    })
}

/// Address part of the first `IP4.ADDRESS[n]:a.b.c.d/len` line.
pub(crate) fn parse_ip4_address(details: &str) -> Option<String> {
    details.lines().find_map(|line| {
        let fields = split_terse(line);
        if !fields.first()?.starts_with("IP4.ADDRESS") {
            return None;
        }
        let address = fields.get(1)?.split('/').next()?.trim();
        (!address.is_empty()).then(|| address.to_string())
    })
}
