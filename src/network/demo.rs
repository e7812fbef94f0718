// Canned backend for dev mode: no tools are invoked.

use async_trait::async_trait;

use super::WifiBackend;
use crate::error::WifiError;
use crate::models::{ConnectionState, Security, WifiNetwork};

#[derive(Debug, Default, Clone, Copy)]
pub struct DemoBackend;

#[async_trait]
impl WifiBackend for DemoBackend {
    fn name(&self) -> &'static str {
        "demo"
    }

    async fn scan(&self) -> Result<Vec<WifiNetwork>, WifiError> {
        let network = |ssid: &str, signal, security, connected| WifiNetwork {
            ssid: ssid.to_string(),
            signal,
            security,
            connected,
        };
        Ok(vec![
            network("MyNetwork", 85, Security::Wpa2, true),
            network("Neighbor", 60, Security::Wpa2, false),
            network("OpenWifi", 40, Security::Open, false),
        ])
    }

    async fn connect(&self, ssid: &str, _password: Option<&str>) -> Result<String, WifiError> {
        Ok(format!("DEV MODE: would connect to {ssid}"))
    }

    async fn status(&self) -> Result<ConnectionState, WifiError> {
        Ok(ConnectionState::connected(
            Some("MyNetwork".into()),
            Some("192.168.1.100".into()),
        ))
    }
}
