use serde::Deserialize;
use std::time::Duration;

use crate::worker::WorkerConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub sampler: SamplerConfig,
    #[serde(default)]
    pub services: ServicesConfig,
    #[serde(default)]
    pub wifi: WifiConfig,
    #[serde(default)]
    pub balance: BalanceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    /// Canned wifi data, dry-run actions, no authentication.
    #[serde(default)]
    pub dev_mode: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// Bearer token for /box/api. Required unless server.dev_mode.
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    pub interval_secs: u64,
    pub warmup_ms: u64,
    pub history_size: usize,
    pub source_timeout_secs: u64,
    /// How often to log sampler stats at INFO level.
    pub stats_log_interval_secs: u64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            warmup_ms: 1000,
            history_size: crate::history_repo::DEFAULT_HISTORY_SIZE,
            source_timeout_secs: crate::sampler::DEFAULT_SOURCE_TIMEOUT.as_secs(),
            stats_log_interval_secs: 600,
        }
    }
}

impl SamplerConfig {
    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source_timeout_secs)
    }

    pub fn worker_config(&self) -> WorkerConfig {
        WorkerConfig {
            warmup: Duration::from_millis(self.warmup_ms),
            sample_interval: Duration::from_secs(self.interval_secs),
            stats_log_interval: Duration::from_secs(self.stats_log_interval_secs),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    /// Units shown on the dashboard and accepted by /restart/{service}.
    pub allowed: Vec<String>,
    pub status_timeout_secs: u64,
    pub restart_timeout_secs: u64,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            allowed: vec!["lnbits".into(), "spark-sidecar".into()],
            status_timeout_secs: 5,
            restart_timeout_secs: 30,
        }
    }
}

impl ServicesConfig {
    pub fn status_timeout(&self) -> Duration {
        Duration::from_secs(self.status_timeout_secs)
    }

    pub fn restart_timeout(&self) -> Duration {
        Duration::from_secs(self.restart_timeout_secs)
    }

    pub fn is_allowed(&self, name: &str) -> bool {
        self.allowed.iter().any(|s| s == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WifiBackendKind {
    Nmcli,
    WpaCli,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WifiConfig {
    pub backend: WifiBackendKind,
    /// Used by the wpa_cli backend; nmcli finds the device itself.
    pub interface: String,
    pub settle_delay_ms: u64,
    pub command_timeout_secs: u64,
}

impl Default for WifiConfig {
    fn default() -> Self {
        Self {
            backend: WifiBackendKind::Nmcli,
            interface: "wlan0".into(),
            settle_delay_ms: 3000,
            command_timeout_secs: 10,
        }
    }
}

impl WifiConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BalanceConfig {
    /// Spark sidecar base URL (local, plain HTTP); no balance is reported when unset.
    pub url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: 5,
        }
    }
}

impl BalanceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("reading config {}: {}", path, e))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.server.host.is_empty(),
            "server.host must be non-empty"
        );
        anyhow::ensure!(
            self.server.dev_mode
                || self
                    .auth
                    .token
                    .as_deref()
                    .is_some_and(|t| !t.trim().is_empty()),
            "auth.token is required unless server.dev_mode = true"
        );
        anyhow::ensure!(
            self.sampler.interval_secs > 0,
            "sampler.interval_secs must be > 0, got {}",
            self.sampler.interval_secs
        );
        anyhow::ensure!(
            self.sampler.history_size > 0,
            "sampler.history_size must be > 0, got {}",
            self.sampler.history_size
        );
        anyhow::ensure!(
            self.sampler.source_timeout_secs > 0,
            "sampler.source_timeout_secs must be > 0, got {}",
            self.sampler.source_timeout_secs
        );
        anyhow::ensure!(
            self.sampler.stats_log_interval_secs > 0,
            "sampler.stats_log_interval_secs must be > 0, got {}",
            self.sampler.stats_log_interval_secs
        );
        for name in &self.services.allowed {
            anyhow::ensure!(
                !name.is_empty() && !name.contains('/') && !name.chars().any(char::is_whitespace),
                "services.allowed entries must be plain unit names, got {:?}",
                name
            );
        }
        anyhow::ensure!(
            self.services.status_timeout_secs > 0,
            "services.status_timeout_secs must be > 0, got {}",
            self.services.status_timeout_secs
        );
        anyhow::ensure!(
            self.services.restart_timeout_secs > 0,
            "services.restart_timeout_secs must be > 0, got {}",
            self.services.restart_timeout_secs
        );
        anyhow::ensure!(
            !self.wifi.interface.is_empty(),
            "wifi.interface must be non-empty"
        );
        anyhow::ensure!(
            self.wifi.command_timeout_secs > 0,
            "wifi.command_timeout_secs must be > 0, got {}",
            self.wifi.command_timeout_secs
        );
        anyhow::ensure!(
            self.balance.timeout_secs > 0,
            "balance.timeout_secs must be > 0, got {}",
            self.balance.timeout_secs
        );
        if let Some(url) = &self.balance.url {
            anyhow::ensure!(
                url.starts_with("http://"),
                "balance.url must be a plain http:// URL, got {:?}",
                url
            );
        }
        Ok(())
    }
}
