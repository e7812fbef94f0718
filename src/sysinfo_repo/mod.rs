// Host metrics via sysinfo, plus sysfs/procfs reads for what sysinfo lacks

mod linux;

use crate::models::{Uptime, UsageStats, round1};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use sysinfo::{Disks, System};
use tracing::instrument;

/// First thermal zone; on a Raspberry Pi this is the SoC sensor.
pub const DEFAULT_THERMAL_ZONE: &str = "/sys/class/thermal/thermal_zone0/temp";

/// Best-effort readers for the host metric domains. Each call is independent;
/// the sampler turns an `Err` into that field's sentinel.
#[async_trait]
pub trait HostProbe: Send + Sync {
    /// Establish the CPU usage baseline so the next `cpu_percent` has a delta.
    async fn prime(&self) {}

    async fn cpu_percent(&self) -> anyhow::Result<f64>;
    async fn memory(&self) -> anyhow::Result<UsageStats>;
    async fn disk(&self) -> anyhow::Result<UsageStats>;
    /// Ok(None) when the host has no readable sensor.
    async fn cpu_temp(&self) -> anyhow::Result<Option<f64>>;
    async fn uptime(&self) -> anyhow::Result<Uptime>;
}

pub struct SysinfoRepo {
    sys: Arc<Mutex<System>>,
    disks: Arc<Mutex<Disks>>,
    disk_mount: PathBuf,
    thermal_zone: PathBuf,
}

impl Default for SysinfoRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoRepo {
    pub fn new() -> Self {
        Self::with_paths("/", DEFAULT_THERMAL_ZONE)
    }

    pub fn with_paths(disk_mount: impl AsRef<Path>, thermal_zone: impl AsRef<Path>) -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_all();
        sys.refresh_memory();
        Self {
            sys: Arc::new(Mutex::new(sys)),
            disks: Arc::new(Mutex::new(Disks::new_with_refreshed_list())),
            disk_mount: disk_mount.as_ref().to_path_buf(),
            thermal_zone: thermal_zone.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl HostProbe for SysinfoRepo {
    async fn prime(&self) {
        let sys = self.sys.clone();
        let primed = tokio::task::spawn_blocking(move || {
            if let Ok(mut sys) = sys.lock() {
                sys.refresh_cpu_all();
            }
        })
        .await;
        if let Err(e) = primed {
            tracing::warn!(error = %e, "sysinfo prime task failed");
        }
    }

    /// Usage since the previous call (or since `prime`).
    #[instrument(skip(self), fields(repo = "sysinfo", operation = "cpu_percent"))]
    async fn cpu_percent(&self) -> anyhow::Result<f64> {
        let sys = self.sys.clone();
        tokio::task::spawn_blocking(move || {
            let mut sys = sys
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo lock poisoned: {}", e))?;
            sys.refresh_cpu_all();
            let usage = sys.global_cpu_usage() as f64;
            Ok(round1(usage.clamp(0.0, 100.0)))
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "memory"))]
    async fn memory(&self) -> anyhow::Result<UsageStats> {
        let sys = self.sys.clone();
        tokio::task::spawn_blocking(move || {
            let mut sys = sys
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo lock poisoned: {}", e))?;
            sys.refresh_memory();

            let total = sys.total_memory();
            let used = total.saturating_sub(sys.available_memory());
            Ok(UsageStats::from_used_total(used, total))
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "disk"))]
    async fn disk(&self) -> anyhow::Result<UsageStats> {
        let disks = self.disks.clone();
        let mount = self.disk_mount.clone();
        tokio::task::spawn_blocking(move || {
            let mut disks_guard = disks
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo disks lock poisoned: {}", e))?;
            disks_guard.refresh(false);
            let disk = disks_guard
                .list()
                .iter()
                .find(|d| d.mount_point() == mount)
                .ok_or_else(|| anyhow::anyhow!("no disk mounted at {}", mount.display()))?;
            let total = disk.total_space();
            let used = total.saturating_sub(disk.available_space());
            Ok(UsageStats::from_used_total(used, total))
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }

    async fn cpu_temp(&self) -> anyhow::Result<Option<f64>> {
        Ok(linux::read_thermal_zone(&self.thermal_zone))
    }

    async fn uptime(&self) -> anyhow::Result<Uptime> {
        let seconds = linux::read_proc_uptime().unwrap_or_else(|| System::uptime() as f64);
        Ok(Uptime::from_secs(seconds))
    }
}
