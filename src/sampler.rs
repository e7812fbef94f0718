// Telemetry sampler: assembles one snapshot from every metric source and owns
// the history buffer the background worker appends to.

use crate::balance_repo::BalanceSource;
use crate::history_repo::HistoryRepo;
use crate::models::{Snapshot, Uptime, UsageStats};
use crate::service_repo::ServiceRepo;
use crate::sysinfo_repo::HostProbe;
use chrono::Local;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Upper bound for any single metric source.
pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(5);

/// Metric sources and the history buffer.
pub struct SamplerDeps {
    pub host: Arc<dyn HostProbe>,
    pub services: Arc<ServiceRepo>,
    pub balance: Option<Arc<dyn BalanceSource>>,
    pub history: Arc<HistoryRepo>,
}

pub struct Sampler {
    host: Arc<dyn HostProbe>,
    services: Arc<ServiceRepo>,
    balance: Option<Arc<dyn BalanceSource>>,
    history: Arc<HistoryRepo>,
    source_timeout: Duration,
}

impl Sampler {
    pub fn new(deps: SamplerDeps, source_timeout: Duration) -> Self {
        let SamplerDeps {
            host,
            services,
            balance,
            history,
        } = deps;
        Self {
            host,
            services,
            balance,
            history,
            source_timeout,
        }
    }

    pub fn history(&self) -> &Arc<HistoryRepo> {
        &self.history
    }

    /// Establish counter baselines before the first real sample.
    pub async fn prime(&self) {
        self.host.prime().await;
    }

    /// Read every source once, concurrently. Never fails: a source that errors
    /// or exceeds its timeout contributes its sentinel value instead.
    pub async fn collect_now(&self) -> Snapshot {
        let limit = self.source_timeout;
        let (cpu_percent, memory, disk, cpu_temp, uptime, service_states, remote_balance) = tokio::join!(
            absorb("cpu_percent", limit, self.host.cpu_percent(), 0.0),
            absorb("memory", limit, self.host.memory(), UsageStats::default()),
            absorb("disk", limit, self.host.disk(), UsageStats::default()),
            absorb("cpu_temp", limit, self.host.cpu_temp(), None),
            absorb("uptime", limit, self.host.uptime(), Uptime::unknown()),
            self.services.states(),
            self.remote_balance(),
        );

        Snapshot {
            timestamp: Local::now(),
            cpu_percent,
            memory,
            disk,
            cpu_temp,
            uptime,
            service_states,
            remote_balance,
        }
    }

    /// Collect and append one snapshot. Returns the history length afterwards.
    pub async fn sample_once(&self) -> usize {
        let snapshot = self.collect_now().await;
        self.history.push(snapshot)
    }

    pub fn read_history(&self) -> Vec<Arc<Snapshot>> {
        self.history.read_history()
    }

    async fn remote_balance(&self) -> Option<i64> {
        let source = self.balance.as_ref()?;
        absorb("remote_balance", self.source_timeout, source.balance(), None).await
    }
}

async fn absorb<T>(
    operation: &'static str,
    limit: Duration,
    source: impl Future<Output = anyhow::Result<T>>,
    fallback: T,
) -> T {
    match tokio::time::timeout(limit, source).await {
        Ok(Ok(value)) => value,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, operation, "metric source failed");
            fallback
        }
        Err(_) => {
            tracing::warn!(
                operation,
                timeout_ms = limit.as_millis() as u64,
                "metric source timed out"
            );
            fallback
        }
    }
}
