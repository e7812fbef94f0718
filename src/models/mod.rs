// Domain models

mod action;
mod snapshot;
mod wifi;

use serde::{Deserialize, Serialize};

pub use action::{ActionOutcome, FailureKind, OutcomeStatus};
pub use snapshot::{ServiceState, Snapshot, Uptime, UsageStats, round1};
pub use wifi::{ConnectRequest, ConnectionState, ScanResult, Security, WifiNetwork};

pub use crate::history_repo::HistorySeries;

/// GET /box/api/stats body: a fresh snapshot plus the chart series from history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub current: Snapshot,
    pub history: HistorySeries,
}
