// Background sampling worker: one snapshot per tick into the history buffer.
// Ticks are measured from the start of the previous one; an overrunning tick
// makes the next start late without catch-up.

use crate::sampler::Sampler;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, MissedTickBehavior, interval, interval_at};
use tracing::Instrument;

/// Worker timing. Stats logging uses its own real-time interval.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Delay after priming so cumulative counters (CPU) have a baseline.
    pub warmup: Duration,
    pub sample_interval: Duration,
    pub stats_log_interval: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            warmup: Duration::from_secs(1),
            sample_interval: Duration::from_secs(30),
            stats_log_interval: Duration::from_secs(600),
        }
    }
}

/// Spawns the sampling loop. It runs until `shutdown_rx` fires or its sender is dropped.
pub fn spawn(
    sampler: Arc<Sampler>,
    config: WorkerConfig,
    shutdown_rx: oneshot::Receiver<()>,
) -> JoinHandle<()> {
    let span = tracing::debug_span!(
        "sampler",
        sample_interval_ms = config.sample_interval.as_millis() as u64
    );
    tokio::spawn(run(sampler, config, shutdown_rx).instrument(span))
}

/// Signals shutdown and waits for the loop to end. Returns false if the task
/// panicked or was cancelled instead of finishing.
pub async fn stop(shutdown_tx: oneshot::Sender<()>, handle: JoinHandle<()>) -> bool {
    if shutdown_tx.send(()).is_err() {
        tracing::debug!("Sampler already gone before shutdown signal");
    }
    match handle.await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, "sampler worker ended abnormally");
            false
        }
    }
}

async fn run(sampler: Arc<Sampler>, config: WorkerConfig, mut shutdown_rx: oneshot::Receiver<()>) {
    sampler.prime().await;
    tokio::select! {
        _ = tokio::time::sleep(config.warmup) => {}
        _ = &mut shutdown_rx => {
            tracing::debug!("Sampler shut down during warm-up");
            return;
        }
    }

    let mut tick = interval(config.sample_interval);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut stats_log_tick = interval_at(
        Instant::now() + config.stats_log_interval,
        config.stats_log_interval,
    );
    stats_log_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut ticks: u64 = 0;
    loop {
        tokio::select! {
            _ = tick.tick() => {
                let history_len = sampler.sample_once().await;
                ticks += 1;
                tracing::debug!(operation = "sample", history_len, "Snapshot appended");
            }
            _ = stats_log_tick.tick() => {
                tracing::info!(
                    ticks,
                    history_len = sampler.history().len(),
                    history_capacity = sampler.history().capacity(),
                    "sampler stats"
                );
            }
            _ = &mut shutdown_rx => {
                tracing::debug!("Sampler shutting down");
                break;
            }
        }
    }
}
