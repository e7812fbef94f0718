// Power and service actions through systemctl. Unit names arrive already
// checked against the allow-list by the HTTP layer.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::command::CommandRunner;
use crate::models::ActionOutcome;

#[async_trait]
pub trait ActionGateway: Send + Sync {
    /// Fire-and-forget.
    async fn poweroff(&self) -> ActionOutcome;
    /// Fire-and-forget.
    async fn reboot(&self) -> ActionOutcome;
    /// Waits for systemctl up to the restart timeout.
    async fn restart(&self, unit: &str) -> ActionOutcome;
}

pub struct SystemdGateway {
    runner: Arc<dyn CommandRunner>,
    restart_timeout: Duration,
}

impl SystemdGateway {
    pub fn new(runner: Arc<dyn CommandRunner>, restart_timeout: Duration) -> Self {
        Self {
            runner,
            restart_timeout,
        }
    }

    fn detach(&self, verb: &str, message: &str) -> ActionOutcome {
        match self.runner.spawn_detached("systemctl", &[verb]) {
            Ok(()) => {
                info!(action = verb, "system action issued");
                ActionOutcome::ok(message)
            }
            Err(e) => {
                warn!(error = %e, action = verb, "system action failed");
                ActionOutcome::failed(e.to_string())
            }
        }
    }
}

#[async_trait]
impl ActionGateway for SystemdGateway {
    async fn poweroff(&self) -> ActionOutcome {
        self.detach("poweroff", "Shutting down...")
    }

    async fn reboot(&self) -> ActionOutcome {
        self.detach("reboot", "Rebooting...")
    }

    async fn restart(&self, unit: &str) -> ActionOutcome {
        let service = format!("{unit}.service");
        match self
            .runner
            .run("systemctl", &["restart", service.as_str()], self.restart_timeout)
            .await
        {
            Ok(out) if out.success => {
                info!(unit, "service restarted");
                ActionOutcome::ok(format!("{unit} restarted"))
            }
            Ok(out) => {
                let message = out
                    .diagnostic()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Failed to restart {unit}"));
                warn!(unit, detail = %message, "service restart failed");
                ActionOutcome::failed(message)
            }
            Err(e) => {
                warn!(error = %e, unit, "service restart failed");
                ActionOutcome::failed(e.to_string())
            }
        }
    }
}

/// Dev-mode gateway: reports what it would do and runs nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunGateway;

#[async_trait]
impl ActionGateway for DryRunGateway {
    async fn poweroff(&self) -> ActionOutcome {
        ActionOutcome::ok("DEV MODE: would shutdown")
    }

    async fn reboot(&self) -> ActionOutcome {
        ActionOutcome::ok("DEV MODE: would reboot")
    }

    async fn restart(&self, unit: &str) -> ActionOutcome {
        ActionOutcome::ok(format!("DEV MODE: would restart {unit}"))
    }
}
