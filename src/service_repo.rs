// Named systemd unit states via `systemctl is-active`

use crate::command::CommandRunner;
use crate::models::ServiceState;
use futures_util::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

pub struct ServiceRepo {
    runner: Arc<dyn CommandRunner>,
    names: Vec<String>,
    timeout: Duration,
}

impl ServiceRepo {
    pub fn new(runner: Arc<dyn CommandRunner>, names: Vec<String>, timeout: Duration) -> Self {
        Self {
            runner,
            names,
            timeout,
        }
    }

    /// `is-active` exits non-zero for inactive units, so stdout is read regardless of status.
    pub async fn state(&self, name: &str) -> ServiceState {
        let unit = format!("{name}.service");
        match self
            .runner
            .run("systemctl", &["is-active", unit.as_str()], self.timeout)
            .await
        {
            Ok(out) => ServiceState::from_systemctl(&out.stdout),
            Err(e) => {
                warn!(error = %e, operation = "service_state", service = name, "service status unavailable");
                ServiceState::Unknown
            }
        }
    }

    /// State of every configured unit, queried concurrently.
    pub async fn states(&self) -> BTreeMap<String, ServiceState> {
        let states = join_all(self.names.iter().map(|name| self.state(name))).await;
        self.names.iter().cloned().zip(states).collect()
    }
}
