// Shared test helpers
#![allow(dead_code)]

use async_trait::async_trait;
use boxadmin::command::{CommandOutput, CommandRunner};
use boxadmin::error::CommandError;
use boxadmin::history_repo::HistoryRepo;
use boxadmin::models::*;
use boxadmin::sampler::{Sampler, SamplerDeps};
use boxadmin::service_repo::ServiceRepo;
use boxadmin::sysinfo_repo::HostProbe;
use chrono::{Local, TimeZone};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TEST_CONFIG: &str = r#"
[server]
port = 8081
host = "127.0.0.1"

[auth]
token = "s3cret"

[services]
allowed = ["lnbits", "spark-sidecar"]

[wifi]
backend = "nmcli"
settle_delay_ms = 0
"#;

/// Canned reply for one command line.
#[derive(Debug, Clone)]
pub enum Reply {
    Output(CommandOutput),
    Timeout,
}

/// CommandRunner that answers from a script keyed by the full command line
/// (`program arg1 arg2 ...`) and records every call in order.
/// Unscripted commands exit non-zero with an empty output.
#[derive(Default)]
pub struct ScriptedRunner {
    replies: Mutex<HashMap<String, Reply>>,
    calls: Mutex<Vec<String>>,
    detached: Mutex<Vec<String>>,
    fail_detached: bool,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runner whose `spawn_detached` always fails to start the program.
    pub fn failing_detached() -> Self {
        Self {
            fail_detached: true,
            ..Self::default()
        }
    }

    pub fn ok(self, command: &str, stdout: &str) -> Self {
        self.reply(command, Reply::Output(CommandOutput::ok(stdout)))
    }

    pub fn fail(self, command: &str, stdout: &str, stderr: &str) -> Self {
        self.reply(command, Reply::Output(CommandOutput::failed(stdout, stderr)))
    }

    pub fn timeout(self, command: &str) -> Self {
        self.reply(command, Reply::Timeout)
    }

    pub fn reply(self, command: &str, reply: Reply) -> Self {
        self.replies.lock().unwrap().insert(command.to_string(), reply);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn detached(&self) -> Vec<String> {
        self.detached.lock().unwrap().clone()
    }

    fn key(program: &str, args: &[&str]) -> String {
        std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<CommandOutput, CommandError> {
        let key = Self::key(program, args);
        self.calls.lock().unwrap().push(key.clone());
        let reply = self.replies.lock().unwrap().get(&key).cloned();
        match reply {
            Some(Reply::Output(out)) => Ok(out),
            Some(Reply::Timeout) => Err(CommandError::Timeout {
                program: program.to_string(),
                secs: timeout.as_secs(),
            }),
            None => Ok(CommandOutput::failed("", "")),
        }
    }

    fn spawn_detached(&self, program: &str, args: &[&str]) -> Result<(), CommandError> {
        let key = Self::key(program, args);
        if self.fail_detached {
            return Err(CommandError::Spawn {
                program: program.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            });
        }
        self.detached.lock().unwrap().push(key);
        Ok(())
    }
}

/// HostProbe with fixed readings.
pub struct FakeProbe;

#[async_trait]
impl HostProbe for FakeProbe {
    async fn cpu_percent(&self) -> anyhow::Result<f64> {
        Ok(12.5)
    }

    async fn memory(&self) -> anyhow::Result<UsageStats> {
        Ok(UsageStats::from_used_total(2 * GIB, 4 * GIB))
    }

    async fn disk(&self) -> anyhow::Result<UsageStats> {
        Ok(UsageStats::from_used_total(16 * GIB, 64 * GIB))
    }

    async fn cpu_temp(&self) -> anyhow::Result<Option<f64>> {
        Ok(Some(48.3))
    }

    async fn uptime(&self) -> anyhow::Result<Uptime> {
        Ok(Uptime::from_secs(93_784.0))
    }
}

pub const GIB: u64 = 1024 * 1024 * 1024;

/// HostProbe where every domain errors.
pub struct FailingProbe;

#[async_trait]
impl HostProbe for FailingProbe {
    async fn cpu_percent(&self) -> anyhow::Result<f64> {
        anyhow::bail!("no cpu counters")
    }

    async fn memory(&self) -> anyhow::Result<UsageStats> {
        anyhow::bail!("no meminfo")
    }

    async fn disk(&self) -> anyhow::Result<UsageStats> {
        anyhow::bail!("no disk")
    }

    async fn cpu_temp(&self) -> anyhow::Result<Option<f64>> {
        anyhow::bail!("no sensor")
    }

    async fn uptime(&self) -> anyhow::Result<Uptime> {
        anyhow::bail!("no uptime")
    }
}

/// HostProbe whose CPU read never finishes; the rest answer like FakeProbe.
pub struct StuckCpuProbe;

#[async_trait]
impl HostProbe for StuckCpuProbe {
    async fn cpu_percent(&self) -> anyhow::Result<f64> {
        std::future::pending().await
    }

    async fn memory(&self) -> anyhow::Result<UsageStats> {
        FakeProbe.memory().await
    }

    async fn disk(&self) -> anyhow::Result<UsageStats> {
        FakeProbe.disk().await
    }

    async fn cpu_temp(&self) -> anyhow::Result<Option<f64>> {
        FakeProbe.cpu_temp().await
    }

    async fn uptime(&self) -> anyhow::Result<Uptime> {
        FakeProbe.uptime().await
    }
}

/// Runner answering `systemctl is-active` for lnbits (active) and spark-sidecar (failed).
pub fn systemctl_runner() -> ScriptedRunner {
    ScriptedRunner::new()
        .ok("systemctl is-active lnbits.service", "active\n")
        .fail("systemctl is-active spark-sidecar.service", "failed\n", "")
}

pub fn test_sampler(
    host: Arc<dyn HostProbe>,
    runner: Arc<dyn CommandRunner>,
    capacity: usize,
    source_timeout: Duration,
) -> Arc<Sampler> {
    Arc::new(Sampler::new(
        SamplerDeps {
            host,
            services: Arc::new(ServiceRepo::new(
                runner,
                vec!["lnbits".into(), "spark-sidecar".into()],
                Duration::from_secs(1),
            )),
            balance: None,
            history: Arc::new(HistoryRepo::new(capacity)),
        },
        source_timeout,
    ))
}

/// Snapshot at `secs` past a fixed local epoch with the given CPU reading.
pub fn snapshot_at(secs: i64, cpu_percent: f64) -> Snapshot {
    let base = Local
        .timestamp_opt(1_700_000_000, 0)
        .single()
        .unwrap_or_else(Local::now);
    Snapshot {
        timestamp: base + chrono::Duration::seconds(secs),
        cpu_percent,
        memory: UsageStats::from_used_total(GIB, 4 * GIB),
        disk: UsageStats::from_used_total(GIB, 8 * GIB),
        cpu_temp: Some(40.0),
        uptime: Uptime::from_secs(60.0),
        service_states: BTreeMap::from([("lnbits".to_string(), ServiceState::Active)]),
        remote_balance: None,
    }
}
