// ActionGateway tests: systemctl invocations and outcomes

mod common;

use boxadmin::actions::{ActionGateway, DryRunGateway, SystemdGateway};
use boxadmin::command::CommandRunner;
use boxadmin::models::FailureKind;
use common::ScriptedRunner;
use std::sync::Arc;
use std::time::Duration;

fn gateway(runner: &Arc<ScriptedRunner>) -> SystemdGateway {
    let runner: Arc<dyn CommandRunner> = runner.clone();
    SystemdGateway::new(runner, Duration::from_secs(30))
}

#[tokio::test]
async fn test_poweroff_and_reboot_are_detached() {
    let runner = Arc::new(ScriptedRunner::new());
    let gw = gateway(&runner);

    let outcome = gw.poweroff().await;
    assert!(outcome.is_ok());
    assert_eq!(outcome.message, "Shutting down...");

    let outcome = gw.reboot().await;
    assert_eq!(outcome.message, "Rebooting...");

    assert_eq!(
        runner.detached(),
        vec!["systemctl poweroff", "systemctl reboot"]
    );
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn test_poweroff_spawn_failure() {
    let runner = Arc::new(ScriptedRunner::failing_detached());
    let outcome = gateway(&runner).poweroff().await;
    assert_eq!(outcome.failure, Some(FailureKind::Upstream));
    assert!(outcome.message.contains("systemctl"));
}

#[tokio::test]
async fn test_restart_success() {
    let runner = Arc::new(ScriptedRunner::new().ok("systemctl restart lnbits.service", ""));
    let outcome = gateway(&runner).restart("lnbits").await;
    assert!(outcome.is_ok());
    assert_eq!(outcome.message, "lnbits restarted");
}

#[tokio::test]
async fn test_restart_failure_carries_diagnostic() {
    let runner = Arc::new(ScriptedRunner::new().fail(
        "systemctl restart lnbits.service",
        "",
        "Job for lnbits.service failed because the control process exited with error code.\n",
    ));
    let outcome = gateway(&runner).restart("lnbits").await;
    assert_eq!(outcome.failure, Some(FailureKind::Upstream));
    assert!(outcome.message.starts_with("Job for lnbits.service failed"));
}

#[tokio::test]
async fn test_restart_failure_without_output() {
    let runner = Arc::new(ScriptedRunner::new());
    let outcome = gateway(&runner).restart("spark-sidecar").await;
    assert_eq!(outcome.message, "Failed to restart spark-sidecar");
}

#[tokio::test]
async fn test_restart_timeout() {
    let runner = Arc::new(ScriptedRunner::new().timeout("systemctl restart lnbits.service"));
    let outcome = gateway(&runner).restart("lnbits").await;
    assert_eq!(outcome.message, "systemctl timed out after 30s");
}

#[tokio::test]
async fn test_dry_run_gateway() {
    let gw = DryRunGateway;
    assert_eq!(gw.poweroff().await.message, "DEV MODE: would shutdown");
    assert_eq!(gw.reboot().await.message, "DEV MODE: would reboot");
    let outcome = gw.restart("lnbits").await;
    assert!(outcome.is_ok());
    assert_eq!(outcome.message, "DEV MODE: would restart lnbits");
}
