use anyhow::Result;
use boxadmin::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

use boxadmin::actions::{ActionGateway, DryRunGateway, SystemdGateway};
use boxadmin::auth::{AuthGate, OpenGate, TokenGate};
use boxadmin::balance_repo::{BalanceSource, SparkBalanceRepo};
use boxadmin::command::{CommandRunner, SystemRunner};

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;
    let dev_mode = app_config.server.dev_mode;
    if dev_mode {
        tracing::warn!("dev mode: canned wifi data, dry-run actions, authentication disabled");
    }

    let runner: Arc<dyn CommandRunner> = Arc::new(SystemRunner);

    let balance: Option<Arc<dyn BalanceSource>> = match &app_config.balance.url {
        Some(url) => Some(Arc::new(SparkBalanceRepo::new(
            url,
            app_config.balance.timeout(),
        )?)),
        None => None,
    };
    let sampler = Arc::new(sampler::Sampler::new(
        sampler::SamplerDeps {
            host: Arc::new(sysinfo_repo::SysinfoRepo::new()),
            services: Arc::new(service_repo::ServiceRepo::new(
                runner.clone(),
                app_config.services.allowed.clone(),
                app_config.services.status_timeout(),
            )),
            balance,
            history: Arc::new(history_repo::HistoryRepo::new(
                app_config.sampler.history_size,
            )),
        },
        app_config.sampler.source_timeout(),
    ));

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let worker_handle = worker::spawn(
        sampler.clone(),
        app_config.sampler.worker_config(),
        shutdown_rx,
    );

    let network = Arc::new(network::NetworkAdapter::from_config(
        &app_config.wifi,
        dev_mode,
        runner.clone(),
    ));
    let actions: Arc<dyn ActionGateway> = if dev_mode {
        Arc::new(DryRunGateway)
    } else {
        Arc::new(SystemdGateway::new(
            runner.clone(),
            app_config.services.restart_timeout(),
        ))
    };
    let auth: Arc<dyn AuthGate> = match app_config.auth.token.as_deref() {
        Some(token) if !dev_mode => Arc::new(TokenGate::new(token)),
        _ => Arc::new(OpenGate),
    };

    let app = routes::app(
        routes::AppDeps {
            sampler,
            network: network.clone(),
            actions,
            auth,
        },
        &app_config,
    );
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        wifi_backend = network.backend_name(),
        "Listening on http://{}",
        addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Received shutdown signal");
    worker::stop(shutdown_tx, worker_handle).await;

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
