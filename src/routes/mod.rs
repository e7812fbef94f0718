// HTTP routes. Everything under /box/api sits behind the auth gate.

mod http;
mod power;
mod wifi;

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::actions::ActionGateway;
use crate::auth::{AuthGate, require_auth};
use crate::config::{AppConfig, ServicesConfig};
use crate::models::{ActionOutcome, FailureKind};
use crate::network::NetworkAdapter;
use crate::sampler::Sampler;

pub const API_PREFIX: &str = "/box/api";

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) sampler: Arc<Sampler>,
    pub(crate) network: Arc<NetworkAdapter>,
    pub(crate) actions: Arc<dyn ActionGateway>,
    pub(crate) services: Arc<ServicesConfig>,
}

/// Core components the router hands requests to.
pub struct AppDeps {
    pub sampler: Arc<Sampler>,
    pub network: Arc<NetworkAdapter>,
    pub actions: Arc<dyn ActionGateway>,
    pub auth: Arc<dyn AuthGate>,
}

pub fn app(deps: AppDeps, config: &AppConfig) -> Router {
    let state = AppState {
        sampler: deps.sampler,
        network: deps.network,
        actions: deps.actions,
        services: Arc::new(config.services.clone()),
    };

    let api = Router::new()
        .route("/stats", get(http::stats_handler)) // GET /box/api/stats
        .route("/shutdown", post(power::shutdown_handler)) // POST /box/api/shutdown
        .route("/reboot", post(power::reboot_handler)) // POST /box/api/reboot
        .route("/restart/{service}", post(power::restart_handler)) // POST /box/api/restart/{service}
        .route("/wifi/scan", get(wifi::scan_handler)) // GET /box/api/wifi/scan
        .route("/wifi/connect", post(wifi::connect_handler)) // POST /box/api/wifi/connect
        .route("/wifi/status", get(wifi::status_handler)) // GET /box/api/wifi/status
        .route_layer(middleware::from_fn_with_state(deps.auth, require_auth));

    Router::new()
        .route("/", get(|| async { "boxadmin" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .nest(API_PREFIX, api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}

/// 200 on success, 400 for rejected input, 500 when the system side failed.
pub(crate) fn outcome_response(outcome: ActionOutcome) -> Response {
    let status = match outcome.failure {
        None => StatusCode::OK,
        Some(FailureKind::InvalidInput) => StatusCode::BAD_REQUEST,
        Some(FailureKind::Upstream) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(outcome)).into_response()
}
