// GET handlers: version, stats

use axum::{Json, extract::State, response::IntoResponse};

use super::AppState;
use crate::models::{HistorySeries, StatsResponse};
use crate::version::{NAME, VERSION};

/// GET /version: service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /box/api/stats: a fresh snapshot plus chart series from the history buffer.
/// Never fails; unavailable metrics show up as sentinels.
pub(super) async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let current = state.sampler.collect_now().await;
    let history = state.sampler.read_history();
    Json(StatsResponse {
        current,
        history: HistorySeries::from_snapshots(&history),
    })
}
