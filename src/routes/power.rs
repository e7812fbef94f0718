// POST handlers: shutdown, reboot, restart/{service}

use axum::{
    extract::{Path, State},
    response::Response,
};

use super::{AppState, outcome_response};
use crate::models::ActionOutcome;

pub(super) async fn shutdown_handler(State(state): State<AppState>) -> Response {
    tracing::info!("shutdown requested");
    outcome_response(state.actions.poweroff().await)
}

pub(super) async fn reboot_handler(State(state): State<AppState>) -> Response {
    tracing::info!("reboot requested");
    outcome_response(state.actions.reboot().await)
}

/// Only units from services.allowed reach the gateway.
pub(super) async fn restart_handler(
    State(state): State<AppState>,
    Path(service): Path<String>,
) -> Response {
    if !state.services.is_allowed(&service) {
        tracing::warn!(service = %service, "restart of unlisted service rejected");
        return outcome_response(ActionOutcome::invalid("Invalid service"));
    }
    tracing::info!(service = %service, "restart requested");
    outcome_response(state.actions.restart(&service).await)
}
