// Wifi handlers: scan, connect, status

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::Response,
};

use super::{AppState, outcome_response};
use crate::models::{ActionOutcome, ConnectRequest, ConnectionState, ScanResult};

pub(super) async fn scan_handler(State(state): State<AppState>) -> Json<ScanResult> {
    Json(state.network.scan().await)
}

/// A body that is not a `ConnectRequest` gets the same error shape as any
/// other rejected input.
pub(super) async fn connect_handler(
    State(state): State<AppState>,
    payload: Result<Json<ConnectRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "malformed wifi connect body");
            return outcome_response(ActionOutcome::invalid(rejection.body_text()));
        }
    };
    let outcome = state
        .network
        .connect(&request.ssid, request.password.as_deref())
        .await;
    outcome_response(outcome)
}

pub(super) async fn status_handler(State(state): State<AppState>) -> Json<ConnectionState> {
    Json(state.network.status().await)
}
