// Operator authentication gate. Handlers behind it assume the check passed.

use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::models::ActionOutcome;

pub trait AuthGate: Send + Sync {
    fn is_authenticated(&self, headers: &HeaderMap) -> bool;
}

/// Dev mode: everyone is the operator.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenGate;

impl AuthGate for OpenGate {
    fn is_authenticated(&self, _headers: &HeaderMap) -> bool {
        true
    }
}

/// Accepts `Authorization: Bearer <token>` with the configured token.
/// Surrounding whitespace is ignored on both sides.
pub struct TokenGate {
    token: String,
}

impl TokenGate {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into().trim().to_string(),
        }
    }
}

impl AuthGate for TokenGate {
    fn is_authenticated(&self, headers: &HeaderMap) -> bool {
        !self.token.is_empty()
            && headers
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .is_some_and(|presented| presented.trim() == self.token)
    }
}

/// Middleware for `route_layer(from_fn_with_state(gate, require_auth))`.
pub async fn require_auth(
    State(gate): State<Arc<dyn AuthGate>>,
    request: Request,
    next: Next,
) -> Response {
    if gate.is_authenticated(request.headers()) {
        next.run(request).await
    } else {
        tracing::debug!(path = %request.uri().path(), "rejected unauthenticated request");
        (
            StatusCode::UNAUTHORIZED,
            Json(ActionOutcome::invalid("Unauthorized")),
        )
            .into_response()
    }
}
