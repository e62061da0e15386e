//! HTTP interactions for support-copilot.
//!
//! This module wires the request handlers into an axum router:
//! - `GET /health` for liveness
//! - `POST /triage` for single-shot ticket triage
//!
//! It also maps [`TriageError`] onto HTTP status codes.

pub mod health;
pub mod triage;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::{base::error::TriageError, runtime::Runtime};

/// Build the application router.
pub fn router(runtime: Runtime) -> Router {
    Router::new()
        .route("/health", get(health::handle_health))
        .route("/triage", post(triage::handle_triage))
        .layer(TraceLayer::new_for_http())
        .with_state(runtime)
}

impl IntoResponse for TriageError {
    fn into_response(self) -> Response {
        let status = match &self {
            TriageError::InvalidTicket(_) | TriageError::InvalidModelOutput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            TriageError::MalformedModelOutput(_) | TriageError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!("Triage failed: {self}");
        } else {
            warn!("Triage rejected: {self}");
        }

        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
