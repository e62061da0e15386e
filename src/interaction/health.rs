//! Liveness endpoint.

use axum::Json;
use serde_json::{Value, json};

/// `GET /health`.
///
/// Independent of the provider; always reports healthy once the server is up.
pub async fn handle_health() -> Json<Value> {
    Json(json!({ "ok": true }))
}
