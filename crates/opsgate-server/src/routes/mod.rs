pub mod requests;

use axum::Json;

/// GET /api/health — liveness probe, no auth.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}
