use axum::response::Json;
use serde_json::{json, Value};

/// Liveness probe. Independent of any module state.
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "OK" }))
}
