//! Handler for `GET /health`.

use axum::Json;
use serde_json::{Value, json};

/// `GET /health` — liveness only; does not touch the store.
pub async fn handler() -> Json<Value> { Json(json!({ "status": "ok" })) }
