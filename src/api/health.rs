use std::sync::Arc;

use axum::extract::State;
use axum::response::Json;
use serde_json::{json, Value};

use crate::state::AppState;

/// Health check handler.
/// Returns JSON with status and config summary.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    let config = &state.config;
    Json(json!({
        "status": "chatrelay is running",
        "config": {
            "integration": config.upstream.integration.to_string(),
            "model": config.upstream.model,
            "tools_count": state.tools.len(),
            "features": {
                "log_level": config.features.log_level,
            }
        }
    }))
}
