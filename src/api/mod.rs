pub mod chat;
pub mod health;
pub(crate) mod streaming;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the application router.
#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/chat", post(chat::chat_handler))
        .route("/health", get(health::health_handler))
        .with_state(state)
}
