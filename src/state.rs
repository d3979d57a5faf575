use std::sync::Arc;

use crate::config::AppConfig;
use crate::tools::ToolRegistry;
use crate::transport::HttpTransport;

/// Shared application state.
///
/// Everything here is immutable after startup, so concurrent requests
/// need no locking.
pub struct AppState {
    pub config: AppConfig,
    pub transport: HttpTransport,
    pub tools: Arc<ToolRegistry>,
}

impl AppState {
    #[must_use]
    pub fn new(config: AppConfig, transport: HttpTransport, tools: Arc<ToolRegistry>) -> Self {
        Self {
            config,
            transport,
            tools,
        }
    }
}
