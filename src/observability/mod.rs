use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::protocol::datastream::{FinishReason, Usage};

/// Initialize the tracing subscriber with the configured log level.
///
/// Maps config log levels to tracing levels:
/// - "DISABLED" -> no subscriber installed
/// - "WARNING" -> WARN
/// - "CRITICAL" -> ERROR
/// - Others map directly (DEBUG, INFO, ERROR)
pub fn init_tracing(log_level: &str) {
    let level = log_level.to_uppercase();

    if level == "DISABLED" {
        return;
    }

    let tracing_level = match level.as_str() {
        "WARNING" => "WARN",
        "CRITICAL" => "ERROR",
        other => other,
    };

    let filter = EnvFilter::try_new(tracing_level).unwrap_or_else(|_| EnvFilter::new("INFO"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// Log a completed response stream at INFO level.
///
/// Usage is whatever the final finish record carried; the agent path
/// reports placeholders rather than real totals.
pub fn log_stream_complete(
    model: &str,
    reason: Option<FinishReason>,
    usage: Option<Usage>,
    start_time: std::time::Instant,
) {
    let usage = usage.unwrap_or_default();
    info!(
        model = model,
        finish_reason = reason.map_or("none", FinishReason::as_str),
        prompt_tokens = usage.prompt_tokens,
        completion_tokens = usage.completion_tokens,
        duration_seconds = start_time.elapsed().as_secs_f64(),
        "stream completed"
    );
}
