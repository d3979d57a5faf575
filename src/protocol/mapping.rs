use super::datastream::FinishReason;
use tracing::debug;

// ---------------------------------------------------------------------------
// Finish reason mappings
// ---------------------------------------------------------------------------

/// Map an `OpenAI`-style `finish_reason` onto the canonical set.
///
/// Unmapped vocabulary falls through to `Other`; the fallback is logged so
/// a new upstream value is visible rather than silently swallowed.
#[must_use]
pub fn completion_finish_to_canonical(s: &str) -> FinishReason {
    match s {
        "stop" => FinishReason::Stop,
        "tool_calls" => FinishReason::ToolCalls,
        other => {
            debug!(reason = other, "unmapped completion finish reason, using 'other'");
            FinishReason::Other
        }
    }
}

/// Map an agent runtime `stopReason` onto the canonical set.
///
/// The runtime speaks the Bedrock vocabulary (`end_turn`, `tool_use`).
#[must_use]
pub fn agent_stop_to_canonical(s: &str) -> FinishReason {
    match s {
        "end_turn" => FinishReason::Stop,
        "tool_use" => FinishReason::ToolCalls,
        other => {
            debug!(reason = other, "unmapped agent stop reason, using 'other'");
            FinishReason::Other
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_finish_mapping() {
        assert_eq!(completion_finish_to_canonical("stop"), FinishReason::Stop);
        assert_eq!(
            completion_finish_to_canonical("tool_calls"),
            FinishReason::ToolCalls
        );
        assert_eq!(
            completion_finish_to_canonical("content_filter"),
            FinishReason::Other
        );
        assert_eq!(completion_finish_to_canonical("length"), FinishReason::Other);
    }

    #[test]
    fn test_agent_stop_mapping() {
        assert_eq!(agent_stop_to_canonical("end_turn"), FinishReason::Stop);
        assert_eq!(agent_stop_to_canonical("tool_use"), FinishReason::ToolCalls);
        assert_eq!(agent_stop_to_canonical("max_tokens"), FinishReason::Other);
        assert_eq!(agent_stop_to_canonical(""), FinishReason::Other);
    }
}
