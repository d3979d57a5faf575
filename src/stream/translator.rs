//! Stateful translators from upstream stream shapes to canonical parts.
//!
//! One translator instance exists per request and is dropped with it;
//! nothing here is shared across requests. Parts are appended to the
//! caller's buffer in upstream arrival order and never reordered.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{trace, warn};

use crate::protocol::agent::AgentEvent;
use crate::protocol::completion::{ChunkToolCall, CompletionChunk};
use crate::protocol::datastream::{FinishReason, StreamPart, Usage};
use crate::protocol::mapping::{agent_stop_to_canonical, completion_finish_to_canonical};
use crate::stream::drafts::ToolCallDrafts;
use crate::tools::ToolRegistry;
use crate::util::{next_call_id, next_step_id};

/// Stateful upstream-to-canonical translation.
pub trait Translate {
    type Event;

    /// Re-encode one upstream unit into zero or more stream parts.
    fn consume(&mut self, event: Self::Event, out: &mut Vec<StreamPart>);

    /// Emit the terminal record for an upstream failure mid-stream.
    fn abort(&mut self, out: &mut Vec<StreamPart>);
}

// ---------------------------------------------------------------------------
// Completion-stream translator
// ---------------------------------------------------------------------------

/// Translates raw chat-completions chunks.
///
/// Text deltas pass through immediately. Tool-call fragments accumulate in
/// drafts; the `tool_calls` terminal signal finalizes them, invokes the
/// matching local tools and emits their results. The empty-choices usage
/// chunk closes the response.
pub struct CompletionTranslator {
    tools: Arc<ToolRegistry>,
    drafts: ToolCallDrafts,
    tool_calls_seen: bool,
    finish_hint: Option<FinishReason>,
    finished: bool,
}

impl CompletionTranslator {
    #[must_use]
    pub fn new(tools: Arc<ToolRegistry>) -> Self {
        Self {
            tools,
            drafts: ToolCallDrafts::new(),
            tool_calls_seen: false,
            finish_hint: None,
            finished: false,
        }
    }

    fn observe_tool_call(&mut self, call: ChunkToolCall) {
        let (name, arguments) = match call.function {
            Some(function) => (function.name, function.arguments),
            None => (None, None),
        };
        if let Some(id) = call.id {
            self.drafts.open(call.index, Some(id), name.unwrap_or_default());
        }
        if let Some(fragment) = arguments {
            if !fragment.is_empty() && !self.drafts.append(Some(call.index), &fragment) {
                warn!(
                    index = call.index,
                    "dropping tool-call fragment with no open draft"
                );
            }
        }
    }

    /// Finalize every draft in announcement order: announce each call,
    /// then invoke each and emit its result. A handler failure becomes an
    /// error-carrying result record; it never aborts the stream.
    fn execute_tool_calls(&mut self, out: &mut Vec<StreamPart>) {
        if self.drafts.is_empty() {
            return;
        }
        self.tool_calls_seen = true;

        let mut ready = Vec::new();
        for finalized in self.drafts.finalize_all() {
            match finalized {
                Ok(call) => {
                    out.push(StreamPart::ToolCall {
                        id: call.id.clone(),
                        name: call.name.clone(),
                        args: call.args.clone(),
                    });
                    ready.push(call);
                }
                Err(err) => {
                    warn!(error = %err, "skipping tool call with malformed arguments");
                }
            }
        }
        for call in ready {
            let result = match self.tools.invoke(&call.name, &call.args) {
                Ok(value) => value,
                Err(err) => {
                    warn!(tool = call.name.as_str(), error = %err, "tool invocation failed");
                    json!({ "error": err.to_string() })
                }
            };
            out.push(StreamPart::ToolCallResult {
                id: call.id,
                name: Some(call.name),
                args: Some(call.args),
                result,
            });
        }
    }

    fn emit_finish(&mut self, usage: Usage, out: &mut Vec<StreamPart>) {
        if self.finished {
            return;
        }
        self.finished = true;
        let reason = if self.tool_calls_seen {
            FinishReason::ToolCalls
        } else {
            self.finish_hint.unwrap_or(FinishReason::Stop)
        };
        out.push(StreamPart::Finish { reason, usage });
    }
}

impl Translate for CompletionTranslator {
    type Event = CompletionChunk;

    fn consume(&mut self, chunk: CompletionChunk, out: &mut Vec<StreamPart>) {
        let had_choices = !chunk.choices.is_empty();
        for choice in chunk.choices {
            match choice.finish_reason.as_deref() {
                Some("tool_calls") => self.execute_tool_calls(out),
                Some(reason) => {
                    self.finish_hint = Some(completion_finish_to_canonical(reason));
                }
                None => {
                    let delta = choice.delta;
                    if let Some(calls) = delta.tool_calls {
                        for call in calls {
                            self.observe_tool_call(call);
                        }
                    } else if let Some(text) = delta.content {
                        if !text.is_empty() {
                            out.push(StreamPart::TextDelta(text));
                        }
                    }
                }
            }
        }

        // the terminal chunk carries usage totals and no choices
        if !had_choices {
            if let Some(usage) = chunk.usage {
                self.emit_finish(
                    Usage {
                        prompt_tokens: usage.prompt_tokens,
                        completion_tokens: usage.completion_tokens,
                    },
                    out,
                );
            }
        }
    }

    fn abort(&mut self, out: &mut Vec<StreamPart>) {
        if self.finished {
            return;
        }
        self.finished = true;
        out.push(StreamPart::Finish {
            reason: FinishReason::Other,
            usage: Usage::default(),
        });
    }
}

// ---------------------------------------------------------------------------
// Agent-event translator
// ---------------------------------------------------------------------------

/// Per-step usage placeholder; the agent runtime reports no per-step token
/// accounting.
const AGENT_STEP_USAGE: Usage = Usage {
    prompt_tokens: 100,
    completion_tokens: 100,
};

/// Translates agent runtime lifecycle events.
///
/// The runtime executes tools itself and reports their results, so this
/// translator only observes and re-encodes. A single upstream event can
/// carry several signals at once; every field is checked independently.
#[derive(Default)]
pub struct AgentTranslator {
    previous_tool_use_id: Option<String>,
}

impl AgentTranslator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Translate for AgentTranslator {
    type Event = AgentEvent;

    fn consume(&mut self, event: AgentEvent, out: &mut Vec<StreamPart>) {
        if let Some(text) = event.data {
            if !text.is_empty() {
                out.push(StreamPart::TextDelta(text));
            }
        }

        if let Some(reasoning) = event.reasoning_text {
            if !reasoning.is_empty() {
                trace!(chars = reasoning.len(), "reasoning delta observed");
            }
        }

        if let Some(tool_use) = event.current_tool_use {
            if let Some(name) = tool_use.name.filter(|name| !name.is_empty()) {
                let id = match tool_use.tool_use_id {
                    Some(id) => id,
                    // keep correlating with the call already in flight
                    None => self
                        .previous_tool_use_id
                        .clone()
                        .unwrap_or_else(next_call_id),
                };
                if self.previous_tool_use_id.as_deref() != Some(id.as_str()) {
                    self.previous_tool_use_id = Some(id.clone());
                    out.push(StreamPart::ToolCallStart {
                        id: id.clone(),
                        name,
                    });
                }
                let input = event
                    .delta
                    .as_ref()
                    .and_then(|delta| delta.tool_use.as_ref())
                    .and_then(|tool_use| tool_use.input.as_deref());
                if let Some(input) = input {
                    if !input.is_empty() {
                        out.push(StreamPart::ToolCallArgsDelta {
                            id,
                            delta: input.to_string(),
                        });
                    }
                }
            }
        }

        if let Some(message) = event.message {
            if message.role == "user" {
                for block in message.content {
                    if let Some(result) = block.tool_result {
                        let text = result.first_text().to_string();
                        let id = result.tool_use_id.unwrap_or_else(next_call_id);
                        out.push(StreamPart::ToolCallResult {
                            id,
                            name: None,
                            args: None,
                            result: Value::String(text),
                        });
                    }
                }
            }
        }

        if let Some(lifecycle) = event.event {
            if lifecycle.message_start.is_some() {
                out.push(StreamPart::StepStart { id: next_step_id() });
            }
            if let Some(stop) = lifecycle.message_stop {
                let reason = stop
                    .stop_reason
                    .as_deref()
                    .map_or(FinishReason::Stop, agent_stop_to_canonical);
                out.push(StreamPart::StepFinish {
                    reason,
                    usage: AGENT_STEP_USAGE,
                });
            }
        }
    }

    fn abort(&mut self, out: &mut Vec<StreamPart>) {
        out.push(StreamPart::StepFinish {
            reason: FinishReason::Other,
            usage: Usage::default(),
        });
    }
}
