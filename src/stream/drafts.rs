//! Tool-call draft tracking.
//!
//! A completion upstream announces a call's id and name once, then streams
//! argument text in fragments tagged only by stream index. Drafts
//! accumulate those fragments until the terminal signal, at which point
//! they are finalized in announcement order.

use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::util::next_call_id;

/// Error raised when a draft cannot be finalized.
#[derive(Debug, thiserror::Error)]
pub enum DraftError {
    #[error("tool call '{id}' ({name}) arguments are not valid JSON: {source}")]
    MalformedArguments {
        id: String,
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// In-progress reconstruction of one streamed tool call.
#[derive(Debug, Clone)]
struct ToolCallDraft {
    id: String,
    name: String,
    arguments: String,
}

/// A draft whose concatenated arguments parsed successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalizedToolCall {
    pub id: String,
    pub name: String,
    pub args: Value,
}

/// Accumulator for the tool calls of a single response.
///
/// Never reused across requests; one instance lives inside each
/// translator.
#[derive(Debug, Default)]
pub struct ToolCallDrafts {
    by_index: FxHashMap<u32, ToolCallDraft>,
    order: Vec<u32>,
    current: Option<u32>,
}

impl ToolCallDrafts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a draft at a stream position. An upstream that assigns no id
    /// gets a generated one so downstream records stay correlated.
    pub fn open(&mut self, index: u32, id: Option<String>, name: String) {
        let id = id.unwrap_or_else(next_call_id);
        if self.by_index.contains_key(&index) {
            // same position re-announced; the newest announcement wins
            self.order.retain(|existing| *existing != index);
        }
        self.order.push(index);
        self.by_index.insert(
            index,
            ToolCallDraft {
                id,
                name,
                arguments: String::new(),
            },
        );
        self.current = Some(index);
    }

    /// Append an argument fragment. Untagged fragments resolve to the most
    /// recently opened draft. Returns false when no draft can take the
    /// fragment.
    pub fn append(&mut self, index: Option<u32>, fragment: &str) -> bool {
        let Some(target) = index.filter(|i| self.by_index.contains_key(i)).or(self.current)
        else {
            return false;
        };
        match self.by_index.get_mut(&target) {
            Some(draft) => {
                draft.arguments.push_str(fragment);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Drain all drafts in announcement order, parsing each one's
    /// concatenated argument text.
    pub fn finalize_all(&mut self) -> Vec<Result<FinalizedToolCall, DraftError>> {
        self.current = None;
        let order = std::mem::take(&mut self.order);
        order
            .into_iter()
            .filter_map(|index| self.by_index.remove(&index))
            .map(|draft| match serde_json::from_str(&draft.arguments) {
                Ok(args) => Ok(FinalizedToolCall {
                    id: draft.id,
                    name: draft.name,
                    args,
                }),
                Err(source) => Err(DraftError::MalformedArguments {
                    id: draft.id,
                    name: draft.name,
                    source,
                }),
            })
            .collect()
    }
}
