pub mod drafts;
pub mod sse;
pub mod translator;

pub use sse::{SseEvent, SseParser};
pub use translator::{AgentTranslator, CompletionTranslator, Translate};
