pub mod agent;
pub mod completion;
pub mod datastream;
pub mod mapping;

use serde::Deserialize;

/// Client-selected wire protocol for the response stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamProtocol {
    /// Bare text fragments; concatenation reconstructs the message.
    Text,
    /// Tagged `<tag>:<JSON>` records carrying the full event vocabulary.
    #[default]
    Data,
}
