//! Streaming events pushed to the connected client during generation.
//!
//! The wire shape is `{"type": "stream", "content": "…"}` for each token
//! delta and `{"type": "stream_end", "content": "eof"}` exactly once when
//! the generation finishes, succeeds or not.

use serde::{Deserialize, Serialize};

/// Sentinel content carried by the terminal event.
pub const STREAM_EOF: &str = "eof";

/// An event on the token stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// A token delta.
    Stream { content: String },

    /// The terminal marker. Emitted exactly once per generation.
    StreamEnd { content: String },
}

impl StreamEvent {
    pub fn delta(content: impl Into<String>) -> Self {
        Self::Stream {
            content: content.into(),
        }
    }

    pub fn end() -> Self {
        Self::StreamEnd {
            content: STREAM_EOF.to_string(),
        }
    }

    pub fn is_end(&self) -> bool {
        matches!(self, Self::StreamEnd { .. })
    }
}
