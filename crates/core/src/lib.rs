//! # Causerie Core
//!
//! Domain types, traits, and error definitions for the Causerie conversation
//! engine. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (model runtime, embedding service, document
//! fetcher) is defined as a trait here. Implementations live in their
//! respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod conversation;
pub mod error;
pub mod event;
pub mod fetch;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use conversation::{ChatId, Conversation, GroundedAnswer, Role, SourceExcerpt, Turn, TurnContent};
pub use error::{Error, ProviderError, Result, RetrievalError, StoreError};
pub use event::{StreamEvent, STREAM_EOF};
pub use fetch::{DocumentFetcher, FetchedDocument};
pub use provider::{
    ChatMessage, ChatRequest, EmbeddingRequest, EmbeddingResponse, MessageRole, Provider,
    StreamChunk,
};
pub use tool::{ToolRegistry, ToolSpec};
