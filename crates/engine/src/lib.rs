//! # Causerie Engine
//!
//! The single-flight generation engine: takes one message at a time through
//! persistence, context memory, optional retrieval, and token streaming.

pub mod catalog;
pub mod engine;
pub mod stream;

pub use catalog::{Catalog, PromptPreset};
pub use engine::{EngineSettings, GenerationEngine};
pub use stream::StreamHub;
