//! Provider implementations for Causerie.
//!
//! Currently a single backend: the local Ollama runtime, which handles chat
//! completions (plain and streamed NDJSON), embeddings, and model listing.

mod ollama;

pub use ollama::OllamaProvider;
