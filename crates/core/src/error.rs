//! Error types for the Causerie domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Causerie operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A generation is already in flight — the caller must retry later.
    /// Never retried or queued internally.
    #[error("Engine is busy — a generation is already in flight")]
    EngineBusy,

    // --- Store errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Retrieval errors ---
    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Conversation not found: {0}")]
    NotFound(String),

    #[error("Conversation already exists: {0}")]
    AlreadyExists(String),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

/// A failed stage of the retrieval pipeline. Any stage failure aborts the
/// whole retrieval; nothing is persisted for the assistant turn.
#[derive(Debug, Clone, Error)]
pub enum RetrievalError {
    #[error("Search fetch failed: {0}")]
    Fetch(String),

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Similarity index failed: {0}")]
    Index(String),
}

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}
