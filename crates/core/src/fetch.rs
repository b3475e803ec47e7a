//! DocumentFetcher trait — the abstraction over web page retrieval.
//!
//! The retrieval pipeline issues exactly one search-page fetch per
//! grounded generation. Keeping the fetch behind a trait lets tests run
//! the whole pipeline against canned documents.

use crate::error::RetrievalError;
use async_trait::async_trait;

/// A fetched document: the URL it came from and its extracted text.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub source_url: String,
    pub text: String,
}

/// Fetches a URL and returns its extracted text content.
///
/// Failures (network, non-2xx, timeout) surface as
/// [`RetrievalError::Fetch`]; no retry happens at this level.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> std::result::Result<FetchedDocument, RetrievalError>;
}
