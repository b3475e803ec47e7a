//! Search-grounded retrieval pipeline.
//!
//! Turns a user question into a grounded answer in six stages:
//! normalize the query → fetch the search page → chunk the text →
//! embed chunks and query → rank by cosine similarity → synthesize an
//! answer over the top chunks through the tool's prompt template.
//!
//! Any stage failure aborts the whole retrieval; partial results are
//! never surfaced.

pub mod chunk;
pub mod fetch;
pub mod index;
pub mod pipeline;
pub mod query;

pub use fetch::HttpFetcher;
pub use index::{cosine_similarity, VectorIndex};
pub use pipeline::{extract_domain, PipelineConfig, RetrievalPipeline};
pub use query::normalize_query;
