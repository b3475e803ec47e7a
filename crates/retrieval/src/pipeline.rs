//! The retrieval pipeline: question in, grounded answer out.

use crate::{chunk, index::VectorIndex, query};
use causerie_core::{
    ChatMessage, ChatRequest, DocumentFetcher, EmbeddingRequest, Error, GroundedAnswer, Provider,
    RetrievalError, SourceExcerpt, ToolSpec,
};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

/// Characters of a ranked chunk kept as its persisted citation excerpt.
const EXCERPT_CHARS: usize = 150;

/// Tunables for one pipeline instance, normally taken from `AppConfig`.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Search URL prefix; the normalized query is appended verbatim.
    pub search_url: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub embedding_model: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            search_url: "https://www.google.com/search?q=".into(),
            chunk_size: 300,
            chunk_overlap: 50,
            top_k: 5,
            embedding_model: "gemma2:2b".into(),
        }
    }
}

/// Runs the six retrieval stages for one question.
pub struct RetrievalPipeline {
    fetcher: Arc<dyn DocumentFetcher>,
    provider: Arc<dyn Provider>,
    config: PipelineConfig,
}

impl RetrievalPipeline {
    pub fn new(
        fetcher: Arc<dyn DocumentFetcher>,
        provider: Arc<dyn Provider>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            fetcher,
            provider,
            config,
        }
    }

    /// Run the full pipeline. Token deltas of the synthesized answer are
    /// forwarded through `deltas` as they arrive, when a sender is given.
    pub async fn run(
        &self,
        input: &str,
        tool: &ToolSpec,
        model: &str,
        deltas: Option<&UnboundedSender<String>>,
    ) -> Result<GroundedAnswer, Error> {
        let search_query = query::normalize_query(input);
        let url = format!("{}{search_query}", self.config.search_url);
        info!(tool = %tool.name, url = %url, "Running retrieval");

        let document = self.fetcher.fetch(&url).await?;
        let domain = extract_domain(&document.source_url);

        let chunks = chunk::chunk_text(
            &document.text,
            self.config.chunk_size,
            self.config.chunk_overlap,
        );
        debug!(chunks = chunks.len(), domain = %domain, "Document chunked");
        if chunks.is_empty() {
            return Err(RetrievalError::Index("fetched document is empty".into()).into());
        }

        // One embedding call covers all chunks plus the question itself.
        let mut inputs = chunks.clone();
        inputs.push(input.to_string());
        let response = self
            .provider
            .embed(EmbeddingRequest {
                model: self.config.embedding_model.clone(),
                inputs,
            })
            .await
            .map_err(|e| RetrievalError::Embedding(e.to_string()))?;

        let mut embeddings = response.embeddings;
        if embeddings.len() != chunks.len() + 1 {
            return Err(RetrievalError::Embedding(format!(
                "expected {} embeddings, got {}",
                chunks.len() + 1,
                embeddings.len()
            ))
            .into());
        }
        let query_embedding = embeddings
            .pop()
            .ok_or_else(|| RetrievalError::Embedding("empty embedding response".into()))?;

        let ranked = VectorIndex::new(chunks, embeddings)?.top_k(&query_embedding, self.config.top_k);

        let context = ranked
            .iter()
            .map(|c| format!("Context: {}\nSource: {domain}", c.content))
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = tool
            .prompt_template
            .replace("{context}", &context)
            .replace("{input}", input);

        let request = ChatRequest::new(model, vec![ChatMessage::user(prompt)]);
        let mut rx = self.provider.stream(request).await.map_err(Error::from)?;

        let mut answer = String::new();
        while let Some(chunk) = rx.recv().await {
            let chunk = chunk.map_err(Error::from)?;
            if let Some(content) = chunk.content {
                if let Some(tx) = deltas {
                    let _ = tx.send(content.clone());
                }
                answer.push_str(&content);
            }
        }

        Ok(GroundedAnswer {
            answer,
            context: ranked
                .iter()
                .map(|c| SourceExcerpt {
                    content: excerpt(&c.content),
                    source: domain.clone(),
                })
                .collect(),
            input: input.to_string(),
        })
    }
}

/// The host part of a URL, or `"unknown domain"` when it cannot be parsed.
pub fn extract_domain(url: &str) -> String {
    let Some((_, rest)) = url.split_once("://") else {
        return "unknown domain".into();
    };
    let host = rest
        .split(['/', '?', '#'])
        .next()
        .unwrap_or("")
        .rsplit('@')
        .next()
        .unwrap_or("");
    let host = host.split(':').next().unwrap_or("");
    if host.is_empty() {
        "unknown domain".into()
    } else {
        host.to_string()
    }
}

fn excerpt(text: &str) -> String {
    let mut out: String = text.chars().take(EXCERPT_CHARS).collect();
    if text.chars().count() > EXCERPT_CHARS {
        out.push('…');
    }
    out
}
