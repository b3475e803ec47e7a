//! Ollama provider — chat, streaming, embeddings, and model listing over
//! the native Ollama HTTP API.
//!
//! Endpoints used:
//! - `POST /api/chat` for completions, with `stream: true` returning
//!   newline-delimited JSON chunks
//! - `POST /api/embed` for embeddings
//! - `GET /api/tags` for installed models

use async_trait::async_trait;
use causerie_core::{
    ChatMessage, ChatRequest, EmbeddingRequest, EmbeddingResponse, Provider, ProviderError,
    StreamChunk,
};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub struct OllamaProvider {
    base_url: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    /// Create a provider against an Ollama runtime, e.g.
    /// `http://localhost:11434`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn check_status(
        response: reqwest::Response,
        model: &str,
    ) -> Result<reqwest::Response, ProviderError> {
        let status = response.status().as_u16();
        if status == 404 {
            return Err(ProviderError::ModelNotFound(model.to_string()));
        }
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            warn!(status, body = %body, "Ollama returned error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: body,
            });
        }
        Ok(response)
    }
}

fn map_transport_err(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(e.to_string())
    } else {
        ProviderError::Network(e.to_string())
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, request: ChatRequest) -> Result<String, ProviderError> {
        let url = format!("{}/api/chat", self.base_url);
        let body = ChatApiRequest {
            model: &request.model,
            messages: &request.messages,
            stream: false,
        };
        debug!(model = %request.model, messages = request.messages.len(), "Sending chat request");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_err)?;
        let response = Self::check_status(response, &request.model).await?;

        let api: ChatApiChunk = response.json().await.map_err(|e| ProviderError::ApiError {
            status_code: 200,
            message: format!("Failed to parse chat response: {e}"),
        })?;

        Ok(api.message.map(|m| m.content).unwrap_or_default())
    }

    async fn stream(
        &self,
        request: ChatRequest,
    ) -> Result<
        tokio::sync::mpsc::Receiver<Result<StreamChunk, ProviderError>>,
        ProviderError,
    > {
        let url = format!("{}/api/chat", self.base_url);
        let body = ChatApiRequest {
            model: &request.model,
            messages: &request.messages,
            stream: true,
        };
        debug!(model = %request.model, "Opening chat stream");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_err)?;
        let response = Self::check_status(response, &request.model).await?;

        let (tx, rx) = tokio::sync::mpsc::channel(64);

        // Read the NDJSON byte stream line by line and forward chunks.
        tokio::spawn(async move {
            let mut byte_stream = response.bytes_stream();
            let mut buffer = String::new();

            while let Some(chunk_result) = byte_stream.next().await {
                let bytes = match chunk_result {
                    Ok(b) => b,
                    Err(e) => {
                        let _ = tx
                            .send(Err(ProviderError::StreamInterrupted(e.to_string())))
                            .await;
                        return;
                    }
                };

                buffer.push_str(&String::from_utf8_lossy(&bytes));

                while let Some(line_end) = buffer.find('\n') {
                    let line = buffer[..line_end].trim_end_matches('\r').to_string();
                    buffer = buffer[line_end + 1..].to_string();

                    let Some(chunk) = parse_stream_line(&line) else {
                        continue;
                    };
                    let done = chunk.done;
                    if tx.send(Ok(chunk)).await.is_err() {
                        return; // receiver went away
                    }
                    if done {
                        return;
                    }
                }
            }
        });

        Ok(rx)
    }

    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
        let url = format!("{}/api/embed", self.base_url);
        let body = EmbedApiRequest {
            model: &request.model,
            input: &request.inputs,
        };
        debug!(model = %request.model, count = request.inputs.len(), "Sending embedding request");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_err)?;
        let response = Self::check_status(response, &request.model).await?;

        let api: EmbedApiResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse embedding response: {e}"),
            })?;

        Ok(EmbeddingResponse {
            embeddings: api.embeddings,
            model: api.model,
        })
    }

    async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(map_transport_err)?;

        if !response.status().is_success() {
            return Ok(Vec::new());
        }

        let api: TagsApiResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse model list: {e}"),
            })?;

        Ok(api.models.into_iter().map(|m| m.name).collect())
    }
}

/// Parse one NDJSON line of a chat stream. Malformed lines are skipped
/// with a warning rather than killing the stream.
fn parse_stream_line(line: &str) -> Option<StreamChunk> {
    if line.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<ChatApiChunk>(line) {
        Ok(chunk) => Some(StreamChunk {
            content: chunk.message.map(|m| m.content),
            done: chunk.done,
        }),
        Err(e) => {
            warn!(error = %e, "Skipping malformed stream line");
            None
        }
    }
}

// ── Wire types ─────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatApiRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatApiChunk {
    #[serde(default)]
    message: Option<ApiMessage>,
    #[serde(default)]
    done: bool,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    content: String,
}

#[derive(Serialize)]
struct EmbedApiRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedApiResponse {
    embeddings: Vec<Vec<f32>>,
    #[serde(default)]
    model: String,
}

#[derive(Debug, Deserialize)]
struct TagsApiResponse {
    #[serde(default)]
    models: Vec<TagModel>,
}

#[derive(Debug, Deserialize)]
struct TagModel {
    name: String,
}
