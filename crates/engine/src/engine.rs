//! The generation engine — one conversation turn at a time.
//!
//! `send_message` is the single entry point: it takes the busy lock,
//! persists the user turn, produces the assistant turn (plain chat or
//! retrieval-grounded when a tool is selected), streams token deltas to the
//! hub, and always closes with exactly one `stream_end` event.

use crate::catalog::Catalog;
use crate::stream::StreamHub;
use causerie_core::{
    ChatId, ChatRequest, Conversation, DocumentFetcher, Error, Provider, Result, StoreError,
    StreamEvent, ToolRegistry, Turn,
};
use causerie_memory::ContextMemory;
use causerie_retrieval::{PipelineConfig, RetrievalPipeline};
use causerie_store::FileStore;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::Semaphore;
use tracing::{info, warn};

const DEFAULT_SYSTEM_PROMPT: &str =
    "Tu es un assistant conversationnel utile. Réponds dans la langue de l'utilisateur et \
     structure tes réponses en Markdown.";

/// Engine tunables, normally derived from `AppConfig`.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub default_model: String,
    pub token_budget: usize,
    pub auto_create_on_message: bool,
    /// Replaces the builtin system prompt when set.
    pub system_prompt: Option<String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            default_model: "gemma2:2b".into(),
            token_budget: 2048,
            auto_create_on_message: true,
            system_prompt: None,
        }
    }
}

pub struct GenerationEngine {
    store: Arc<FileStore>,
    provider: Arc<dyn Provider>,
    pipeline: RetrievalPipeline,
    tools: ToolRegistry,
    catalog: Catalog,
    hub: Arc<StreamHub>,
    // Single permit: one generation in flight, ever. Excess callers fail
    // fast with EngineBusy instead of queueing.
    busy: Arc<Semaphore>,
    settings: EngineSettings,
}

impl GenerationEngine {
    pub fn new(
        store: Arc<FileStore>,
        provider: Arc<dyn Provider>,
        fetcher: Arc<dyn DocumentFetcher>,
        pipeline_config: PipelineConfig,
        tools: ToolRegistry,
        catalog: Catalog,
        settings: EngineSettings,
    ) -> Self {
        let pipeline = RetrievalPipeline::new(fetcher, provider.clone(), pipeline_config);
        Self {
            store,
            provider,
            pipeline,
            tools,
            catalog,
            hub: Arc::new(StreamHub::new()),
            busy: Arc::new(Semaphore::new(1)),
            settings,
        }
    }

    /// The stream hub clients subscribe to.
    pub fn hub(&self) -> Arc<StreamHub> {
        self.hub.clone()
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Create a conversation explicitly. Fails if the id is taken.
    pub async fn create_conversation(&self, id: &ChatId, title: &str) -> Result<Conversation> {
        Ok(self
            .store
            .create(id, title, &self.settings.default_model)
            .await?)
    }

    pub async fn read_conversation(&self, id: &ChatId) -> Result<Conversation> {
        Ok(self.store.read(id).await?)
    }

    pub async fn list_conversations(&self) -> Result<Vec<Conversation>> {
        Ok(self.store.list().await?)
    }

    /// Installed model names, straight from the provider.
    pub async fn list_models(&self) -> Result<Vec<String>> {
        Ok(self.provider.list_models().await?)
    }

    /// Run one full message exchange, returning the persisted assistant
    /// turn.
    ///
    /// Fails fast with [`Error::EngineBusy`] when a generation is already
    /// in flight. The user turn is persisted before generation starts, so
    /// a failed generation still leaves the question on disk. Exactly one
    /// `stream_end` event is emitted per call, success or failure.
    pub async fn send_message(
        &self,
        id: &ChatId,
        message: &str,
        requested_tools: &[String],
    ) -> Result<Turn> {
        let permit = self
            .busy
            .clone()
            .try_acquire_owned()
            .map_err(|_| Error::EngineBusy)?;

        info!(chat_id = %id, tools = ?requested_tools, "Generation started");
        let result = self.generate(id, message, requested_tools).await;
        self.hub.send(StreamEvent::end()).await;
        drop(permit);

        match &result {
            Ok(_) => info!(chat_id = %id, "Generation finished"),
            Err(e) => warn!(chat_id = %id, error = %e, "Generation failed"),
        }
        result
    }

    async fn generate(
        &self,
        id: &ChatId,
        message: &str,
        requested_tools: &[String],
    ) -> Result<Turn> {
        let conversation = match self.store.read(id).await {
            Ok(c) => c,
            Err(StoreError::NotFound(_)) if self.settings.auto_create_on_message => {
                self.store
                    .create(id, message, &self.settings.default_model)
                    .await?
            }
            Err(e) => return Err(e.into()),
        };
        let model = conversation.model_id.clone();

        // The question is durable before any model call happens.
        let conversation = self.store.append(id, Turn::user(message)).await?;

        let turn = match self.tools.select(requested_tools) {
            Some(tool) => {
                let (tx, mut rx) = mpsc::unbounded_channel();
                let hub = self.hub.clone();
                let forward = tokio::spawn(async move {
                    while let Some(delta) = rx.recv().await {
                        hub.send(StreamEvent::delta(delta)).await;
                    }
                });

                let result = self.pipeline.run(message, tool, &model, Some(&tx)).await;
                drop(tx);
                let _ = forward.await;
                Turn::grounded(result?)
            }
            None => {
                let mut memory = ContextMemory::rehydrate(&conversation, self.settings.token_budget);
                memory.compact(self.provider.as_ref(), &model).await;

                let system_prompt = self
                    .settings
                    .system_prompt
                    .as_deref()
                    .unwrap_or(DEFAULT_SYSTEM_PROMPT);
                let request = ChatRequest::new(&model, memory.as_messages(system_prompt));

                let mut stream = self.provider.stream(request).await?;
                let mut answer = String::new();
                while let Some(chunk) = stream.recv().await {
                    let chunk = chunk?;
                    if let Some(content) = chunk.content {
                        self.hub.send(StreamEvent::delta(content.clone())).await;
                        answer.push_str(&content);
                    }
                }
                Turn::assistant(answer)
            }
        };

        self.store.append(id, turn.clone()).await?;
        Ok(turn)
    }
}
