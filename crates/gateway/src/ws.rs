//! WebSocket protocol: client commands in, server events out.
//!
//! Every client frame is a JSON object with a `type` discriminator.
//! Responses mirror that shape. Token deltas from a running generation are
//! pushed to the most recently connected client as `stream` events,
//! terminated by a single `stream_end`.

use crate::buckets::{bucket_conversations, ChatBucket};
use crate::GatewayState;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use causerie_core::{ChatId, Conversation, ToolSpec, TurnContent};
use causerie_engine::PromptPreset;
use chrono::Utc;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// A command frame from the client.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientCommand {
    #[serde(rename_all = "camelCase")]
    CreateConversation {
        chat_id: ChatId,
        initial_message: String,
    },
    #[serde(rename_all = "camelCase")]
    LoadConversation { chat_id: ChatId },
    #[serde(rename_all = "camelCase")]
    ReadConversation { chat_id: ChatId },
    ListConversations,
    GetDataChats,
    #[serde(rename_all = "camelCase")]
    SendMessage {
        chat_id: ChatId,
        message: String,
        #[serde(default)]
        tools: Vec<String>,
    },
    ListModels,
    ListTemplates,
    ListTools,
    ListPrompts,
    #[serde(other)]
    Unknown,
}

/// Reference to a conversation by id, as `{chatId}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRef {
    pub chat_id: ChatId,
}

/// A response frame to the client.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerEvent {
    ConversationCreated { data: ChatRef },
    ConversationLoaded { data: ChatRef },
    ReadConversationResponse { data: Conversation },
    Conversations { data: Vec<Conversation> },
    DataChats { data: Vec<ChatBucket> },
    MessageResponse { data: TurnContent },
    Models { data: Vec<serde_json::Value> },
    Templates { data: Vec<serde_json::Value> },
    Tools { data: Vec<ToolSpec> },
    Prompts { data: Vec<PromptPreset> },
    Error { message: String },
}

impl ServerEvent {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

pub(crate) async fn ws_handler(
    State(state): State<GatewayState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: GatewayState) {
    debug!("Client connected");
    let (mut sink, mut frames) = socket.split();

    // One writer task owns the sink; command replies and forwarded stream
    // events are serialized through the same channel.
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();
    let writer = tokio::spawn(async move {
        while let Some(text) = out_rx.recv().await {
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    let mut events = state.engine.hub().subscribe().await;
    let event_tx = out_tx.clone();
    let forwarder = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => {
                    if event_tx.send(json).is_err() {
                        break;
                    }
                }
                Err(e) => warn!(error = %e, "Failed to encode stream event"),
            }
        }
    });

    while let Some(Ok(frame)) = frames.next().await {
        match frame {
            Message::Text(text) => {
                let reply = match serde_json::from_str::<ClientCommand>(&text) {
                    Ok(command) => dispatch(&state, command).await,
                    Err(e) => ServerEvent::error(format!("Invalid message: {e}")),
                };
                match serde_json::to_string(&reply) {
                    Ok(json) => {
                        if out_tx.send(json).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!(error = %e, "Failed to encode response"),
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    forwarder.abort();
    drop(out_tx);
    let _ = writer.await;
    debug!("Client disconnected");
}

/// Execute one command against the engine. Errors become `error` frames;
/// the connection stays open either way.
pub(crate) async fn dispatch(state: &GatewayState, command: ClientCommand) -> ServerEvent {
    match command {
        ClientCommand::CreateConversation {
            chat_id,
            initial_message,
        } => match state
            .engine
            .create_conversation(&chat_id, &initial_message)
            .await
        {
            Ok(_) => ServerEvent::ConversationCreated {
                data: ChatRef { chat_id },
            },
            Err(e) => ServerEvent::error(e.to_string()),
        },
        ClientCommand::LoadConversation { chat_id } => {
            match state.engine.read_conversation(&chat_id).await {
                Ok(_) => ServerEvent::ConversationLoaded {
                    data: ChatRef { chat_id },
                },
                Err(e) => ServerEvent::error(e.to_string()),
            }
        }
        ClientCommand::ReadConversation { chat_id } => {
            match state.engine.read_conversation(&chat_id).await {
                Ok(conversation) => ServerEvent::ReadConversationResponse { data: conversation },
                Err(e) => ServerEvent::error(e.to_string()),
            }
        }
        ClientCommand::ListConversations => match state.engine.list_conversations().await {
            Ok(conversations) => ServerEvent::Conversations {
                data: conversations,
            },
            Err(e) => ServerEvent::error(e.to_string()),
        },
        ClientCommand::GetDataChats => match state.engine.list_conversations().await {
            Ok(conversations) => ServerEvent::DataChats {
                data: bucket_conversations(conversations, Utc::now()),
            },
            Err(e) => ServerEvent::error(e.to_string()),
        },
        ClientCommand::SendMessage {
            chat_id,
            message,
            tools,
        } => match state.engine.send_message(&chat_id, &message, &tools).await {
            Ok(turn) => ServerEvent::MessageResponse { data: turn.content },
            Err(e) => ServerEvent::error(e.to_string()),
        },
        ClientCommand::ListModels => ServerEvent::Models {
            data: state.engine.catalog().models().to_vec(),
        },
        ClientCommand::ListTemplates => ServerEvent::Templates {
            data: state.engine.catalog().templates().to_vec(),
        },
        ClientCommand::ListTools => ServerEvent::Tools {
            data: state.engine.tools().all().to_vec(),
        },
        ClientCommand::ListPrompts => ServerEvent::Prompts {
            data: state.engine.catalog().prompts().to_vec(),
        },
        ClientCommand::Unknown => ServerEvent::error("Unknown message type"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use causerie_core::{
        ChatRequest, DocumentFetcher, EmbeddingRequest, EmbeddingResponse, FetchedDocument,
        Provider, ProviderError, RetrievalError, StreamChunk, ToolRegistry,
    };
    use causerie_engine::{Catalog, EngineSettings, GenerationEngine};
    use causerie_retrieval::PipelineConfig;
    use causerie_store::FileStore;
    use std::sync::Arc;

    struct EchoProvider;

    #[async_trait]
    impl Provider for EchoProvider {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(
            &self,
            _request: ChatRequest,
        ) -> std::result::Result<String, ProviderError> {
            Ok("summary".into())
        }

        async fn stream(
            &self,
            _request: ChatRequest,
        ) -> std::result::Result<
            mpsc::Receiver<std::result::Result<StreamChunk, ProviderError>>,
            ProviderError,
        > {
            let (tx, rx) = mpsc::channel(4);
            tokio::spawn(async move {
                let _ = tx
                    .send(Ok(StreamChunk {
                        content: Some("pong".into()),
                        done: false,
                    }))
                    .await;
                let _ = tx.send(Ok(StreamChunk {
                    content: None,
                    done: true,
                }))
                .await;
            });
            Ok(rx)
        }

        async fn embed(
            &self,
            request: EmbeddingRequest,
        ) -> std::result::Result<EmbeddingResponse, ProviderError> {
            Ok(EmbeddingResponse {
                embeddings: request.inputs.iter().map(|_| vec![1.0, 0.0]).collect(),
                model: request.model,
            })
        }

        async fn list_models(&self) -> std::result::Result<Vec<String>, ProviderError> {
            Ok(vec!["gemma2:2b".into()])
        }
    }

    struct NoFetcher;

    #[async_trait]
    impl DocumentFetcher for NoFetcher {
        async fn fetch(&self, url: &str) -> std::result::Result<FetchedDocument, RetrievalError> {
            Err(RetrievalError::Fetch(format!("no network for {url}")))
        }
    }

    fn test_state(dir: &std::path::Path) -> GatewayState {
        let store = Arc::new(FileStore::new(dir.join("conversations")).unwrap());
        let engine = GenerationEngine::new(
            store,
            Arc::new(EchoProvider),
            Arc::new(NoFetcher),
            PipelineConfig::default(),
            ToolRegistry::builtin(),
            Catalog::default(),
            EngineSettings::default(),
        );
        GatewayState {
            engine: Arc::new(engine),
        }
    }

    fn parse(json: &str) -> ClientCommand {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn parses_send_message_with_default_tools() {
        let cmd = parse(r#"{"type":"sendMessage","chatId":"c1","message":"salut"}"#);
        match cmd {
            ClientCommand::SendMessage {
                chat_id,
                message,
                tools,
            } => {
                assert_eq!(chat_id.as_str(), "c1");
                assert_eq!(message, "salut");
                assert!(tools.is_empty());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_type_parses_to_unknown() {
        let cmd = parse(r#"{"type":"rebootUniverse"}"#);
        assert!(matches!(cmd, ClientCommand::Unknown));
    }

    #[tokio::test]
    async fn unknown_command_yields_protocol_error() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let event = dispatch(&state, ClientCommand::Unknown).await;
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["message"], "Unknown message type");
    }

    #[tokio::test]
    async fn create_and_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let created = dispatch(
            &state,
            parse(r#"{"type":"createConversation","chatId":"c1","initialMessage":"Bonjour"}"#),
        )
        .await;
        let json = serde_json::to_value(&created).unwrap();
        assert_eq!(json["type"], "conversationCreated");
        assert_eq!(json["data"]["chatId"], "c1");

        let read = dispatch(
            &state,
            parse(r#"{"type":"readConversation","chatId":"c1"}"#),
        )
        .await;
        let json = serde_json::to_value(&read).unwrap();
        assert_eq!(json["type"], "readConversationResponse");
        assert_eq!(json["data"]["title"], "Bonjour");
        assert_eq!(json["data"]["modelId"], "gemma2:2b");
    }

    #[tokio::test]
    async fn load_missing_conversation_is_an_error_frame() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let event = dispatch(
            &state,
            parse(r#"{"type":"loadConversation","chatId":"nope"}"#),
        )
        .await;
        assert!(matches!(event, ServerEvent::Error { .. }));
    }

    #[tokio::test]
    async fn send_message_returns_message_response() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let event = dispatch(
            &state,
            parse(r#"{"type":"sendMessage","chatId":"c1","message":"ping"}"#),
        )
        .await;
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "messageResponse");
        assert_eq!(json["data"], "pong");
    }

    #[tokio::test]
    async fn data_chats_groups_by_recency() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        dispatch(
            &state,
            parse(r#"{"type":"createConversation","chatId":"c1","initialMessage":"hello"}"#),
        )
        .await;

        let event = dispatch(&state, parse(r#"{"type":"getDataChats"}"#)).await;
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "dataChats");
        assert_eq!(json["data"][0]["label"], "Aujourd'hui");
        assert_eq!(json["data"][0]["chats"][0]["id"], "c1");
    }

    #[tokio::test]
    async fn registry_dumps() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let event = dispatch(&state, parse(r#"{"type":"listTools"}"#)).await;
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "tools");
        assert_eq!(json["data"][0]["name"], "search");

        let event = dispatch(&state, parse(r#"{"type":"listPrompts"}"#)).await;
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "prompts");
        assert_eq!(json["data"][0]["name"], "mistral");
    }

    #[test]
    fn invalid_json_is_reported_not_fatal() {
        let err = serde_json::from_str::<ClientCommand>("{not json").unwrap_err();
        let event = ServerEvent::error(format!("Invalid message: {err}"));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "error");
    }
}
