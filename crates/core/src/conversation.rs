//! Conversation and Turn domain types.
//!
//! These are the value objects that flow through the whole system:
//! a client sends a message → the engine appends a user Turn → the model
//! (optionally grounded by retrieval) produces the assistant Turn.
//!
//! The serialized shape matches the on-disk conversation records and the
//! wire protocol: `{id, title, content[], modelId, lastDate}` with each
//! content entry `{role, content, timestamp}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Caller-supplied stable identifier for a conversation. Used as the
/// storage key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub String);

impl ChatId {
    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role of a turn's author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The AI assistant
    Assistant,
}

/// One retained citation for a grounded answer: a truncated excerpt of the
/// chunk plus the domain it came from. This is all that survives of a
/// `RetrievedDocument` once the answer is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceExcerpt {
    /// Truncated chunk text (for citation display).
    pub content: String,
    /// Domain of the source URL.
    pub source: String,
}

/// The structured result of a retrieval-augmented generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundedAnswer {
    /// The synthesized answer.
    pub answer: String,
    /// Citations for the chunks the answer was grounded on.
    pub context: Vec<SourceExcerpt>,
    /// The user question that drove the retrieval.
    pub input: String,
}

/// The content of a turn — either plain text or a grounded RAG result.
///
/// Serialized untagged so the persisted shape is a bare string for plain
/// turns and an `{answer, context, input}` object for grounded ones,
/// matching the record format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TurnContent {
    Grounded(GroundedAnswer),
    Text(String),
}

impl TurnContent {
    /// The text to replay into model context: plain text verbatim, grounded
    /// turns contribute only their `answer`.
    pub fn replay_text(&self) -> &str {
        match self {
            Self::Text(s) => s,
            Self::Grounded(g) => &g.answer,
        }
    }

    pub fn is_grounded(&self) -> bool {
        matches!(self, Self::Grounded(_))
    }
}

impl From<String> for TurnContent {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for TurnContent {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// A single message exchange unit within a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Who authored this turn
    pub role: Role,

    /// Plain text or a grounded answer
    pub content: TurnContent,

    /// Creation time, immutable
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Create a new user turn.
    pub fn user(content: impl Into<TurnContent>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a new plain-text assistant turn.
    pub fn assistant(content: impl Into<TurnContent>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a grounded assistant turn from a retrieval result.
    pub fn grounded(answer: GroundedAnswer) -> Self {
        Self {
            role: Role::Assistant,
            content: TurnContent::Grounded(answer),
            timestamp: Utc::now(),
        }
    }
}

/// A persisted chat thread: ordered turns plus listing metadata.
///
/// `content` is append-only after creation. `last_date` is used only for
/// recency bucketing in listings, never for ordering `content`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// Storage key, caller-supplied
    pub id: ChatId,

    /// Human-readable label (first user message, or explicit)
    pub title: String,

    /// Ordered turns, chronological
    pub content: Vec<Turn>,

    /// Identifier of the backing language model, fixed at creation
    pub model_id: String,

    /// Timestamp of the most recent mutation
    pub last_date: DateTime<Utc>,
}

impl Conversation {
    /// Create a new empty conversation.
    pub fn new(id: ChatId, title: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            content: Vec::new(),
            model_id: model_id.into(),
            last_date: Utc::now(),
        }
    }

    /// Append a turn and touch `last_date`.
    pub fn push(&mut self, turn: Turn) {
        self.last_date = Utc::now();
        self.content.push(turn);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_turn() {
        let turn = Turn::user("Bonjour");
        assert_eq!(turn.role, Role::User);
        assert_eq!(turn.content, TurnContent::Text("Bonjour".into()));
    }

    #[test]
    fn conversation_push_touches_last_date() {
        let mut conv = Conversation::new(ChatId::from("c1"), "hello", "gemma2:2b");
        let created = conv.last_date;
        conv.push(Turn::user("first"));
        assert_eq!(conv.content.len(), 1);
        assert!(conv.last_date >= created);
    }

    #[test]
    fn conversation_serializes_camel_case() {
        let conv = Conversation::new(ChatId::from("c1"), "hello", "gemma2:2b");
        let json = serde_json::to_string(&conv).unwrap();
        assert!(json.contains(r#""modelId":"gemma2:2b""#));
        assert!(json.contains(r#""lastDate""#));
        assert!(json.contains(r#""id":"c1""#));
    }

    #[test]
    fn plain_content_serializes_as_bare_string() {
        let turn = Turn::assistant("Salut!");
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["content"], serde_json::json!("Salut!"));
    }

    #[test]
    fn grounded_content_serializes_as_object() {
        let turn = Turn::grounded(GroundedAnswer {
            answer: "42".into(),
            context: vec![SourceExcerpt {
                content: "the answer is 42…".into(),
                source: "example.com".into(),
            }],
            input: "what is the answer".into(),
        });
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["content"]["answer"], serde_json::json!("42"));
        assert_eq!(
            json["content"]["context"][0]["source"],
            serde_json::json!("example.com")
        );
    }

    #[test]
    fn content_roundtrip_discriminates() {
        let plain: TurnContent = serde_json::from_str(r#""hello""#).unwrap();
        assert_eq!(plain, TurnContent::Text("hello".into()));

        let grounded: TurnContent =
            serde_json::from_str(r#"{"answer":"a","context":[],"input":"q"}"#).unwrap();
        assert!(grounded.is_grounded());
    }

    #[test]
    fn replay_text_uses_answer_for_grounded() {
        let grounded = TurnContent::Grounded(GroundedAnswer {
            answer: "the answer".into(),
            context: vec![],
            input: "q".into(),
        });
        assert_eq!(grounded.replay_text(), "the answer");
        assert_eq!(TurnContent::Text("plain".into()).replay_text(), "plain");
    }
}
