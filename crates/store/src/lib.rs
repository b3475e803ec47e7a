//! File-backed conversation store — one JSON record per conversation.
//!
//! Each conversation lives at `<conversations_dir>/<chatId>.json` as a
//! single pretty-printed JSON document. Every mutation rewrites the whole
//! record through a temp file followed by a rename, so readers never see a
//! partially written record and a crash mid-write leaves the previous
//! version intact.

use causerie_core::{ChatId, Conversation, StoreError, Turn};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// The conversation store rooted at a conversations directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store at the given directory, creating it if missing.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .map_err(|e| StoreError::Persistence(format!("create {}: {e}", dir.display())))?;
        Ok(Self { dir })
    }

    /// Create a new conversation. Fails if a record with this id exists.
    ///
    /// The title is the initial message; turns start empty.
    pub async fn create(
        &self,
        id: &ChatId,
        title: &str,
        model_id: &str,
    ) -> Result<Conversation, StoreError> {
        let path = self.record_path(id)?;
        if path.exists() {
            return Err(StoreError::AlreadyExists(id.to_string()));
        }
        let conversation = Conversation::new(id.clone(), title, model_id);
        self.write_record(&path, &conversation).await?;
        debug!(chat_id = %id, "Conversation created");
        Ok(conversation)
    }

    /// Read a conversation by id.
    pub async fn read(&self, id: &ChatId) -> Result<Conversation, StoreError> {
        let path = self.record_path(id)?;
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.to_string()));
            }
            Err(e) => {
                return Err(StoreError::Persistence(format!(
                    "read {}: {e}",
                    path.display()
                )));
            }
        };
        serde_json::from_str(&content)
            .map_err(|e| StoreError::Persistence(format!("parse {}: {e}", path.display())))
    }

    /// Whether a record exists for this id.
    pub fn exists(&self, id: &ChatId) -> Result<bool, StoreError> {
        Ok(self.record_path(id)?.exists())
    }

    /// Append a turn to an existing conversation and persist the result.
    pub async fn append(&self, id: &ChatId, turn: Turn) -> Result<Conversation, StoreError> {
        let mut conversation = self.read(id).await?;
        conversation.push(turn);
        self.write_record(&self.record_path(id)?, &conversation)
            .await?;
        Ok(conversation)
    }

    /// Persist a full conversation record, replacing any existing one.
    pub async fn save(&self, conversation: &Conversation) -> Result<(), StoreError> {
        let path = self.record_path(&conversation.id)?;
        self.write_record(&path, conversation).await
    }

    /// List all conversations, newest `lastDate` first.
    ///
    /// Unreadable or corrupt records are skipped with a warning so one bad
    /// file cannot take down the whole listing.
    pub async fn list(&self) -> Result<Vec<Conversation>, StoreError> {
        let mut dir = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| StoreError::Persistence(format!("list {}: {e}", self.dir.display())))?;

        let mut conversations = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| StoreError::Persistence(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match tokio::fs::read_to_string(&path).await {
                Ok(content) => match serde_json::from_str::<Conversation>(&content) {
                    Ok(conversation) => conversations.push(conversation),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Skipping corrupt conversation record");
                    }
                },
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable conversation record");
                }
            }
        }

        conversations.sort_by(|a, b| b.last_date.cmp(&a.last_date));
        Ok(conversations)
    }

    /// Resolve a chat id to its record path, rejecting ids that would
    /// escape the conversations directory.
    fn record_path(&self, id: &ChatId) -> Result<PathBuf, StoreError> {
        let raw = id.as_str();
        if raw.is_empty()
            || raw == "."
            || raw == ".."
            || raw.contains('/')
            || raw.contains('\\')
            || raw.contains("..")
        {
            return Err(StoreError::Persistence(format!("invalid chat id: {raw:?}")));
        }
        Ok(self.dir.join(format!("{raw}.json")))
    }

    /// Write a record through a temp file then rename into place.
    async fn write_record(
        &self,
        path: &Path,
        conversation: &Conversation,
    ) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(conversation)
            .map_err(|e| StoreError::Persistence(format!("serialize record: {e}")))?;

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json.as_bytes())
            .await
            .map_err(|e| StoreError::Persistence(format!("write {}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| StoreError::Persistence(format!("rename {}: {e}", path.display())))?;
        Ok(())
    }
}
