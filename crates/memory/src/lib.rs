//! Summary-buffer context memory.
//!
//! Rehydrates a persisted conversation into model context: recent turns are
//! replayed verbatim, older turns are folded into a running summary once the
//! transcript would blow the token budget. Grounded assistant turns replay
//! only their `answer` text; retrieval context never re-enters the model.

pub mod token;

use causerie_core::{ChatMessage, ChatRequest, Conversation, Provider, Role};
use tracing::{debug, warn};

const SUMMARY_PROMPT: &str = "Condense the following conversation into a short summary that \
                              preserves names, facts, and decisions. Reply with the summary only.";

/// The replayable model context for one conversation.
///
/// Holds an optional running summary plus the verbatim message tail. After
/// [`ContextMemory::compact`] the tail fits within half the token budget
/// (leaving the other half for the summary, the system prompt, and the
/// model's answer) — except that the newest message is kept verbatim no
/// matter its size.
pub struct ContextMemory {
    summary: Option<String>,
    history: Vec<ChatMessage>,
    budget: usize,
}

impl ContextMemory {
    /// Rebuild context from a persisted conversation, oldest turn first.
    pub fn rehydrate(conversation: &Conversation, budget: usize) -> Self {
        let history = conversation
            .content
            .iter()
            .map(|turn| match turn.role {
                Role::User => ChatMessage::user(turn.content.replay_text()),
                Role::Assistant => ChatMessage::assistant(turn.content.replay_text()),
            })
            .collect();
        Self {
            summary: None,
            history,
            budget,
        }
    }

    /// Whether the verbatim tail currently exceeds the budget.
    pub fn needs_compaction(&self) -> bool {
        token::estimate_messages_tokens(&self.history) > self.budget
    }

    /// Fold the oldest turns into the running summary until the verbatim
    /// tail fits half the budget. The newest message always stays in the
    /// tail.
    ///
    /// Summarization is delegated to the model. If it fails, the prefix is
    /// dropped with a warning — context must stay bounded either way.
    pub async fn compact(&mut self, provider: &dyn Provider, model: &str) {
        if !self.needs_compaction() {
            return;
        }

        let half = self.budget / 2;
        // The newest message is never folded: the model must see the turn
        // it is answering verbatim, even when that turn alone exceeds the
        // budget.
        let mut split = 0;
        while split + 1 < self.history.len()
            && token::estimate_messages_tokens(&self.history[split..]) > half
        {
            split += 1;
        }
        if split == 0 {
            return;
        }
        let prefix: Vec<ChatMessage> = self.history.drain(..split).collect();
        debug!(folded = prefix.len(), kept = self.history.len(), "Compacting context");

        let mut transcript = String::new();
        if let Some(previous) = &self.summary {
            transcript.push_str("Previous summary: ");
            transcript.push_str(previous);
            transcript.push_str("\n\n");
        }
        for message in &prefix {
            let speaker = match message.role {
                causerie_core::MessageRole::User => "User",
                causerie_core::MessageRole::Assistant => "Assistant",
                causerie_core::MessageRole::System => "System",
            };
            transcript.push_str(speaker);
            transcript.push_str(": ");
            transcript.push_str(&message.content);
            transcript.push('\n');
        }

        let request = ChatRequest::new(
            model,
            vec![
                ChatMessage::system(SUMMARY_PROMPT),
                ChatMessage::user(transcript),
            ],
        );
        match provider.complete(request).await {
            Ok(summary) => self.summary = Some(summary),
            Err(e) => {
                warn!(error = %e, "Context summarization failed, dropping oldest turns");
            }
        }
    }

    /// Assemble the full model context: system prompt, running summary (as
    /// a second system message), then the verbatim tail.
    pub fn as_messages(&self, system_prompt: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push(ChatMessage::system(system_prompt));
        if let Some(summary) = &self.summary {
            messages.push(ChatMessage::system(format!(
                "Conversation so far: {summary}"
            )));
        }
        messages.extend(self.history.iter().cloned());
        messages
    }

    /// The verbatim tail (for tests and diagnostics).
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// The running summary, if any compaction has happened.
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }
}
