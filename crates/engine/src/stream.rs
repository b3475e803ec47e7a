//! Single-subscriber stream hub.
//!
//! Generation events flow to at most one client at a time: subscribing
//! replaces any previous subscriber (last connected wins), and events sent
//! while nobody is listening are dropped silently.

use causerie_core::StreamEvent;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Default)]
pub struct StreamHub {
    subscriber: Mutex<Option<UnboundedSender<StreamEvent>>>,
}

impl StreamHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register as the stream subscriber, displacing any previous one.
    /// The displaced subscriber's receiver simply closes.
    pub async fn subscribe(&self) -> UnboundedReceiver<StreamEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let previous = self.subscriber.lock().await.replace(tx);
        if previous.is_some() {
            debug!("Replacing existing stream subscriber");
        }
        rx
    }

    /// Push an event to the current subscriber, if any.
    pub async fn send(&self, event: StreamEvent) {
        let mut guard = self.subscriber.lock().await;
        if let Some(tx) = guard.as_ref() {
            if tx.send(event).is_err() {
                // receiver dropped, clear the slot
                *guard = None;
            }
        }
    }
}
