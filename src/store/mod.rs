mod file;
mod memory;

pub use file::FileSnapshotStore;
pub use memory::MemorySnapshotStore;

use async_trait::async_trait;
use log::warn;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::cli::Args;
use crate::models::chat::{ ChatMessage, Role, WireMessage };

/// Fixed key the serialized message list is persisted under.
pub const HISTORY_KEY: &str = "chat_history";
/// Fixed key remembering which screen was last active.
pub const SCREEN_KEY: &str = "active_screen";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("snapshot IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported state store type: {0}")]
    UnsupportedBackend(String),
}

/// Key/value snapshot persistence, the server-side analogue of the browser's
/// local storage. Whole values are written on every mutation.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn save(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

pub fn create_snapshot_store(args: &Args) -> Result<Arc<dyn SnapshotStore>, StoreError> {
    match args.state_type.to_lowercase().as_str() {
        "file" => Ok(Arc::new(FileSnapshotStore::new(args.state_dir.clone().into()))),
        "memory" => Ok(Arc::new(MemorySnapshotStore::new())),
        other => Err(StoreError::UnsupportedBackend(other.to_string())),
    }
}

/// Owns the ordered message list of the single active conversation and writes
/// a full snapshot through the backend after every mutation.
pub struct ConversationStore {
    backend: Arc<dyn SnapshotStore>,
    messages: Vec<ChatMessage>,
}

impl ConversationStore {
    pub fn new(backend: Arc<dyn SnapshotStore>) -> Self {
        Self {
            backend,
            messages: Vec::new(),
        }
    }

    /// Load the last persisted snapshot, or install `seed` when no snapshot
    /// exists. A snapshot that no longer parses is discarded in favor of the
    /// seed rather than aborting startup.
    pub async fn restore(&mut self, seed: Vec<ChatMessage>) -> Result<(), StoreError> {
        match self.backend.load(HISTORY_KEY).await? {
            Some(raw) =>
                match serde_json::from_str::<Vec<ChatMessage>>(&raw) {
                    Ok(messages) => {
                        self.messages = messages;
                    }
                    Err(e) => {
                        warn!("Discarding unreadable history snapshot: {}", e);
                        self.messages = seed;
                        self.persist().await?;
                    }
                }
            None => {
                self.messages = seed;
                self.persist().await?;
            }
        }
        Ok(())
    }

    /// Append to the end, preserving call order.
    pub async fn append(&mut self, message: ChatMessage) -> Result<(), StoreError> {
        self.messages.push(message);
        self.persist().await
    }

    /// Delete the message with `id`. Absent ids and system messages are
    /// no-ops; returns whether anything was removed.
    pub async fn remove(&mut self, id: Uuid) -> Result<bool, StoreError> {
        let position = self.messages.iter().position(|m| m.id == id);
        let Some(position) = position else {
            return Ok(false);
        };
        if self.messages[position].role == Role::System {
            return Ok(false);
        }
        self.messages.remove(position);
        self.persist().await?;
        Ok(true)
    }

    /// Replace the list with `seed` and persist.
    pub async fn reset(&mut self, seed: Vec<ChatMessage>) -> Result<(), StoreError> {
        self.messages = seed;
        self.persist().await
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The full conversation projected to the upstream wire shape. System
    /// messages are included; they are context, just never rendered.
    pub fn wire_messages(&self) -> Vec<WireMessage> {
        self.messages
            .iter()
            .map(ChatMessage::to_wire)
            .collect()
    }

    async fn persist(&self) -> Result<(), StoreError> {
        let raw = serde_json::to_string(&self.messages)?;
        self.backend.save(HISTORY_KEY, &raw).await
    }
}
