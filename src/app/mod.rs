use log::warn;
use serde::{ Serialize, Deserialize };
use std::sync::Arc;
use uuid::Uuid;

use crate::config::WidgetConfig;
use crate::models::chat::{ ChatMessage, Role, WireMessage };
use crate::store::{ ConversationStore, SnapshotStore, StoreError, SCREEN_KEY };

/// Which of the two screens the widget is showing. The last active screen is
/// persisted so that a returning visitor lands where they left off.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    Home,
    Chat,
}

/// Discrete events the surface feeds into the reducer. All conversation
/// mutation goes through `ChatApp::apply`; there is no other write path.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Chat screen opened.
    OpenChat,

    /// Back navigation to the landing screen.
    GoHome,

    /// The visitor submitted the input field.
    UserSubmitted(String),

    /// The dispatch resolved with a reply (real or substituted copy).
    ReplyArrived(String),

    /// The dispatch failed in transport or with a non-success status.
    ReplyFailed,

    /// Delete control clicked on a message.
    MessageDeleted(Uuid),

    /// Conversation reset requested.
    Cleared,
}

/// What the reducer did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Accepted,
    /// Precondition failed (empty input, busy dispatcher, unknown id).
    Rejected,
    /// A user message was appended and the caller must now run the dispatch.
    DispatchStarted,
}

/// Explicit application state: active screen, the conversation, and the
/// dispatcher's busy flag. Mutated only through `apply`.
pub struct ChatApp {
    config: Arc<WidgetConfig>,
    store: ConversationStore,
    backend: Arc<dyn SnapshotStore>,
    screen: Screen,
    busy: bool,
}

/// The default seed for a fresh conversation: the system instruction plus,
/// when configured, an assistant greeting.
pub fn seed_messages(config: &WidgetConfig) -> Vec<ChatMessage> {
    let mut seed = vec![ChatMessage::new(Role::System, config.system_instruction())];
    if let Some(welcome) = &config.welcome_message {
        seed.push(ChatMessage::new(Role::Assistant, welcome.clone()));
    }
    seed
}

impl ChatApp {
    pub async fn new(
        backend: Arc<dyn SnapshotStore>,
        config: Arc<WidgetConfig>
    ) -> Result<Self, StoreError> {
        let mut store = ConversationStore::new(backend.clone());
        store.restore(seed_messages(&config)).await?;

        let screen = match backend.load(SCREEN_KEY).await? {
            Some(raw) =>
                serde_json::from_str(&raw).unwrap_or_else(|e| {
                    warn!("Discarding unreadable screen snapshot: {}", e);
                    Screen::Home
                }),
            None => Screen::Home,
        };

        Ok(Self {
            config,
            store,
            backend,
            screen,
            busy: false,
        })
    }

    pub async fn apply(&mut self, event: AppEvent) -> Result<Applied, StoreError> {
        match event {
            AppEvent::OpenChat => {
                self.set_screen(Screen::Chat).await?;
                Ok(Applied::Accepted)
            }
            AppEvent::GoHome => {
                self.set_screen(Screen::Home).await?;
                Ok(Applied::Accepted)
            }
            AppEvent::UserSubmitted(text) => {
                let text = text.trim();
                if text.is_empty() || self.busy {
                    return Ok(Applied::Rejected);
                }
                // Optimistic append: the user's entry lands before the
                // network round trip and is never rolled back.
                self.store.append(ChatMessage::new(Role::User, text)).await?;
                self.busy = true;
                Ok(Applied::DispatchStarted)
            }
            AppEvent::ReplyArrived(content) => {
                self.store.append(ChatMessage::new(Role::Assistant, content)).await?;
                self.busy = false;
                Ok(Applied::Accepted)
            }
            AppEvent::ReplyFailed => {
                self.store
                    .append(ChatMessage::new(Role::Assistant, self.config.fallback_error.clone()))
                    .await?;
                self.busy = false;
                Ok(Applied::Accepted)
            }
            AppEvent::MessageDeleted(id) => {
                if self.store.remove(id).await? {
                    Ok(Applied::Accepted)
                } else {
                    Ok(Applied::Rejected)
                }
            }
            AppEvent::Cleared => {
                self.store.reset(seed_messages(&self.config)).await?;
                self.busy = false;
                Ok(Applied::Accepted)
            }
        }
    }

    async fn set_screen(&mut self, screen: Screen) -> Result<(), StoreError> {
        self.screen = screen;
        let raw = serde_json::to_string(&screen)?;
        self.backend.save(SCREEN_KEY, &raw).await
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn busy(&self) -> bool {
        self.busy
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.store.messages()
    }

    pub fn wire_messages(&self) -> Vec<WireMessage> {
        self.store.wire_messages()
    }

    pub fn config(&self) -> Arc<WidgetConfig> {
        Arc::clone(&self.config)
    }

    /// Swap in a reloaded widget config. Affects copy and future seeds; the
    /// live conversation is left alone.
    pub fn set_config(&mut self, config: Arc<WidgetConfig>) {
        self.config = config;
    }
}
