use chrono::Local;
use serde::{ Serialize, Deserialize };
use uuid::Uuid;

/// Who produced a message. System entries are part of the upstream context
/// but are never rendered in the widget and cannot be deleted through it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    /// Display timestamp, stamped at creation. Not part of the wire payload.
    pub time: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            time: Local::now().format("%H:%M").to_string(),
        }
    }

    pub fn to_wire(&self) -> WireMessage {
        WireMessage {
            role: self.role,
            content: self.content.clone(),
        }
    }
}

/// The role+content projection sent upstream; ids and display times stay local.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: Role,
    pub content: String,
}
