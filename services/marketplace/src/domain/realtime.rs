//! Real-time wire events. Frames are JSON `{"event": "...", "data": {...}}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::types::{Message, Notification};

/// Events pushed from the server to a connected client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    NewMessage(MessagePayload),
    UserTyping(TypingPayload),
    Notification(NotificationPayload),
}

/// Events a client sends over its socket.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    JoinConversation { conversation_id: Uuid },
    LeaveConversation { conversation_id: Uuid },
    Typing { conversation_id: Uuid, is_typing: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessagePayload {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub is_read: bool,
    #[serde(serialize_with = "fixlane_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypingPayload {
    pub conversation_id: Uuid,
    pub user_id: Uuid,
    pub is_typing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationPayload {
    pub id: Uuid,
    pub kind: &'static str,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    #[serde(serialize_with = "fixlane_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

impl From<&Message> for ServerEvent {
    fn from(message: &Message) -> Self {
        Self::NewMessage(MessagePayload {
            id: message.id,
            conversation_id: message.job_id,
            sender_id: message.sender_id,
            content: message.content.clone(),
            is_read: message.is_read,
            created_at: message.created_at,
        })
    }
}

impl From<&Notification> for ServerEvent {
    fn from(notification: &Notification) -> Self {
        Self::Notification(NotificationPayload {
            id: notification.id,
            kind: notification.kind.as_str(),
            title: notification.title.clone(),
            message: notification.message.clone(),
            link: notification.link.clone(),
            created_at: notification.created_at,
        })
    }
}
