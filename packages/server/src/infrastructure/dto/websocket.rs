//! WebSocket frame DTOs.

use serde::{Deserialize, Serialize};

/// Inbound frame sent by a client: `{"content": "..."}`
#[derive(Debug, Clone, Deserialize)]
pub struct InboundChatFrame {
    pub content: String,
}

/// Serialized chat message
///
/// Pushed to every open connection and also returned by the history endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessageDto {
    pub id: i64,
    pub username: String,
    pub content: String,
    /// RFC 3339 (UTC, millisecond precision)
    pub timestamp: String,
}
