//! Conversion logic between DTOs and domain entities.

use agora_shared::time::to_rfc3339;

use crate::domain::ChatMessage;
use crate::infrastructure::dto::websocket as dto;

// ========================================
// Domain Entity → DTO
// ========================================

impl From<ChatMessage> for dto::ChatMessageDto {
    fn from(model: ChatMessage) -> Self {
        Self {
            id: model.id.value(),
            username: model.username.into_string(),
            content: model.content.into_string(),
            timestamp: to_rfc3339(model.timestamp.value()),
        }
    }
}

impl From<&ChatMessage> for dto::ChatMessageDto {
    fn from(model: &ChatMessage) -> Self {
        model.clone().into()
    }
}
