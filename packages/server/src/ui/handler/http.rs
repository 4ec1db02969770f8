//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};

use crate::{
    infrastructure::dto::{http::ErrorResponseDto, websocket::ChatMessageDto},
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get the whole chat history, oldest first
pub async fn get_messages(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ChatMessageDto>>, (StatusCode, Json<ErrorResponseDto>)> {
    match state.get_messages_usecase.execute().await {
        Ok(messages) => {
            // Domain Model から DTO への変換
            Ok(Json(messages.into_iter().map(ChatMessageDto::from).collect()))
        }
        Err(e) => {
            tracing::error!("Failed to get chat messages: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponseDto::new("Failed to get messages")),
            ))
        }
    }
}
