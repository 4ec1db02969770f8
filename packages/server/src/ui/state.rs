//! Server state shared by every handler.

use std::sync::Arc;

use crate::{
    config::ChatConfig,
    domain::{ConnectionRegistry, MessagePublisher, MessageRepository, TokenValidator},
    usecase::{
        ConnectParticipantUseCase, DisconnectParticipantUseCase, GetMessagesUseCase,
        SendMessageUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// ConnectParticipantUseCase（認証と接続登録のユースケース）
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    /// DisconnectParticipantUseCase（接続解除のユースケース）
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// GetMessagesUseCase（履歴取得のユースケース）
    pub get_messages_usecase: Arc<GetMessagesUseCase>,
}

impl AppState {
    /// Wire the use cases over the given collaborators
    pub fn new(
        repository: Arc<dyn MessageRepository>,
        validator: Arc<dyn TokenValidator>,
        registry: Arc<dyn ConnectionRegistry>,
        publisher: Arc<dyn MessagePublisher>,
        config: &ChatConfig,
    ) -> Self {
        Self {
            connect_participant_usecase: Arc::new(ConnectParticipantUseCase::new(
                validator,
                registry.clone(),
                config.auth_timeout,
            )),
            disconnect_participant_usecase: Arc::new(DisconnectParticipantUseCase::new(registry)),
            send_message_usecase: Arc::new(SendMessageUseCase::new(
                repository.clone(),
                publisher,
            )),
            get_messages_usecase: Arc::new(GetMessagesUseCase::new(repository)),
        }
    }
}
