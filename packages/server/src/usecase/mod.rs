//! UseCase layer: one struct per chat operation.

pub mod connect_participant;
pub mod disconnect_participant;
pub mod error;
pub mod get_messages;
pub mod purge_expired_messages;
pub mod send_message;

pub use connect_participant::ConnectParticipantUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{ConnectError, GetMessagesError, PurgeError, SendMessageError};
pub use get_messages::GetMessagesUseCase;
pub use purge_expired_messages::PurgeExpiredMessagesUseCase;
pub use send_message::SendMessageUseCase;
