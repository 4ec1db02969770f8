//! Domain layer for the chat room.
//!
//! This module contains the chat model and the interfaces of the collaborators
//! (store, token validator, connection registry, publisher). It is independent
//! of DTOs and infrastructure concerns.

pub mod connection_registry;
pub mod entity;
pub mod error;
pub mod message_publisher;
pub mod repository;
pub mod token_validator;
pub mod value_object;

pub use connection_registry::ConnectionRegistry;
pub use entity::{
    ChatMessage, Connection, Identity, OUTBOUND_QUEUE_CAPACITY, PusherChannel, PusherReceiver,
    pusher_channel,
};
pub use error::{
    PublishError, PushError, RepositoryError, TokenValidationError, ValueObjectError,
};
pub use message_publisher::MessagePublisher;
pub use repository::MessageRepository;
pub use token_validator::TokenValidator;
pub use value_object::{ConnectionId, MessageContent, MessageId, Timestamp, Username};
