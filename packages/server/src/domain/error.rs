//! Domain error types.

use thiserror::Error;

use super::ConnectionId;

/// Errors raised when constructing value objects
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    /// Username is empty or whitespace only
    #[error("username must not be empty")]
    EmptyUsername,

    /// Message content is empty or whitespace only
    #[error("message content must not be empty")]
    EmptyContent,
}

/// Errors raised by the message store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// The store could not be reached or rejected the statement
    #[error("database error: {0}")]
    Database(String),

    /// A stored row could not be mapped back to the domain model
    #[error("invalid row: {0}")]
    InvalidRow(String),

    /// The retention window cannot be applied to the current time
    #[error("retention window out of range: {0}")]
    WindowOutOfRange(String),
}

/// Errors raised by the token validator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenValidationError {
    /// The validator answered, but the token is not valid
    #[error("token rejected: {0}")]
    Rejected(String),

    /// The validator could not be reached or answered garbage
    #[error("token validator unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised when pushing a frame to a single connection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PushError {
    /// The connection's outbound side has gone away
    #[error("connection '{0}' is closed")]
    ChannelClosed(ConnectionId),

    /// The peer is not draining its outbound queue
    #[error("outbound queue of connection '{0}' is full")]
    QueueFull(ConnectionId),
}

/// Errors raised when handing a message to the dispatcher
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    /// The dispatcher task is no longer running
    #[error("dispatcher has stopped")]
    DispatcherStopped,
}
