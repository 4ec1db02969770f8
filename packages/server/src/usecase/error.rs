//! UseCase error types.

use thiserror::Error;

use crate::domain::{PublishError, RepositoryError};

/// Reasons a connection attempt is rejected before it opens
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("missing token")]
    MissingToken,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token validator unavailable: {0}")]
    ValidatorUnavailable(String),

    #[error("token validation timed out")]
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    #[error("failed to persist message: {0}")]
    Persist(#[from] RepositoryError),

    #[error("failed to publish message: {0}")]
    Publish(#[from] PublishError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetMessagesError {
    #[error("failed to load messages: {0}")]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurgeError {
    #[error("failed to delete expired messages: {0}")]
    Repository(#[from] RepositoryError),
}
