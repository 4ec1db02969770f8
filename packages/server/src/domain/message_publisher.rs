//! Message publisher trait 定義

use super::{ChatMessage, PublishError};

/// Fan-out publisher
///
/// `publish` はキューに積むだけで、配信は呼び出し元とは別のタスクで行われる。
/// 積まれた順に配信される。
#[cfg_attr(test, mockall::automock)]
pub trait MessagePublisher: Send + Sync {
    fn publish(&self, message: ChatMessage) -> Result<(), PublishError>;
}
