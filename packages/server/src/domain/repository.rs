//! Repository trait 定義
//!
//! ドメイン層が必要とするメッセージストアのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use std::time::Duration;

use async_trait::async_trait;

use super::{ChatMessage, MessageContent, RepositoryError, Username};

/// Message Repository trait
///
/// チャットメッセージの追記専用ログ。UseCase 層はこの trait に依存し、
/// Infrastructure 層の具体的な実装（InMemory / PostgreSQL）には依存しない。
///
/// 書き込みの直列化はストア側の責務とする。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// メッセージを保存し、ストアが採番した id とタイムスタンプ付きで返す
    async fn save(
        &self,
        username: &Username,
        content: &MessageContent,
    ) -> Result<ChatMessage, RepositoryError>;

    /// 全メッセージをタイムスタンプの昇順（古い順）で取得
    async fn list_recent(&self) -> Result<Vec<ChatMessage>, RepositoryError>;

    /// `older_than` より古いメッセージを一括削除し、削除件数を返す
    async fn delete_older_than(&self, older_than: Duration) -> Result<u64, RepositoryError>;
}
