//! UseCase: チャット履歴取得処理

use std::sync::Arc;

use crate::domain::{ChatMessage, MessageRepository};

use super::error::GetMessagesError;

/// チャット履歴取得のユースケース
pub struct GetMessagesUseCase {
    /// Repository（メッセージストアの抽象化）
    repository: Arc<dyn MessageRepository>,
}

impl GetMessagesUseCase {
    /// 新しい GetMessagesUseCase を作成
    pub fn new(repository: Arc<dyn MessageRepository>) -> Self {
        Self { repository }
    }

    /// 保存されている全メッセージを古い順に取得
    ///
    /// ページングもフィルタも行わない。ストアの障害はそのまま呼び出し元に返す。
    pub async fn execute(&self) -> Result<Vec<ChatMessage>, GetMessagesError> {
        let messages = self.repository.list_recent().await?;
        tracing::debug!("Fetched {} chat message(s)", messages.len());
        Ok(messages)
    }
}
