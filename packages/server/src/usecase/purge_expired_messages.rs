//! UseCase: 期限切れメッセージ削除処理

use std::{sync::Arc, time::Duration};

use crate::domain::MessageRepository;

use super::error::PurgeError;

/// 期限切れメッセージ削除のユースケース
///
/// 1 回の実行につきストアへの削除要求は 1 回だけ。
pub struct PurgeExpiredMessagesUseCase {
    /// Repository（メッセージストアの抽象化）
    repository: Arc<dyn MessageRepository>,
    /// これより古いメッセージを削除する
    retention_window: Duration,
}

impl PurgeExpiredMessagesUseCase {
    /// 新しい PurgeExpiredMessagesUseCase を作成
    pub fn new(repository: Arc<dyn MessageRepository>, retention_window: Duration) -> Self {
        Self {
            repository,
            retention_window,
        }
    }

    /// 削除を実行し、削除件数を返す
    pub async fn execute(&self) -> Result<u64, PurgeError> {
        Ok(self
            .repository
            .delete_older_than(self.retention_window)
            .await?)
    }

    pub fn retention_window(&self) -> Duration {
        self.retention_window
    }
}
