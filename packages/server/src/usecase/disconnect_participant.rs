//! UseCase: 参加者切断処理

use std::sync::Arc;

use crate::domain::{ConnectionId, ConnectionRegistry};

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    /// ConnectionRegistry（接続中セッションの管理）
    registry: Arc<dyn ConnectionRegistry>,
}

impl DisconnectParticipantUseCase {
    /// 新しい DisconnectParticipantUseCase を作成
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// 参加者切断を実行
    ///
    /// 読み取りループの終了と Dispatcher による除外のどちらが先でも、
    /// 登録解除は一度だけ行われる。
    ///
    /// # Returns
    ///
    /// * `true` - この呼び出しで登録解除した
    /// * `false` - すでに登録解除されていた
    pub async fn execute(&self, connection_id: &ConnectionId) -> bool {
        self.registry.deregister(connection_id).await
    }

    /// 残りの接続数を取得
    pub async fn count_remaining_connections(&self) -> usize {
        self.registry.count().await
    }
}
