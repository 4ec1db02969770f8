//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - メッセージの保存と Dispatcher への引き渡し
//!
//! ### なぜこのテストが必要か
//! - 保存に成功したメッセージだけが配信されることを保証する
//! - 配信されるのがストアの採番した id・タイムスタンプ付きのメッセージであることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：保存して publish
//! - 異常系：保存失敗（publish されない）、Dispatcher 停止

use std::sync::Arc;

use crate::domain::{ChatMessage, MessageContent, MessagePublisher, MessageRepository, Username};

use super::error::SendMessageError;

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// Repository（メッセージストアの抽象化）
    repository: Arc<dyn MessageRepository>,
    /// MessagePublisher（Fan-out Dispatcher の抽象化）
    publisher: Arc<dyn MessagePublisher>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(
        repository: Arc<dyn MessageRepository>,
        publisher: Arc<dyn MessagePublisher>,
    ) -> Self {
        Self {
            repository,
            publisher,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `username` - 送信者（接続時に認証されたユーザー名）
    /// * `content` - メッセージ内容（空白のみの内容はここに届く前に弾かれる）
    ///
    /// # Returns
    ///
    /// * `Ok(ChatMessage)` - 保存され、配信キューに積まれたメッセージ
    /// * `Err(SendMessageError)` - 保存または publish の失敗
    pub async fn execute(
        &self,
        username: &Username,
        content: MessageContent,
    ) -> Result<ChatMessage, SendMessageError> {
        // 1. Repository 経由でメッセージを保存
        let message = self.repository.save(username, &content).await?;

        // 2. Dispatcher に引き渡す（配信は別タスク）
        self.publisher.publish(message.clone())?;

        Ok(message)
    }
}
