//! UseCase: 参加者接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase::authenticate() / execute() メソッド
//! - トークン検証（タイムアウト付き）と Registry への登録
//!
//! ### なぜこのテストが必要か
//! - 認証に失敗した接続が Registry に登録されないことを保証する
//! - 認証サービスのエラー・無効応答・タイムアウトがすべて通常の拒否になることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：有効なトークンでの接続
//! - 異常系：空トークン、無効トークン、認証サービス障害、タイムアウト

use std::{sync::Arc, time::Duration};

use crate::domain::{
    Connection, ConnectionId, ConnectionRegistry, Identity, PusherChannel, TokenValidationError,
    TokenValidator, Username,
};

use super::error::ConnectError;

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    /// TokenValidator（外部認証サービスの抽象化）
    validator: Arc<dyn TokenValidator>,
    /// ConnectionRegistry（接続中セッションの管理）
    registry: Arc<dyn ConnectionRegistry>,
    /// トークン検証の制限時間
    auth_timeout: Duration,
}

impl ConnectParticipantUseCase {
    /// 新しい ConnectParticipantUseCase を作成
    pub fn new(
        validator: Arc<dyn TokenValidator>,
        registry: Arc<dyn ConnectionRegistry>,
        auth_timeout: Duration,
    ) -> Self {
        Self {
            validator,
            registry,
            auth_timeout,
        }
    }

    /// 接続要求のトークンを検証
    ///
    /// # Arguments
    ///
    /// * `token` - クエリパラメータで渡された bearer token（未指定なら `None`）
    ///
    /// # Returns
    ///
    /// * `Ok(Identity)` - 認証成功
    /// * `Err(ConnectError)` - 認証失敗（どの理由でも接続は開かれない）
    pub async fn authenticate(&self, token: Option<&str>) -> Result<Identity, ConnectError> {
        let token = match token.map(str::trim) {
            Some(token) if !token.is_empty() => token,
            _ => return Err(ConnectError::MissingToken),
        };

        match tokio::time::timeout(self.auth_timeout, self.validator.validate(token)).await {
            Ok(Ok(identity)) => Ok(identity),
            Ok(Err(TokenValidationError::Rejected(reason))) => {
                Err(ConnectError::InvalidToken(reason))
            }
            Ok(Err(TokenValidationError::Unavailable(reason))) => {
                Err(ConnectError::ValidatorUnavailable(reason))
            }
            Err(_) => Err(ConnectError::Timeout),
        }
    }

    /// 認証済みの接続を Registry に登録
    ///
    /// # Arguments
    ///
    /// * `username` - 認証済みのユーザー名（接続中は変わらない）
    /// * `sender` - クライアントへのメッセージ送信用チャンネル
    ///
    /// # Returns
    ///
    /// 登録した接続の ID
    pub async fn execute(&self, username: Username, sender: PusherChannel) -> ConnectionId {
        let id = ConnectionId::generate();
        self.registry
            .register(Connection::new(id, username, sender))
            .await;
        id
    }
}
