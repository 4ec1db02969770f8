//! Token validator trait 定義
//!
//! 認証は外部サービスに委譲します。ドメイン層は「トークン → Identity」の
//! 変換だけを要求します。

use async_trait::async_trait;

use super::{Identity, TokenValidationError};

/// Bearer token validator
///
/// `valid = false` の応答は `TokenValidationError::Rejected`、
/// 通信エラーは `TokenValidationError::Unavailable` として返す。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenValidator: Send + Sync {
    async fn validate(&self, token: &str) -> Result<Identity, TokenValidationError>;
}
