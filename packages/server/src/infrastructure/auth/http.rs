//! HTTP Token Validator 実装
//!
//! 外部認証サービスの `POST {base_url}/validate` に `{"token": "..."}` を送り、
//! `{"valid": bool, "username": "...", "role": "...", "error": "..."}` を受け取ります。
//! タイムアウトは UseCase 層で掛けるため、ここでは設定しません。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Identity, TokenValidationError, TokenValidator, Username};

#[derive(Debug, Serialize)]
struct ValidateTokenRequest<'a> {
    token: &'a str,
}

#[derive(Debug, Deserialize)]
struct ValidateTokenResponse {
    valid: bool,
    #[serde(default)]
    username: String,
    #[serde(default)]
    role: String,
    #[serde(default)]
    error: String,
}

impl ValidateTokenResponse {
    fn into_identity(self) -> Result<Identity, TokenValidationError> {
        if !self.valid {
            let reason = if self.error.is_empty() {
                "invalid token".to_string()
            } else {
                self.error
            };
            return Err(TokenValidationError::Rejected(reason));
        }

        let username = Username::new(self.username).map_err(|_| {
            TokenValidationError::Rejected("validator returned an empty username".to_string())
        })?;

        Ok(Identity {
            username,
            role: self.role,
        })
    }
}

/// 外部認証サービスを呼び出す TokenValidator
pub struct HttpTokenValidator {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTokenValidator {
    /// `base_url` は末尾の `/` の有無を問わない
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/validate", base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl TokenValidator for HttpTokenValidator {
    async fn validate(&self, token: &str) -> Result<Identity, TokenValidationError> {
        let unavailable = |e: reqwest::Error| TokenValidationError::Unavailable(e.to_string());

        let response = self
            .client
            .post(&self.endpoint)
            .json(&ValidateTokenRequest { token })
            .send()
            .await
            .map_err(unavailable)?
            .error_for_status()
            .map_err(unavailable)?
            .json::<ValidateTokenResponse>()
            .await
            .map_err(unavailable)?;

        response.into_identity()
    }
}
