//! InMemory Message Repository 実装
//!
//! ドメイン層が定義する MessageRepository trait の具体的な実装。
//! Vec をインメモリ DB として使用します。
//!
//! タイムスタンプは注入された `Clock` から取得し、保存順に単調非減少となるよう
//! 直前の値で下限を取ります。

use std::{sync::Arc, time::Duration};

use agora_shared::time::{Clock, SystemClock};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::{
    ChatMessage, MessageContent, MessageId, MessageRepository, RepositoryError, Timestamp,
    Username,
};

#[derive(Default)]
struct MessageLog {
    messages: Vec<ChatMessage>,
    next_id: i64,
    last_timestamp: Option<DateTime<Utc>>,
}

/// インメモリ Message Repository 実装
pub struct InMemoryMessageRepository {
    log: Mutex<MessageLog>,
    clock: Arc<dyn Clock>,
}

impl InMemoryMessageRepository {
    /// システム時計を使う InMemoryMessageRepository を作成
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// 任意の時計を使う InMemoryMessageRepository を作成（テスト用）
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            log: Mutex::new(MessageLog {
                next_id: 1,
                ..MessageLog::default()
            }),
            clock,
        }
    }
}

impl Default for InMemoryMessageRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn save(
        &self,
        username: &Username,
        content: &MessageContent,
    ) -> Result<ChatMessage, RepositoryError> {
        let mut log = self.log.lock().await;

        let now = self.clock.now();
        let timestamp = match log.last_timestamp {
            Some(last) if last > now => last,
            _ => now,
        };

        let message = ChatMessage::new(
            MessageId::new(log.next_id),
            username.clone(),
            content.clone(),
            Timestamp::new(timestamp),
        );
        log.next_id += 1;
        log.last_timestamp = Some(timestamp);
        log.messages.push(message.clone());

        Ok(message)
    }

    async fn list_recent(&self) -> Result<Vec<ChatMessage>, RepositoryError> {
        let log = self.log.lock().await;
        Ok(log.messages.clone())
    }

    async fn delete_older_than(&self, older_than: Duration) -> Result<u64, RepositoryError> {
        let window = chrono::Duration::from_std(older_than)
            .map_err(|e| RepositoryError::WindowOutOfRange(e.to_string()))?;
        let now = self.clock.now();
        let cutoff = now.checked_sub_signed(window).ok_or_else(|| {
            RepositoryError::WindowOutOfRange(format!("{:?} before {}", older_than, now))
        })?;

        let mut log = self.log.lock().await;
        let before = log.messages.len();
        log.messages.retain(|m| m.timestamp.value() >= cutoff);

        Ok((before - log.messages.len()) as u64)
    }
}
