//! PostgreSQL Message Repository 実装
//!
//! sqlx の `PgPool` を使って `chat_messages` テーブルを読み書きします。
//! タイムスタンプは DB の `NOW()` で採番されるため、複数プロセスから
//! 書き込まれても時刻の基準は DB 側に揃います。

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{
    ChatMessage, MessageContent, MessageId, MessageRepository, RepositoryError, Timestamp,
    Username,
};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS chat_messages (
        id BIGSERIAL PRIMARY KEY,
        username TEXT NOT NULL,
        content TEXT NOT NULL,
        timestamp TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

const CREATE_TIMESTAMP_INDEX: &str = r#"
    CREATE INDEX IF NOT EXISTS chat_messages_timestamp_idx
        ON chat_messages (timestamp)
"#;

#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: i64,
    username: String,
    content: String,
    timestamp: DateTime<Utc>,
}

impl TryFrom<MessageRow> for ChatMessage {
    type Error = RepositoryError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        let username = Username::new(row.username)
            .map_err(|e| RepositoryError::InvalidRow(format!("message {}: {}", row.id, e)))?;
        let content = MessageContent::new(row.content)
            .map_err(|e| RepositoryError::InvalidRow(format!("message {}: {}", row.id, e)))?;

        Ok(ChatMessage::new(
            MessageId::new(row.id),
            username,
            content,
            Timestamp::new(row.timestamp),
        ))
    }
}

fn database_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

/// PostgreSQL Message Repository 実装
pub struct PostgresMessageRepository {
    pool: PgPool,
}

impl PostgresMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// `database_url` に接続して Repository を作成
    pub async fn connect(database_url: &str) -> Result<Self, RepositoryError> {
        let pool = PgPool::connect(database_url).await.map_err(database_error)?;
        Ok(Self::new(pool))
    }

    /// テーブルとインデックスが無ければ作成
    pub async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        for statement in [CREATE_TABLE, CREATE_TIMESTAMP_INDEX] {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(database_error)?;
        }
        Ok(())
    }
}

#[async_trait]
impl MessageRepository for PostgresMessageRepository {
    async fn save(
        &self,
        username: &Username,
        content: &MessageContent,
    ) -> Result<ChatMessage, RepositoryError> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            INSERT INTO chat_messages (username, content, timestamp)
            VALUES ($1, $2, NOW())
            RETURNING id, username, content, timestamp
            "#,
        )
        .bind(username.as_str())
        .bind(content.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(database_error)?;

        tracing::debug!("Saved message {} from '{}'", row.id, username);
        row.try_into()
    }

    async fn list_recent(&self) -> Result<Vec<ChatMessage>, RepositoryError> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, username, content, timestamp
            FROM chat_messages
            ORDER BY timestamp ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?;

        rows.into_iter().map(ChatMessage::try_from).collect()
    }

    async fn delete_older_than(&self, older_than: Duration) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r#"
            DELETE FROM chat_messages
            WHERE timestamp < NOW() - make_interval(secs => $1)
            "#,
        )
        .bind(older_than.as_secs_f64())
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(result.rows_affected())
    }
}
