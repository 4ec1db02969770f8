//! Fan-out dispatcher
//!
//! ## 責務
//!
//! - 新しく保存されたメッセージを受け取り、Registry の全接続に配信する
//! - 送信に失敗した接続を Registry から外す
//!
//! ## 設計ノート
//!
//! `publish` はキューに積むだけなので、メッセージを保存した接続の読み取り
//! ループは配信を待たない。配信は 1 本のタスクが受け取った順に行う。

use std::sync::Arc;

use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    domain::{
        ChatMessage, Connection, ConnectionId, ConnectionRegistry, MessagePublisher, PublishError,
    },
    infrastructure::dto::websocket::ChatMessageDto,
};

/// Result of one fan-out pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    /// Number of connections the frame was queued for
    pub delivered: usize,
    /// Connections removed because their writer had gone away
    pub evicted: Vec<ConnectionId>,
}

/// Handle to the dispatcher task
///
/// Dropping every handle closes the queue, which stops the task once the
/// remaining messages are dispatched.
pub struct FanOutDispatcher {
    queue: mpsc::UnboundedSender<ChatMessage>,
}

impl FanOutDispatcher {
    /// Spawn the dispatcher task over `registry`
    pub fn spawn(registry: Arc<dyn ConnectionRegistry>) -> (Self, JoinHandle<()>) {
        let (queue, mut rx) = mpsc::unbounded_channel::<ChatMessage>();

        let task = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                let report = dispatch(registry.as_ref(), &message).await;
                tracing::debug!(
                    "Dispatched message {} to {} connection(s), evicted {}",
                    message.id.value(),
                    report.delivered,
                    report.evicted.len()
                );
            }
            tracing::info!("Dispatcher stopped");
        });

        (Self { queue }, task)
    }
}

impl MessagePublisher for FanOutDispatcher {
    fn publish(&self, message: ChatMessage) -> Result<(), PublishError> {
        self.queue
            .send(message)
            .map_err(|_| PublishError::DispatcherStopped)
    }
}

/// Push `message` to every connection registered at the moment iteration starts
///
/// A failed push evicts that connection during the same pass; the remaining
/// connections are still served.
pub async fn dispatch(registry: &dyn ConnectionRegistry, message: &ChatMessage) -> DispatchReport {
    let payload = match serde_json::to_string(&ChatMessageDto::from(message)) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!("Failed to serialize message {}: {}", message.id.value(), e);
            return DispatchReport::default();
        }
    };

    let mut delivered = 0;
    let evicted = registry
        .for_each(&mut |connection: &Connection| match connection.push(&payload) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to push message to '{}' ({}), dropping connection: {}",
                    connection.id,
                    connection.username,
                    e
                );
                false
            }
        })
        .await;

    DispatchReport { delivered, evicted }
}
