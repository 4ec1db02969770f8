//! Entities of the chat domain.

use tokio::sync::mpsc::{self, error::TrySendError};

use super::{ConnectionId, MessageContent, MessageId, PushError, Timestamp, Username};

/// Frames a connection may have queued before it counts as stalled
pub const OUTBOUND_QUEUE_CAPACITY: usize = 64;

/// Outbound channel of one connection
///
/// The receiving half is drained by the connection's writer task, which owns the
/// WebSocket sink. Dropping every sender ends that task.
pub type PusherChannel = mpsc::Sender<String>;

/// Receiving half of [`PusherChannel`]
pub type PusherReceiver = mpsc::Receiver<String>;

/// Create the bounded outbound channel of a new connection
pub fn pusher_channel() -> (PusherChannel, PusherReceiver) {
    mpsc::channel(OUTBOUND_QUEUE_CAPACITY)
}

/// A persisted chat message
///
/// Immutable once stored; only the retention sweep removes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub username: Username,
    pub content: MessageContent,
    pub timestamp: Timestamp,
}

impl ChatMessage {
    pub fn new(
        id: MessageId,
        username: Username,
        content: MessageContent,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id,
            username,
            content,
            timestamp,
        }
    }
}

/// Identity returned by the token validator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: Username,
    pub role: String,
}

/// One live real-time session as seen by the registry
///
/// The username is bound when the connection opens and never changes.
#[derive(Debug)]
pub struct Connection {
    pub id: ConnectionId,
    pub username: Username,
    sender: PusherChannel,
}

impl Connection {
    pub fn new(id: ConnectionId, username: Username, sender: PusherChannel) -> Self {
        Self {
            id,
            username,
            sender,
        }
    }

    /// Queue a serialized frame for this connection's writer
    ///
    /// Never waits: a full queue means the peer stopped reading.
    pub fn push(&self, payload: &str) -> Result<(), PushError> {
        self.sender
            .try_send(payload.to_string())
            .map_err(|e| match e {
                TrySendError::Full(_) => PushError::QueueFull(self.id),
                TrySendError::Closed(_) => PushError::ChannelClosed(self.id),
            })
    }
}
