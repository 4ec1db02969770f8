//! WebSocket connection handlers.
//!
//! 接続のライフサイクル: 認証（upgrade 前）→ Registry に登録 → 読み取りループ
//! → 終了処理（登録解除とソケット解放）。

use std::{sync::Arc, time::Duration};

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use serde::Deserialize;
use tokio::task::JoinHandle;

use crate::{
    domain::{Identity, MessageContent, PusherReceiver, Username, pusher_channel},
    infrastructure::dto::websocket::InboundChatFrame,
    ui::state::AppState,
    usecase::ConnectError,
};

/// Writer に残りのフレームを書き出させる猶予
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// 1 フレームの書き込みにかけられる上限
const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub token: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let identity = match state
        .connect_participant_usecase
        .authenticate(query.token.as_deref())
        .await
    {
        Ok(identity) => identity,
        Err(e) => {
            tracing::warn!("Rejecting chat connection: {}", e);
            return Err(rejection_status(&e));
        }
    };

    tracing::info!(
        "Token validated for '{}' (role: {})",
        identity.username,
        identity.role
    );
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, identity)))
}

/// 認証失敗時の HTTP ステータス
///
/// トークン自体の問題は 401、認証サービス側の問題は 403。
fn rejection_status(error: &ConnectError) -> StatusCode {
    match error {
        ConnectError::MissingToken | ConnectError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
        ConnectError::ValidatorUnavailable(_) | ConnectError::Timeout => StatusCode::FORBIDDEN,
    }
}

/// Result of decoding one inbound frame
#[derive(Debug)]
enum InboundFrame {
    Content(MessageContent),
    Blank,
    Malformed(serde_json::Error),
}

fn decode_inbound(payload: &[u8]) -> InboundFrame {
    match serde_json::from_slice::<InboundChatFrame>(payload) {
        Ok(frame) => match MessageContent::new(frame.content) {
            Ok(content) => InboundFrame::Content(content),
            Err(_) => InboundFrame::Blank,
        },
        Err(e) => InboundFrame::Malformed(e),
    }
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
///
/// The loop ends when the channel closes (the connection left the registry) or a
/// write fails or stalls past [`WRITE_TIMEOUT`]. On a closed channel a Close frame
/// is sent before returning.
fn pusher_loop(
    mut rx: PusherReceiver,
    mut sender: SplitSink<WebSocket, Message>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let write = sender.send(Message::Text(msg.into()));
            match tokio::time::timeout(WRITE_TIMEOUT, write).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::debug!("WebSocket write failed: {}", e);
                    return;
                }
                Err(_) => {
                    tracing::warn!("WebSocket write stalled for {:?}", WRITE_TIMEOUT);
                    return;
                }
            }
        }
        let _ = sender.send(Message::Close(None)).await;
    })
}

/// Reads frames until the peer disconnects or the transport fails.
///
/// Malformed and blank frames are dropped; so are messages the store rejects.
async fn reader_loop(
    mut receiver: SplitStream<WebSocket>,
    state: Arc<AppState>,
    username: Username,
) {
    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!("WebSocket read error from '{}': {}", username, e);
                break;
            }
        };

        let frame = match msg {
            Message::Text(text) => decode_inbound(text.as_bytes()),
            Message::Binary(bytes) => decode_inbound(&bytes),
            Message::Close(_) => {
                tracing::info!("Client '{}' requested close", username);
                break;
            }
            // Ping/pong is handled automatically by the WebSocket protocol
            Message::Ping(_) | Message::Pong(_) => continue,
        };

        let content = match frame {
            InboundFrame::Content(content) => content,
            InboundFrame::Blank => {
                tracing::debug!("Ignoring blank message from '{}'", username);
                continue;
            }
            InboundFrame::Malformed(e) => {
                tracing::warn!("Invalid JSON from '{}': {}", username, e);
                continue;
            }
        };

        match state.send_message_usecase.execute(&username, content).await {
            Ok(message) => tracing::debug!(
                "Message {} from '{}' saved and queued for broadcast",
                message.id.value(),
                username
            ),
            Err(e) => tracing::warn!("Dropping message from '{}': {}", username, e),
        }
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, identity: Identity) {
    let username = identity.username;

    // Open: Registry に登録
    let (tx, rx) = pusher_channel();
    let connection_id = state
        .connect_participant_usecase
        .execute(username.clone(), tx)
        .await;
    tracing::info!(
        "WebSocket connection '{}' opened for '{}'",
        connection_id,
        username
    );

    let (sender, receiver) = socket.split();
    let mut recv_task = tokio::spawn(reader_loop(receiver, state.clone(), username.clone()));
    let mut send_task = pusher_loop(rx, sender);

    // Closing: 読み取り側・書き込み側どちらが先に終わっても同じ終了処理に入る
    tokio::select! {
        _ = &mut recv_task => {}
        _ = &mut send_task => recv_task.abort(),
    };

    // Closed: 登録解除してから writer を終わらせる
    // 登録解除で outbound channel が閉じるので、writer は Close フレームを送って終了する
    if state
        .disconnect_participant_usecase
        .execute(&connection_id)
        .await
    {
        tracing::info!(
            "Connection '{}' for '{}' closed and deregistered ({} remaining)",
            connection_id,
            username,
            state
                .disconnect_participant_usecase
                .count_remaining_connections()
                .await
        );
    } else {
        tracing::debug!(
            "Connection '{}' for '{}' was already removed by the dispatcher",
            connection_id,
            username
        );
    }

    if !send_task.is_finished()
        && tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut send_task)
            .await
            .is_err()
    {
        send_task.abort();
    }
}
