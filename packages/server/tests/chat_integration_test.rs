//! Integration tests for the chat server: real router, real sockets.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use agora_server::{
    config::ChatConfig,
    domain::{ConnectionRegistry, Identity, TokenValidationError, TokenValidator, Username},
    infrastructure::{
        connection_registry::InMemoryConnectionRegistry, dispatcher::FanOutDispatcher,
        dto::websocket::ChatMessageDto, repository::InMemoryMessageRepository,
    },
    ui::{Server, state::AppState},
};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{Error as WsError, Message},
};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Accepts `<name>-token` for alice and bob, stalls on `slow-token`
struct FakeValidator;

#[async_trait]
impl TokenValidator for FakeValidator {
    async fn validate(&self, token: &str) -> Result<Identity, TokenValidationError> {
        let name = match token {
            "alice-token" => "alice",
            "bob-token" => "bob",
            "slow-token" => {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "slowpoke"
            }
            _ => return Err(TokenValidationError::Rejected("unknown token".to_string())),
        };
        Ok(Identity {
            username: Username::new(name.to_string()).unwrap(),
            role: "user".to_string(),
        })
    }
}

/// Helper struct holding a running server and its registry
struct TestServer {
    addr: SocketAddr,
    registry: Arc<InMemoryConnectionRegistry>,
}

impl TestServer {
    async fn start() -> Self {
        let repository = Arc::new(InMemoryMessageRepository::new());
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let (dispatcher, _task) = FanOutDispatcher::spawn(registry.clone());
        let state = Arc::new(AppState::new(
            repository,
            Arc::new(FakeValidator),
            registry.clone(),
            Arc::new(dispatcher),
            &ChatConfig::default(),
        ));
        let app = Server::new(state).router();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestServer { addr, registry }
    }

    fn ws_url(&self, token: &str) -> String {
        format!("ws://{}/chat?token={}", self.addr, token)
    }

    async fn connect(&self, token: &str) -> Client {
        let (ws, _response) = connect_async(self.ws_url(token))
            .await
            .expect("Failed to connect");
        ws
    }

    async fn history(&self) -> Vec<ChatMessageDto> {
        reqwest::get(format!("http://{}/chat/messages", self.addr))
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    /// Registration happens after the upgrade response, so poll for it
    async fn wait_for_connections(&self, expected: usize) {
        for _ in 0..100 {
            if self.registry.count().await == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!(
            "expected {} connection(s), found {}",
            expected,
            self.registry.count().await
        );
    }
}

async fn send_content(ws: &mut Client, content: &str) {
    let frame = serde_json::json!({ "content": content }).to_string();
    ws.send(Message::text(frame)).await.unwrap();
}

async fn next_chat(ws: &mut Client) -> ChatMessageDto {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("Timed out waiting for a frame")
            .expect("Stream ended")
            .expect("WebSocket error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

fn rejected_status(result: Result<impl Sized, WsError>) -> u16 {
    match result {
        Err(WsError::Http(response)) => response.status().as_u16(),
        Err(e) => panic!("unexpected error: {}", e),
        Ok(_) => panic!("connection should have been rejected"),
    }
}

#[tokio::test]
async fn test_message_is_broadcast_to_every_connection() {
    // テスト項目: alice の送信が alice 自身を含む全接続に届き、履歴の最後に載る
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect("alice-token").await;
    let mut bob = server.connect("bob-token").await;
    server.wait_for_connections(2).await;

    // when (操作):
    send_content(&mut alice, "hi").await;

    // then (期待する結果):
    for ws in [&mut alice, &mut bob] {
        let frame = next_chat(ws).await;
        assert_eq!(frame.username, "alice");
        assert_eq!(frame.content, "hi");
    }
    let history = server.history().await;
    let last = history.last().expect("history should not be empty");
    assert_eq!(last.username, "alice");
    assert_eq!(last.content, "hi");
}

#[tokio::test]
async fn test_history_keeps_send_order() {
    // テスト項目: N 件送信した直後の履歴がその N 件を送信順に含む
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect("alice-token").await;
    server.wait_for_connections(1).await;

    // when (操作):
    for i in 0..5 {
        send_content(&mut alice, &format!("message {}", i)).await;
    }
    for _ in 0..5 {
        next_chat(&mut alice).await;
    }

    // then (期待する結果):
    let history = server.history().await;
    let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(
        contents,
        vec!["message 0", "message 1", "message 2", "message 3", "message 4"]
    );
    assert!(history.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
}

#[tokio::test]
async fn test_blank_and_malformed_frames_are_ignored() {
    // テスト項目: 空白のみ・不正な JSON のフレームは保存も配信もされず、接続は維持される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect("alice-token").await;
    server.wait_for_connections(1).await;

    // when (操作):
    send_content(&mut alice, "   ").await;
    alice.send(Message::text("not json")).await.unwrap();
    send_content(&mut alice, "real").await;

    // then (期待する結果): 最初に届くのは "real"
    let frame = next_chat(&mut alice).await;
    assert_eq!(frame.content, "real");
    let history = server.history().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].content, "real");
    assert_eq!(server.registry.count().await, 1);
}

#[tokio::test]
async fn test_empty_token_is_rejected_without_registration() {
    // テスト項目: 空トークンでの接続は登録前に拒否され、接続数は変わらない
    // given (前提条件):
    let server = TestServer::start().await;
    let _alice = server.connect("alice-token").await;
    server.wait_for_connections(1).await;

    // when (操作):
    let result = connect_async(server.ws_url("")).await;

    // then (期待する結果):
    assert_eq!(rejected_status(result), 401);
    assert_eq!(server.registry.count().await, 1);
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    // テスト項目: 無効なトークンは 401 で拒否される
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let result = connect_async(server.ws_url("forged-token")).await;

    // then (期待する結果):
    assert_eq!(rejected_status(result), 401);
    assert_eq!(server.registry.count().await, 0);
}

#[tokio::test]
async fn test_slow_validation_is_rejected_after_timeout() {
    // テスト項目: 2 秒を超える認証は 403 で拒否され、登録されない
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let started = tokio::time::Instant::now();
    let result = connect_async(server.ws_url("slow-token")).await;

    // then (期待する結果):
    assert_eq!(rejected_status(result), 403);
    assert!(started.elapsed() < Duration::from_secs(4));
    assert_eq!(server.registry.count().await, 0);
}

#[tokio::test]
async fn test_closed_connection_is_deregistered() {
    // テスト項目: クライアントが切断すると Registry から外れ、残りの接続には配信が続く
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect("alice-token").await;
    let mut bob = server.connect("bob-token").await;
    server.wait_for_connections(2).await;

    // when (操作):
    bob.close(None).await.unwrap();
    server.wait_for_connections(1).await;
    send_content(&mut alice, "still here").await;

    // then (期待する結果):
    assert_eq!(next_chat(&mut alice).await.content, "still here");
    assert_eq!(server.registry.count().await, 1);
}

#[tokio::test]
async fn test_history_empty_is_array() {
    // テスト項目: メッセージが無い場合の履歴は空配列
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let response = reqwest::get(format!("http://{}/chat/messages", server.addr))
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn test_health_check() {
    // テスト項目: ヘルスチェックが {"status":"ok"} を返す
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let body: serde_json::Value = reqwest::get(format!("http://{}/api/health", server.addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(body, serde_json::json!({"status": "ok"}));
}
