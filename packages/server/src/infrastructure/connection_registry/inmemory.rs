//! InMemory Connection Registry 実装
//!
//! ## 責務
//!
//! - 接続中のクライアントと対応する outbound channel の管理
//! - 登録・解除・全件走査の排他制御
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! Registry は生成された sender を `Connection` として保持するだけで、
//! ソケットそのものには触れません。Registry から外れた `Connection` が drop
//! されると sender も drop され、その接続の writer タスクが終了します。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Connection, ConnectionId, ConnectionRegistry};

/// HashMap を使った ConnectionRegistry 実装
///
/// 単一の Mutex で登録・解除・走査を直列化する。
#[derive(Default)]
pub struct InMemoryConnectionRegistry {
    /// Key: ConnectionId / Value: Connection
    connections: Mutex<HashMap<ConnectionId, Connection>>,
}

impl InMemoryConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionRegistry for InMemoryConnectionRegistry {
    async fn register(&self, connection: Connection) {
        let mut connections = self.connections.lock().await;
        tracing::debug!(
            "Connection '{}' ({}) registered",
            connection.id,
            connection.username
        );
        connections.insert(connection.id, connection);
    }

    async fn deregister(&self, id: &ConnectionId) -> bool {
        let mut connections = self.connections.lock().await;
        let removed = connections.remove(id).is_some();
        if removed {
            tracing::debug!("Connection '{}' deregistered", id);
        }
        removed
    }

    async fn for_each(
        &self,
        visit: &mut (dyn for<'c> FnMut(&'c Connection) -> bool + Send),
    ) -> Vec<ConnectionId> {
        let mut connections = self.connections.lock().await;
        let mut evicted = Vec::new();
        connections.retain(|id, connection| {
            let keep = visit(&*connection);
            if !keep {
                evicted.push(*id);
            }
            keep
        });
        evicted
    }

    async fn count(&self) -> usize {
        self.connections.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::{PusherReceiver, Username, pusher_channel};

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 登録・解除・全件走査の基本動作
    // - 走査中に false を返した接続が同じ走査の中で解除されること
    // - 並行な登録と走査が競合しないこと
    //
    // 【なぜこのテストが必要か】
    // - Registry は複数タスクから変更される唯一の共有状態
    // - 二重解除が安全であることを保証する必要がある
    // ========================================

    fn connection(name: &str) -> (Connection, PusherReceiver) {
        let (tx, rx) = pusher_channel();
        let username = Username::new(name.to_string()).unwrap();
        (Connection::new(ConnectionId::generate(), username, tx), rx)
    }

    #[tokio::test]
    async fn test_register_and_count() {
        // テスト項目: 登録すると接続数が増える
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        let (alice, _rx1) = connection("alice");
        let (bob, _rx2) = connection("bob");

        // when (操作):
        registry.register(alice).await;
        registry.register(bob).await;

        // then (期待する結果):
        assert_eq!(registry.count().await, 2);
    }

    #[tokio::test]
    async fn test_same_user_may_hold_several_connections() {
        // テスト項目: 同じユーザーの複数接続はそれぞれ別に登録される
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        let (first, _rx1) = connection("alice");
        let (second, _rx2) = connection("alice");

        // when (操作):
        registry.register(first).await;
        registry.register(second).await;

        // then (期待する結果):
        assert_eq!(registry.count().await, 2);
    }

    #[tokio::test]
    async fn test_deregister_is_idempotent() {
        // テスト項目: 二重に解除しても 2 回目は false を返すだけ
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        let (alice, _rx) = connection("alice");
        let id = alice.id;
        registry.register(alice).await;

        // when (操作):
        let first = registry.deregister(&id).await;
        let second = registry.deregister(&id).await;

        // then (期待する結果):
        assert!(first);
        assert!(!second);
        assert_eq!(registry.count().await, 0);
    }

    #[tokio::test]
    async fn test_for_each_visits_every_member_once() {
        // テスト項目: 走査時点のメンバー全員に 1 回ずつ visit が適用される
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        let mut receivers = Vec::new();
        for name in ["alice", "bob", "charlie"] {
            let (conn, rx) = connection(name);
            registry.register(conn).await;
            receivers.push(rx);
        }

        // when (操作):
        let mut visited = 0;
        let evicted = registry
            .for_each(&mut |conn: &Connection| {
                visited += 1;
                conn.push("ping").is_ok()
            })
            .await;

        // then (期待する結果):
        assert_eq!(visited, 3);
        assert!(evicted.is_empty());
        for rx in receivers.iter_mut() {
            assert_eq!(rx.recv().await, Some("ping".to_string()));
            assert!(rx.try_recv().is_err());
        }
    }

    #[tokio::test]
    async fn test_for_each_evicts_rejected_members() {
        // テスト項目: visit が false を返した接続は走査の中で解除される
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        let (alice, _rx_alice) = connection("alice");
        let (bob, rx_bob) = connection("bob");
        let bob_id = bob.id;
        registry.register(alice).await;
        registry.register(bob).await;
        drop(rx_bob);

        // when (操作):
        let evicted = registry
            .for_each(&mut |conn: &Connection| conn.push("hello").is_ok())
            .await;

        // then (期待する結果):
        assert_eq!(evicted, vec![bob_id]);
        assert_eq!(registry.count().await, 1);
        assert!(!registry.deregister(&bob_id).await);
    }

    #[tokio::test]
    async fn test_evicted_connection_closes_outbound_channel() {
        // テスト項目: 解除された接続の outbound channel は閉じられる
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        let (alice, mut rx) = connection("alice");
        registry.register(alice).await;

        // when (操作):
        registry.for_each(&mut |_conn: &Connection| false).await;

        // then (期待する結果): writer 側は None を受け取って終了できる
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_concurrent_register_and_deregister() {
        // テスト項目: 多数のタスクからの並行な登録・解除・走査で状態が壊れない
        // given (前提条件):
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let mut handles = Vec::new();

        // when (操作):
        for i in 0..50 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                let (conn, _rx) = connection(&format!("user{}", i));
                let id = conn.id;
                registry.register(conn).await;
                registry.for_each(&mut |_conn: &Connection| true).await;
                if i % 2 == 0 {
                    registry.deregister(&id).await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // then (期待する結果): 奇数番の 25 件だけが残る
        assert_eq!(registry.count().await, 25);
    }
}
