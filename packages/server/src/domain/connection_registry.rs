//! Connection registry trait 定義
//!
//! 接続中の WebSocket セッションを管理するインターフェース。
//! 複数タスクから同時に変更される唯一の共有状態です。

use async_trait::async_trait;

use super::{Connection, ConnectionId};

/// Connection Registry
///
/// 登録・解除・全件走査は互いに排他的に実行される。
/// メンバー間の順序は保証しない。
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// 接続を登録
    async fn register(&self, connection: Connection);

    /// 接続を登録解除
    ///
    /// 実際に削除した場合のみ `true` を返す（二重解除は `false`）。
    async fn deregister(&self, id: &ConnectionId) -> bool;

    /// 呼び出し時点のメンバー全員に `visit` を適用
    ///
    /// `visit` が `false` を返した接続はその場で登録解除され、
    /// 解除された接続の ID を返す。走査中は登録・解除がブロックされる。
    async fn for_each(
        &self,
        visit: &mut (dyn for<'c> FnMut(&'c Connection) -> bool + Send),
    ) -> Vec<ConnectionId>;

    /// 接続数を取得
    async fn count(&self) -> usize;
}
