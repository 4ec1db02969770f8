//! Retention sweeper
//!
//! 一定間隔で期限切れメッセージの削除を実行するバックグラウンドタスク。
//! 1 回の失敗はログに残すだけで、次の tick も予定どおり実行されます。
//! Registry や Dispatcher とは一切協調しません。

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::oneshot,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};

use crate::{
    config::MAX_SWEEP_INTERVAL,
    usecase::{PurgeError, PurgeExpiredMessagesUseCase},
};

/// tokio の interval は 0 の周期を受け付けない
const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

/// 期限切れメッセージを定期削除するタスク
pub struct RetentionSweeper {
    usecase: Arc<PurgeExpiredMessagesUseCase>,
    interval: Duration,
}

impl RetentionSweeper {
    /// `interval` は 1ms 以上 [`MAX_SWEEP_INTERVAL`] 以下に丸められる
    pub fn new(usecase: Arc<PurgeExpiredMessagesUseCase>, interval: Duration) -> Self {
        let clamped = interval.clamp(MIN_SWEEP_INTERVAL, MAX_SWEEP_INTERVAL);
        if clamped != interval {
            tracing::warn!(
                "Sweep interval {:?} out of range, using {:?}",
                interval,
                clamped
            );
        }
        Self {
            usecase,
            interval: clamped,
        }
    }

    /// 1 回だけ削除を実行
    pub async fn sweep_once(&self) -> Result<u64, PurgeError> {
        let result = self.usecase.execute().await;
        match &result {
            Ok(deleted) => tracing::info!(
                "Retention sweep deleted {} message(s) older than {:?}",
                deleted,
                self.usecase.retention_window()
            ),
            Err(e) => tracing::error!("Retention sweep failed: {}", e),
        }
        result
    }

    /// タスクを起動
    ///
    /// 最初の削除は起動から `interval` 経過後に行われる。返されたハンドルを
    /// drop するとタスクも停止するため、プロセスの終了まで保持すること。
    pub fn start(self) -> SweeperHandle {
        let (shutdown, mut shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::info!("Retention sweeper started (every {:?})", self.interval);

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        // 失敗は sweep_once がログに残す
                        let _ = self.sweep_once().await;
                    }
                }
            }

            tracing::info!("Retention sweeper stopped");
        });

        SweeperHandle { shutdown, task }
    }
}

/// 起動済み RetentionSweeper のハンドル
pub struct SweeperHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// タスクを停止し、終了を待つ
    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.task.await {
            tracing::warn!("Retention sweeper task ended abnormally: {}", e);
        }
    }
}
