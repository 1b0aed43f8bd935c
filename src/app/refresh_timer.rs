// ==========================================
// 工厂运营驾驶舱 - 快照刷新任务
// ==========================================
// 职责: 按固定间隔重建产线快照，通过 watch 通道发布最新一帧
// 红线: 只读花名册；收到关闭信号后在当前 tick 结束时退出
// ==========================================

use crate::api::{ApiResult, LaborApi};
use crate::domain::snapshot::{LineSnapshot, RosterSummary};
use crate::domain::types::Shift;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// 一帧快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotFrame {
    pub refreshed_at: DateTime<Utc>,
    /// 按本地时间推算的当前班次
    pub current_shift: Shift,
    pub lines: Vec<LineSnapshot>,
    pub summary: RosterSummary,
}

impl SnapshotFrame {
    pub fn capture(api: &LaborApi) -> ApiResult<Self> {
        Ok(Self {
            refreshed_at: Utc::now(),
            current_shift: Shift::for_time(Local::now().time()),
            lines: api.get_snapshot()?,
            summary: api.get_summary()?,
        })
    }
}

// ==========================================
// SnapshotRefresher
// ==========================================
pub struct SnapshotRefresher {
    shutdown_tx: watch::Sender<bool>,
    frame_rx: watch::Receiver<Option<SnapshotFrame>>,
    handle: JoinHandle<u64>,
}

impl SnapshotRefresher {
    /// 启动刷新任务（需在 tokio 运行时内调用）
    ///
    /// # 参数
    /// - period: 刷新间隔；首帧立即发布
    pub fn spawn(api: Arc<LaborApi>, period: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let (frame_tx, frame_rx) = watch::channel(None);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut ticks = 0u64;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match SnapshotFrame::capture(&api) {
                            Ok(frame) => {
                                frame_tx.send_replace(Some(frame));
                                ticks += 1;
                            }
                            Err(e) => tracing::warn!("快照刷新失败: {}", e),
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            tracing::debug!("快照刷新任务退出: ticks={}", ticks);
            ticks
        });

        tracing::info!("快照刷新任务已启动: period={:?}", period);
        Self {
            shutdown_tx,
            frame_rx,
            handle,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<SnapshotFrame>> {
        self.frame_rx.clone()
    }

    pub fn latest(&self) -> Option<SnapshotFrame> {
        self.frame_rx.borrow().clone()
    }

    /// 发送关闭信号并等待任务退出
    ///
    /// # 返回
    /// - 成功发布的帧数
    /// - Err(Other): 任务被取消或 panic
    pub async fn shutdown(self) -> ApiResult<u64> {
        self.shutdown_tx.send_replace(true);
        let ticks = self
            .handle
            .await
            .map_err(|e| anyhow::Error::new(e).context("快照刷新任务异常结束"))?;
        Ok(ticks)
    }
}
