// ==========================================
// 工厂运营驾驶舱 - 快照构建器
// ==========================================
// 输入: 花名册
// 输出: 每条产线一个 LineSnapshot，顺序与产线声明顺序一致
// 性质: 纯函数，无副作用，空花名册返回空列表
// ==========================================

use crate::domain::roster::Roster;
use crate::domain::snapshot::{AllocationSummary, LineSnapshot, RosterSummary, SnapshotWorker};
use crate::domain::types::WorkerStatus;

// ==========================================
// SnapshotBuilder - 快照构建器
// ==========================================
pub struct SnapshotBuilder {
    // 无状态
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self {}
    }

    /// 构建全部产线快照
    pub fn build(&self, roster: &Roster) -> Vec<LineSnapshot> {
        roster
            .lines()
            .iter()
            .map(|line| {
                let present_workers: Vec<SnapshotWorker> = line
                    .present_workers()
                    .map(|w| SnapshotWorker {
                        id: w.id.clone(),
                        name: w.name.clone(),
                    })
                    .collect();
                let present = present_workers.len();
                let required = line.required_manpower;

                LineSnapshot {
                    line_id: line.id.clone(),
                    line_name: line.name.clone(),
                    required,
                    present,
                    surplus: present.saturating_sub(required),
                    deficit: required.saturating_sub(present),
                    present_worker_names: present_workers.iter().map(|w| w.name.clone()).collect(),
                    present_workers,
                    version: line.version,
                }
            })
            .collect()
    }

    /// 人员分布与缺员汇总
    pub fn summarize(&self, roster: &Roster) -> RosterSummary {
        let mut allocation = AllocationSummary::default();
        let mut total_workers = 0;

        for worker in roster.workers() {
            total_workers += 1;
            match worker.status {
                WorkerStatus::Present => allocation.present += 1,
                WorkerStatus::Absent | WorkerStatus::OnLeave | WorkerStatus::Emergency => {
                    allocation.absent += 1
                }
                WorkerStatus::Maintenance => allocation.maintenance += 1,
                WorkerStatus::Tpm => allocation.tpm += 1,
                WorkerStatus::FiveS => allocation.five_s += 1,
                WorkerStatus::Training => allocation.training += 1,
                WorkerStatus::AuditPrep => allocation.audit_prep += 1,
                WorkerStatus::Support => allocation.support += 1,
            }
        }

        let snapshots = self.build(roster);
        RosterSummary {
            allocation,
            total_workers,
            total_surplus: snapshots.iter().map(|s| s.surplus).sum(),
            total_deficit: snapshots.iter().map(|s| s.deficit).sum(),
            short_lines: snapshots
                .iter()
                .filter(|s| s.is_short())
                .map(|s| s.line_id.clone())
                .collect(),
        }
    }
}

impl Default for SnapshotBuilder {
    fn default() -> Self {
        Self::new()
    }
}
