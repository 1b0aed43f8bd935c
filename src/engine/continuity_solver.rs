// ==========================================
// 工厂运营驾驶舱 - 连续性优先求解器（本地兜底规划器）
// ==========================================
// 红线1（连续性原则）: 先补齐所有缺员产线，补位动作全部排在任务分派之前
// 红线2（来源安全）: 只从 present > required 的产线调出，调到 present == required 即停止
// 红线3（生产力原则）: 剩余富余人员按 ≤2 人一组分派增值任务，任务类别轮转
// ==========================================
// 输入: 产线快照（按声明顺序）+ 事件描述（仅作上下文，不解析）
// 输出: { suggestions }
// ==========================================

use crate::domain::action::{ProposedAction, RebalancingResponse, TaskCategory};
use crate::domain::snapshot::LineSnapshot;
use std::collections::VecDeque;
use tracing::instrument;

/// 单个增值任务分组的人数上限
pub const MAX_TASK_GROUP_SIZE: usize = 2;

/// 可调出人员（带来源产线）
#[derive(Debug, Clone)]
struct Donor {
    worker_id: Option<String>,
    name: String,
    from_line_id: String,
    from_line_name: String,
}

// ==========================================
// ContinuityFirstSolver
// ==========================================
pub struct ContinuityFirstSolver {
    // 无状态引擎
}

impl ContinuityFirstSolver {
    pub fn new() -> Self {
        Self {}
    }

    /// 求解调配建议
    ///
    /// 规则：
    /// 1) 缺员产线按输入顺序处理
    /// 2) 富余产线取在岗名单末尾 surplus 人组成调出队列（尾部淘汰，确定性）
    /// 3) 每调一人生成一条 MOVE，直到缺员补齐或队列耗尽
    /// 4) 队列剩余人员按 ≤2 人一组生成 ASSIGN_TASK，类别轮转
    ///
    /// 总富余不足以覆盖总缺员时，按产线顺序尽量补位，剩余缺员保持未解决
    #[instrument(skip(self, snapshots, event), fields(lines = snapshots.len()))]
    pub fn solve(&self, snapshots: &[LineSnapshot], event: &str) -> RebalancingResponse {
        tracing::debug!("本地求解器启动: event={}", event);

        let mut donors = self.build_donor_queue(snapshots);
        let mut suggestions = Vec::new();

        // 1. 连续性原则：补齐缺员
        for line in snapshots.iter().filter(|s| s.deficit > 0) {
            let mut filled = 0;
            while filled < line.deficit {
                let Some(donor) = donors.pop_front() else {
                    tracing::warn!(
                        "富余人员已耗尽，产线 {} 仍缺员 {} 人",
                        line.line_id,
                        line.deficit - filled
                    );
                    break;
                };

                suggestions.push(ProposedAction::move_workers(
                    format!("连续性原则: {} 缺员补位", line.line_name),
                    format!(
                        "紧急: {} 在岗人数低于定员 ({})。将 {} 从 {} 调入以保证连续生产。",
                        line.line_name, line.required, donor.name, donor.from_line_name
                    ),
                    donor.worker_id.clone().into_iter().collect(),
                    vec![donor.name.clone()],
                    &donor.from_line_id,
                    &line.line_id,
                ));
                filled += 1;
            }
        }

        // 2. 生产力原则：剩余富余人员转增值任务
        let mut group_index = 0;
        while !donors.is_empty() {
            let group_size = MAX_TASK_GROUP_SIZE.min(donors.len());
            let group: Vec<Donor> = donors.drain(..group_size).collect();
            let category = TaskCategory::round_robin(group_index);

            // 人员ID必须全部已知才携带，否则只按姓名匹配
            let worker_ids: Vec<String> = if group.iter().all(|d| d.worker_id.is_some()) {
                group.iter().filter_map(|d| d.worker_id.clone()).collect()
            } else {
                Vec::new()
            };
            let worker_names: Vec<String> = group.iter().map(|d| d.name.clone()).collect();

            suggestions.push(ProposedAction::assign_task(
                format!("生产力原则: {}", category),
                format!(
                    "优化: 各产线已稳定。富余人员 ({}) 转入 {} 增值任务。",
                    worker_names.join(", "),
                    category
                ),
                worker_ids,
                worker_names,
                &group[0].from_line_id,
                category,
            ));
            group_index += 1;
        }

        tracing::info!(
            "本地求解完成: suggestions={}, moves={}",
            suggestions.len(),
            suggestions
                .iter()
                .filter(|s| s.execution_metadata.to_line.is_some())
                .count()
        );

        RebalancingResponse { suggestions }
    }

    /// 构建调出队列（按产线顺序，每条富余产线取在岗名单末尾 surplus 人）
    fn build_donor_queue(&self, snapshots: &[LineSnapshot]) -> VecDeque<Donor> {
        let mut queue = VecDeque::new();

        for line in snapshots.iter().filter(|s| s.surplus > 0) {
            let names = &line.present_worker_names;
            let ids_aligned = line.present_workers.len() == names.len();
            let start = names.len().saturating_sub(line.surplus);

            for idx in start..names.len() {
                queue.push_back(Donor {
                    worker_id: if ids_aligned {
                        Some(line.present_workers[idx].id.clone())
                    } else {
                        None
                    },
                    name: names[idx].clone(),
                    from_line_id: line.line_id.clone(),
                    from_line_name: line.line_name.clone(),
                });
            }
        }

        queue
    }
}

impl Default for ContinuityFirstSolver {
    fn default() -> Self {
        Self::new()
    }
}
