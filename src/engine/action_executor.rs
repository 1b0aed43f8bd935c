// ==========================================
// 工厂运营驾驶舱 - 调配动作执行器
// ==========================================
// 职责: 把单条调配建议落到花名册上（唯一的人员调动入口）
// 红线1: 只处理 Present 人员；不在岗/已分派人员视为过期引用，跳过并告警
// 红线2: MOVE 先校验目标产线，目标不存在时整条建议不生效
// 红线3: 匹配不到任何人员只告警，不报错
// 红线4: 被触达的产线版本号 +1
// ==========================================

use crate::domain::action::{status_for_task_category, ActionKind, ProposedAction};
use crate::domain::roster::{Roster, Worker};
use crate::domain::types::WorkerStatus;
use crate::engine::name_matcher::NameMatcher;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use tracing::instrument;

/// 执行结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionOutcome {
    /// 至少一名人员被调动
    Applied,
    /// 没有匹配到在岗人员
    NoMatch,
    /// MOVE 目标产线不存在
    MissingDestination,
}

/// 执行报告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReport {
    pub action: ActionKind,
    pub outcome: ExecutionOutcome,
    /// 实际被调动的人员ID
    pub affected_worker_ids: Vec<String>,
    /// 版本号被推进的产线
    pub touched_lines: Vec<String>,
}

impl ExecutionReport {
    fn empty(action: ActionKind, outcome: ExecutionOutcome) -> Self {
        Self {
            action,
            outcome,
            affected_worker_ids: Vec::new(),
            touched_lines: Vec::new(),
        }
    }

    pub fn is_applied(&self) -> bool {
        self.outcome == ExecutionOutcome::Applied
    }
}

/// 人员选择器：有ID按ID，否则按规范化姓名
enum WorkerSelector {
    Ids(HashSet<String>),
    Names(NameMatcher),
}

impl WorkerSelector {
    fn from_action(action: &ProposedAction) -> Self {
        if action.worker_ids().is_empty() {
            WorkerSelector::Names(NameMatcher::new(action.worker_names()))
        } else {
            WorkerSelector::Ids(action.worker_ids().iter().cloned().collect())
        }
    }

    fn selects(&self, worker: &Worker) -> bool {
        if !worker.status.is_present() {
            return false;
        }
        match self {
            WorkerSelector::Ids(ids) => ids.contains(&worker.id),
            WorkerSelector::Names(matcher) => matcher.matches(&worker.name),
        }
    }
}

// ==========================================
// ActionExecutor
// ==========================================
pub struct ActionExecutor {
    // 无状态引擎
}

impl ActionExecutor {
    pub fn new() -> Self {
        Self {}
    }

    /// 执行单条建议
    #[instrument(skip(self, action, roster), fields(kind = %action.kind(), workers = action.worker_names().len()))]
    pub fn apply_action(&self, action: &ProposedAction, roster: &mut Roster) -> ExecutionReport {
        let selector = WorkerSelector::from_action(action);
        let report = match action.kind() {
            ActionKind::Move => self.apply_move(action, &selector, roster),
            ActionKind::AssignTask => self.apply_assign(action, &selector, roster),
        };

        if report.outcome == ExecutionOutcome::NoMatch {
            tracing::warn!(
                "建议未匹配到在岗人员，已跳过: workers={:?}",
                action.worker_names()
            );
        }
        report
    }

    /// 从待执行列表取出第 index 条并执行（越界返回 None）
    pub fn execute_pending(
        &self,
        pending: &mut Vec<ProposedAction>,
        index: usize,
        roster: &mut Roster,
    ) -> Option<ExecutionReport> {
        if index >= pending.len() {
            tracing::warn!("待执行建议下标越界: index={}, len={}", index, pending.len());
            return None;
        }
        let action = pending.remove(index);
        Some(self.apply_action(&action, roster))
    }

    fn apply_move(
        &self,
        action: &ProposedAction,
        selector: &WorkerSelector,
        roster: &mut Roster,
    ) -> ExecutionReport {
        let Some(to_line) = action.to_line().map(str::to_string) else {
            tracing::warn!("MOVE 建议缺少目标产线，已跳过");
            return ExecutionReport::empty(ActionKind::Move, ExecutionOutcome::MissingDestination);
        };
        if roster.line(&to_line).is_none() {
            tracing::warn!("MOVE 目标产线不存在，已跳过: to_line={}", to_line);
            return ExecutionReport::empty(ActionKind::Move, ExecutionOutcome::MissingDestination);
        }

        // 1. 从所有产线摘出匹配的在岗人员
        let mut moved: Vec<Worker> = Vec::new();
        let mut touched: BTreeSet<String> = BTreeSet::new();
        for line in roster.lines_mut() {
            let before = moved.len();
            for list in [&mut line.current_workers, &mut line.buffers] {
                let (take, keep): (Vec<Worker>, Vec<Worker>) =
                    list.drain(..).partition(|w| selector.selects(w));
                *list = keep;
                moved.extend(take);
            }
            if moved.len() > before {
                line.bump_version();
                touched.insert(line.id.clone());
            }
        }

        if moved.is_empty() {
            return ExecutionReport::empty(ActionKind::Move, ExecutionOutcome::NoMatch);
        }

        // 2. 放入目标产线主岗名单
        let affected_worker_ids: Vec<String> = moved.iter().map(|w| w.id.clone()).collect();
        if let Some(dest) = roster.line_mut(&to_line) {
            for mut worker in moved {
                worker.status = WorkerStatus::Present;
                worker.assigned_line = to_line.clone();
                dest.current_workers.push(worker);
            }
            if !touched.contains(&to_line) {
                dest.bump_version();
                touched.insert(to_line.clone());
            }
        }

        tracing::info!(
            "MOVE 已执行: workers={:?}, to_line={}",
            affected_worker_ids,
            to_line
        );

        ExecutionReport {
            action: ActionKind::Move,
            outcome: ExecutionOutcome::Applied,
            affected_worker_ids,
            touched_lines: touched.into_iter().collect(),
        }
    }

    fn apply_assign(
        &self,
        action: &ProposedAction,
        selector: &WorkerSelector,
        roster: &mut Roster,
    ) -> ExecutionReport {
        let status = status_for_task_category(action.task_category());
        let mut affected_worker_ids = Vec::new();
        let mut touched = Vec::new();

        for line in roster.lines_mut() {
            let mut hit = false;
            for worker in line
                .current_workers
                .iter_mut()
                .chain(line.buffers.iter_mut())
                .filter(|w| selector.selects(w))
            {
                worker.status = status;
                affected_worker_ids.push(worker.id.clone());
                hit = true;
            }
            if hit {
                line.bump_version();
                touched.push(line.id.clone());
            }
        }

        if affected_worker_ids.is_empty() {
            return ExecutionReport::empty(ActionKind::AssignTask, ExecutionOutcome::NoMatch);
        }

        tracing::info!(
            "ASSIGN_TASK 已执行: workers={:?}, status={}",
            affected_worker_ids,
            status
        );

        ExecutionReport {
            action: ActionKind::AssignTask,
            outcome: ExecutionOutcome::Applied,
            affected_worker_ids,
            touched_lines: touched,
        }
    }
}

impl Default for ActionExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::action::TaskCategory;
    use crate::domain::roster::ProductionLine;
    use crate::domain::types::{Shift, WorkerType};

    fn roster() -> Roster {
        let l1 = ProductionLine::new("L1", "Line 1", 90, 2)
            .with_worker(Worker::new("W1", "John Smith", "L1", WorkerType::Main, Shift::A));
        let l2 = ProductionLine::new("L2", "Line 2", 90, 1)
            .with_worker(Worker::new("W2", "Amit Sharma", "L2", WorkerType::Main, Shift::A))
            .with_worker(Worker::new("W3", "Priya Rao", "L2", WorkerType::Buffer, Shift::A));
        Roster::new(vec![l1, l2]).unwrap()
    }

    fn mv(names: &[&str], to: &str) -> ProposedAction {
        ProposedAction::move_workers(
            String::new(),
            String::new(),
            vec![],
            names.iter().map(|n| n.to_string()).collect(),
            "L2",
            to,
        )
    }

    #[test]
    fn test_move_by_normalized_name() {
        let mut roster = roster();
        let report = ActionExecutor::new().apply_action(&mv(&["  priya   RAO "], "L1"), &mut roster);

        assert!(report.is_applied());
        assert_eq!(report.affected_worker_ids, vec!["W3".to_string()]);
        assert_eq!(report.touched_lines, vec!["L1".to_string(), "L2".to_string()]);

        let l1 = roster.line("L1").unwrap();
        assert_eq!(l1.current_workers.len(), 2);
        assert_eq!(l1.current_workers[1].assigned_line, "L1");
        assert_eq!(l1.version, 1);
        assert!(roster.line("L2").unwrap().buffers.is_empty());
    }

    #[test]
    fn test_move_missing_destination_keeps_roster() {
        let mut roster = roster();
        let before = roster.clone();
        let report = ActionExecutor::new().apply_action(&mv(&["Priya Rao"], "L9"), &mut roster);

        assert_eq!(report.outcome, ExecutionOutcome::MissingDestination);
        assert_eq!(roster, before);
    }

    #[test]
    fn test_assign_skips_non_present() {
        let mut roster = roster();
        let action = ProposedAction::assign_task(
            String::new(),
            String::new(),
            vec!["W2".to_string()],
            vec!["Amit Sharma".to_string()],
            "L2",
            TaskCategory::FiveS,
        );

        let executor = ActionExecutor::new();
        let first = executor.apply_action(&action, &mut roster);
        assert!(first.is_applied());
        assert_eq!(roster.find_worker("W2").unwrap().1.status, WorkerStatus::FiveS);

        // 已分派人员不再匹配
        let second = executor.apply_action(&action, &mut roster);
        assert_eq!(second.outcome, ExecutionOutcome::NoMatch);
        assert_eq!(roster.line_version("L2"), Some(1));
    }

    #[test]
    fn test_execute_pending_removes_action() {
        let mut roster = roster();
        let mut pending = vec![mv(&["Priya Rao"], "L1"), mv(&["Ghost"], "L1")];

        let executor = ActionExecutor::new();
        let report = executor.execute_pending(&mut pending, 1, &mut roster).unwrap();
        assert_eq!(report.outcome, ExecutionOutcome::NoMatch);
        assert_eq!(pending.len(), 1);

        assert!(executor.execute_pending(&mut pending, 5, &mut roster).is_none());
        assert_eq!(pending.len(), 1);
    }
}
