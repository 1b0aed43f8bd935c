// ==========================================
// 工厂运营驾驶舱 - 场景触发器
// ==========================================
// 职责: 演练场景下批量改写人员状态，并给出下一次求解使用的事件描述
// 场景1: 全员出勤（富余人员优化）
// 场景2: 单线缺勤（前 N 名主岗 + 全部机动缺勤）
// ==========================================

use crate::domain::roster::Roster;
use crate::domain::types::WorkerStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 演练场景
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScenarioKind {
    SurplusOptimization,
    AbsenteeismRebalance,
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioKind::SurplusOptimization => write!(f, "SURPLUS_OPTIMIZATION"),
            ScenarioKind::AbsenteeismRebalance => write!(f, "ABSENTEEISM_REBALANCE"),
        }
    }
}

// ==========================================
// ScenarioTrigger
// ==========================================
pub struct ScenarioTrigger {
    // 无状态
}

impl ScenarioTrigger {
    pub fn new() -> Self {
        Self {}
    }

    /// 全员出勤：所有人员置为 Present
    pub fn full_attendance(&self, roster: &mut Roster) -> String {
        for line in roster.lines_mut() {
            let mut changed = false;
            for worker in line.current_workers.iter_mut().chain(line.buffers.iter_mut()) {
                if worker.status != WorkerStatus::Present {
                    worker.status = WorkerStatus::Present;
                    changed = true;
                }
            }
            if changed {
                line.bump_version();
            }
        }

        tracing::info!("场景触发: 全员出勤");
        "SITUATION: 100% Attendance. Identify and reallocate surplus workers to TPM, 5S, or training."
            .to_string()
    }

    /// 单线缺勤：前 absent_main 名主岗与全部机动置为 Absent
    ///
    /// 产线不存在时返回 None，花名册不变
    pub fn absenteeism(&self, roster: &mut Roster, line_id: &str, absent_main: usize) -> Option<String> {
        let Some(line) = roster.line_mut(line_id) else {
            tracing::warn!("场景触发失败，产线不存在: line_id={}", line_id);
            return None;
        };

        for worker in line.current_workers.iter_mut().take(absent_main) {
            worker.status = WorkerStatus::Absent;
        }
        for worker in line.buffers.iter_mut() {
            worker.status = WorkerStatus::Absent;
        }
        line.bump_version();

        let total = line.current_workers.len() + line.buffers.len();
        let absent = line.all_workers().filter(|w| w.status.is_away()).count();
        let pct = if total == 0 {
            0
        } else {
            ((absent as f64 / total as f64) * 100.0).round() as u32
        };

        tracing::info!(
            "场景触发: {} 缺勤 {}/{} ({}%)",
            line.id,
            absent,
            total,
            pct
        );

        Some(format!(
            "{} Crisis: {}% Absenteeism. Prioritize P1 continuity by moving surplus workers from other lines.",
            line.name, pct
        ))
    }
}

impl Default for ScenarioTrigger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::roster::{ProductionLine, Worker};
    use crate::domain::types::{Shift, WorkerType};

    fn line(id: &str) -> ProductionLine {
        let mut line = ProductionLine::new(id, format!("Line {}", &id[1..]), 90, 4);
        for i in 0..6 {
            let worker_type = if i < 4 { WorkerType::Main } else { WorkerType::Buffer };
            line.push_worker(Worker::new(format!("{}-{}", id, i), format!("{} W{}", id, i), id, worker_type, Shift::A));
        }
        line
    }

    #[test]
    fn test_absenteeism_marks_first_main_and_all_buffers() {
        let mut roster = Roster::new(vec![line("L1"), line("L2")]).unwrap();
        let event = ScenarioTrigger::new().absenteeism(&mut roster, "L2", 3).unwrap();

        let l2 = roster.line("L2").unwrap();
        assert_eq!(l2.present_count(), 1);
        assert_eq!(l2.current_workers[3].status, WorkerStatus::Present);
        assert!(event.starts_with("Line 2 Crisis: 83% Absenteeism"));
        assert_eq!(roster.line("L1").unwrap().present_count(), 6);
    }

    #[test]
    fn test_full_attendance_restores_everyone() {
        let mut roster = Roster::new(vec![line("L1")]).unwrap();
        let trigger = ScenarioTrigger::new();
        trigger.absenteeism(&mut roster, "L1", 2).unwrap();

        let event = trigger.full_attendance(&mut roster);
        assert!(event.contains("100% Attendance"));
        assert_eq!(roster.line("L1").unwrap().present_count(), 6);
    }

    #[test]
    fn test_absenteeism_unknown_line() {
        let mut roster = Roster::new(vec![line("L1")]).unwrap();
        assert!(ScenarioTrigger::new().absenteeism(&mut roster, "L9", 3).is_none());
    }
}
