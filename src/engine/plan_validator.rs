// ==========================================
// 工厂运营驾驶舱 - 调配方案校验器
// ==========================================
// 职责: 按规划契约校验任意规划器（外部/本地）的输出
// 校验项: 动作顺序、来源安全、分组人数、人员身份、产线存在性、人员重复、缺员补足
// 说明: 外部规划服务的输出校验失败视同格式错误，由上层切换到本地求解器
// ==========================================

use crate::domain::action::{ActionKind, RebalancingResponse};
use crate::domain::snapshot::LineSnapshot;
use crate::engine::continuity_solver::MAX_TASK_GROUP_SIZE;
use crate::engine::name_matcher::normalize_name;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// 方案违规项
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanViolation {
    #[error("第{index}条建议未指定人员")]
    EmptyWorkers { index: usize },

    #[error("第{index}条任务分派人数超限: {size} > {max}")]
    TaskGroupTooLarge { index: usize, size: usize, max: usize },

    #[error("第{index}条补位建议出现在任务分派之后")]
    MoveAfterTask { index: usize },

    #[error("第{index}条任务分派时产线 {line_id} 仍缺员")]
    TaskBeforeContinuity { index: usize, line_id: String },

    #[error("第{index}条建议引用了不在岗人员: {name}")]
    UnknownWorker { index: usize, name: String },

    #[error("第{index}条建议引用了未知产线: {line_id}")]
    UnknownLine { index: usize, line_id: String },

    #[error("第{index}条补位建议缺少目标产线")]
    MissingDestination { index: usize },

    #[error("第{index}条建议使 {line_id} 低于定员 ({present} < {required})")]
    SourceBelowRequired {
        index: usize,
        line_id: String,
        present: usize,
        required: usize,
    },

    #[error("第{index}条建议重复使用人员: {name}")]
    DuplicateWorker { index: usize, name: String },

    #[error("产线 {line_id} 仍缺员 {remaining} 人（富余人员未用尽）")]
    UnresolvedDeficit { line_id: String, remaining: usize },
}

/// 在岗人员定位（规范化姓名 -> 产线ID）
struct PresenceIndex {
    by_name: HashMap<String, String>,
    by_id: HashMap<String, String>,
}

impl PresenceIndex {
    fn new(snapshots: &[LineSnapshot]) -> Self {
        let mut by_name = HashMap::new();
        let mut by_id = HashMap::new();
        for line in snapshots {
            for name in &line.present_worker_names {
                by_name
                    .entry(normalize_name(name))
                    .or_insert_with(|| line.line_id.clone());
            }
            for worker in &line.present_workers {
                by_id.insert(worker.id.clone(), line.line_id.clone());
            }
        }
        Self { by_name, by_id }
    }
}

/// 校验调配方案
///
/// # 返回
/// - Ok(()): 满足全部约束
/// - Err(violations): 全部违规项（按建议顺序）
pub fn validate_plan(
    snapshots: &[LineSnapshot],
    response: &RebalancingResponse,
) -> Result<(), Vec<PlanViolation>> {
    let index = PresenceIndex::new(snapshots);
    let required: HashMap<&str, usize> = snapshots
        .iter()
        .map(|s| (s.line_id.as_str(), s.required))
        .collect();
    let mut present: HashMap<String, usize> = snapshots
        .iter()
        .map(|s| (s.line_id.clone(), s.present))
        .collect();

    let mut violations = Vec::new();
    let mut used: HashSet<String> = HashSet::new();
    let mut seen_task = false;

    for (i, action) in response.suggestions.iter().enumerate() {
        let meta = &action.execution_metadata;

        if meta.worker_names.is_empty() && meta.worker_ids.is_empty() {
            violations.push(PlanViolation::EmptyWorkers { index: i });
            continue;
        }

        for line_id in [meta.from_line.as_deref(), meta.to_line.as_deref()]
            .into_iter()
            .flatten()
        {
            if !required.contains_key(line_id) {
                violations.push(PlanViolation::UnknownLine {
                    index: i,
                    line_id: line_id.to_string(),
                });
            }
        }

        match meta.action {
            ActionKind::Move => {
                if seen_task {
                    violations.push(PlanViolation::MoveAfterTask { index: i });
                }
                if meta.to_line.is_none() {
                    violations.push(PlanViolation::MissingDestination { index: i });
                }
            }
            ActionKind::AssignTask => {
                let size = meta.worker_names.len().max(meta.worker_ids.len());
                if size > MAX_TASK_GROUP_SIZE {
                    violations.push(PlanViolation::TaskGroupTooLarge {
                        index: i,
                        size,
                        max: MAX_TASK_GROUP_SIZE,
                    });
                }
                if !seen_task {
                    seen_task = true;
                    for line in snapshots {
                        let now = present.get(&line.line_id).copied().unwrap_or(0);
                        if now < line.required {
                            violations.push(PlanViolation::TaskBeforeContinuity {
                                index: i,
                                line_id: line.line_id.clone(),
                            });
                        }
                    }
                }
            }
        }

        // 人员逐个定位来源产线（优先ID，其次姓名）
        let origins: Vec<(String, Option<String>)> = if meta.worker_ids.is_empty() {
            meta.worker_names
                .iter()
                .map(|n| {
                    let key = normalize_name(n);
                    let origin = index.by_name.get(&key).cloned();
                    (key, origin)
                })
                .collect()
        } else {
            meta.worker_ids
                .iter()
                .map(|id| (id.clone(), index.by_id.get(id).cloned()))
                .collect()
        };

        for (key, origin) in origins {
            let Some(origin) = origin else {
                violations.push(PlanViolation::UnknownWorker { index: i, name: key });
                continue;
            };
            if !used.insert(key.clone()) {
                violations.push(PlanViolation::DuplicateWorker { index: i, name: key });
                continue;
            }

            // MOVE 与 ASSIGN_TASK 都会使来源产线在岗人数 -1
            let count = present.entry(origin.clone()).or_insert(0);
            *count = count.saturating_sub(1);
            let line_required = required.get(origin.as_str()).copied().unwrap_or(0);
            let is_self_move = meta.action == ActionKind::Move
                && meta.to_line.as_deref() == Some(origin.as_str());
            if *count < line_required && !is_self_move {
                violations.push(PlanViolation::SourceBelowRequired {
                    index: i,
                    line_id: origin.clone(),
                    present: *count,
                    required: line_required,
                });
            }

            if meta.action == ActionKind::Move {
                if let Some(to_line) = meta.to_line.as_deref() {
                    *present.entry(to_line.to_string()).or_insert(0) += 1;
                }
            }
        }
    }

    // 缺员补足: 可补足的缺员数 = min(总富余, 总缺员)，方案执行后必须全部补上
    let total_surplus: usize = snapshots.iter().map(|s| s.surplus).sum();
    let total_deficit: usize = snapshots.iter().map(|s| s.deficit).sum();
    let remaining: Vec<(&str, usize)> = snapshots
        .iter()
        .filter(|s| s.deficit > 0)
        .map(|s| {
            let now = present.get(&s.line_id).copied().unwrap_or(0);
            (s.line_id.as_str(), s.required.saturating_sub(now).min(s.deficit))
        })
        .collect();
    let resolved = total_deficit - remaining.iter().map(|(_, r)| r).sum::<usize>();
    if resolved < total_surplus.min(total_deficit) {
        for (line_id, remaining) in remaining.into_iter().filter(|(_, r)| *r > 0) {
            violations.push(PlanViolation::UnresolvedDeficit {
                line_id: line_id.to_string(),
                remaining,
            });
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}
