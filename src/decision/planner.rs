// ==========================================
// 工厂运营驾驶舱 - 调配规划器 Trait
// ==========================================
// 职责: 定义规划器契约（外部规划服务与本地求解器共用）
// 输入: { event, snapshot: LineSnapshot[] }
// 输出: { suggestions: ProposedAction[] }
// 红线: 任何实现都必须满足连续性优先/来源安全/分组≤2/姓名可匹配
// ==========================================

use crate::decision::error::PlannerError;
use crate::domain::action::RebalancingResponse;
use crate::domain::snapshot::LineSnapshot;
use crate::engine::continuity_solver::ContinuityFirstSolver;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// 规划请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerRequest {
    /// 事件描述（仅作上下文）
    pub event: String,
    pub snapshot: Vec<LineSnapshot>,
}

impl PlannerRequest {
    pub fn new(event: impl Into<String>, snapshot: Vec<LineSnapshot>) -> Self {
        Self {
            event: event.into(),
            snapshot,
        }
    }
}

// ==========================================
// RebalancingPlanner Trait
// ==========================================
// 实现者: HttpPlanner（外部规划服务）、LocalPlanner（本地求解器）
#[async_trait]
pub trait RebalancingPlanner: Send + Sync {
    /// 规划器名称（写入方案来源）
    fn name(&self) -> &str;

    /// 生成调配建议
    async fn plan(&self, request: &PlannerRequest) -> Result<RebalancingResponse, PlannerError>;
}

/// 本地规划器（连续性优先求解器的 Trait 适配）
pub struct LocalPlanner {
    solver: ContinuityFirstSolver,
}

impl LocalPlanner {
    pub fn new() -> Self {
        Self {
            solver: ContinuityFirstSolver::new(),
        }
    }

    /// 同步求解（本地求解器不会失败）
    pub fn solve(&self, request: &PlannerRequest) -> RebalancingResponse {
        self.solver.solve(&request.snapshot, &request.event)
    }
}

impl Default for LocalPlanner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RebalancingPlanner for LocalPlanner {
    fn name(&self) -> &str {
        "local-continuity-first"
    }

    async fn plan(&self, request: &PlannerRequest) -> Result<RebalancingResponse, PlannerError> {
        Ok(self.solve(request))
    }
}
