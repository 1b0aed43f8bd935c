// ==========================================
// 工厂运营驾驶舱 - 引擎层
// ==========================================
// 职责: 快照、求解、校验、执行、场景、负载重分配等纯业务规则
// 红线: 引擎不做网络调用，不持有全局状态
// ==========================================

pub mod action_executor;
pub mod continuity_solver;
pub mod load_redistribution;
pub mod name_matcher;
pub mod plan_validator;
pub mod scenario;
pub mod snapshot;

// 重导出核心引擎
pub use action_executor::{ActionExecutor, ExecutionOutcome, ExecutionReport};
pub use continuity_solver::{ContinuityFirstSolver, MAX_TASK_GROUP_SIZE};
pub use load_redistribution::{
    LoadRedistributionSolver, RedistributionConfig, RedistributionError, RedistributionPolicy,
    ServiceProgress,
};
pub use name_matcher::{normalize_name, NameMatcher};
pub use plan_validator::{validate_plan, PlanViolation};
pub use scenario::{ScenarioKind, ScenarioTrigger};
pub use snapshot::SnapshotBuilder;
