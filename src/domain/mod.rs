// ==========================================
// 工厂运营驾驶舱 - 领域模型层
// ==========================================
// 职责: 定义花名册、快照、调配建议、设备台账等领域对象
// 红线: 不含引擎逻辑，不含外部调用
// ==========================================

pub mod action;
pub mod machine;
pub mod roster;
pub mod snapshot;
pub mod types;

// 重导出核心类型
pub use action::{
    status_for_task_category, ActionKind, ExecutionMetadata, ProposedAction, RebalancingResponse,
    TaskCategory,
};
pub use machine::{
    compute_utilization, MachineFleet, MachineStatus, RedistributionStep, RedistributionStrategy,
    VendorEstimate,
};
pub use roster::{LineVersions, ProductionLine, Roster, RosterError, Worker};
pub use snapshot::{AllocationSummary, LineSnapshot, RosterSummary, SnapshotWorker};
pub use types::{
    MachineState, RiskLevel, ServiceStage, ServiceType, Shift, WorkerStatus, WorkerType,
};
