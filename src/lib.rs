// ==========================================
// 工厂运营驾驶舱 - 核心库
// ==========================================
// 范围: 产线人力再平衡 + 停机设备负载重分配
// 技术栈: Rust + tokio + reqwest
// 系统定位: 决策支持系统 (人工最终确认执行)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 业务规则
pub mod engine;

// 决策层 - 规划器与兜底编排
pub mod decision;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 装配与后台任务
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    MachineState, RiskLevel, ServiceStage, ServiceType, Shift, WorkerStatus, WorkerType,
};

// 领域实体
pub use domain::{
    LineSnapshot, MachineFleet, MachineStatus, ProductionLine, ProposedAction,
    RebalancingResponse, RedistributionStrategy, Roster, RosterSummary, VendorEstimate, Worker,
};

// 引擎
pub use engine::{
    ActionExecutor, ContinuityFirstSolver, LoadRedistributionSolver, ScenarioTrigger,
    SnapshotBuilder,
};

// 决策
pub use decision::{HttpPlanner, LaborAdvisor, LocalPlanner, RebalancingPlanner, RetryPolicy};

// API
pub use api::{ApiError, ApiResult, LaborApi, MachineApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "工厂运营驾驶舱";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
