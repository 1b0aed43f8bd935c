// ==========================================
// 工厂运营驾驶舱 - 决策层模块
// ==========================================
// 职责: 规划器契约、外部规划服务调用、统一重试、本地兜底编排
// 系统定位: 决策支持（人工最终确认执行）
// 架构原则:
// - 外部规划服务与本地求解器实现同一个 Trait，可互相替换
// - 外部输出必须经过与本地求解器相同的契约校验
// - 所有外部调用共用一个重试策略
// ==========================================

pub mod error;
pub mod http_planner;
pub mod labor_advisor;
pub mod planner;
pub mod retry;

// 重导出核心类型
pub use error::PlannerError;
pub use http_planner::HttpPlanner;
pub use labor_advisor::{AdvisedPlan, LaborAdvisor, PlanSource};
pub use planner::{LocalPlanner, PlannerRequest, RebalancingPlanner};
pub use retry::{call_with_retry, RetryPolicy};
