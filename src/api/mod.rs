// ==========================================
// 工厂运营驾驶舱 - API 层
// ==========================================
// 职责: 提供业务 API 接口，供宿主程序与刷新任务调用
// ==========================================

pub mod error;
pub mod labor_api;
pub mod machine_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use labor_api::{LaborApi, PendingSuggestion, SuggestionBoard};
pub use machine_api::{
    MachineApi, ServiceAnalysis, ServiceBooking, ServiceRecommendation, ServiceRequest,
};
