// ==========================================
// 工厂运营驾驶舱 - 应用层
// ==========================================
// 职责: 装配 API 实例，管理共享状态与后台刷新任务
// ==========================================

pub mod refresh_timer;
pub mod state;

// 重导出
pub use refresh_timer::{SnapshotFrame, SnapshotRefresher};
pub use state::{get_default_config_path, AppState};
