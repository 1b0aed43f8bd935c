// ==========================================
// 工厂运营驾驶舱 - 配置层
// ==========================================
// 职责: 引擎配置定义、加载与覆写
// 存储: JSON 配置文件 + FACTORY_OPS_* 环境变量
// ==========================================

pub mod config_manager;
pub mod engine_config;

// 重导出核心配置管理器
pub use config_manager::{apply_overrides, config_keys, validate, ConfigError, ConfigManager};
pub use engine_config::{EngineConfig, LaborConfig, PlannerConfig};
