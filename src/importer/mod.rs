// ==========================================
// 工厂运营驾驶舱 - 导入层
// ==========================================
// 职责: 花名册 CSV 导入、按班次组装、演示数据生成
// 红线: 导入层只产出经过校验的 Roster，不触碰运行时状态
// ==========================================

pub mod demo_seed;
pub mod error;
pub mod roster_importer;

pub use demo_seed::{demo_fleet, demo_line_definitions, demo_roster, demo_worker_pool, DEMO_LINE_NAMES};
pub use error::ImportError;
pub use roster_importer::{LineDefinition, RosterImporter};
