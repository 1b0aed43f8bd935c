// ==========================================
// 工厂运营驾驶舱 - 应用状态
// ==========================================
// 职责: 按配置装配决策层与 API 实例，管理共享状态
// ==========================================

use crate::api::{ApiResult, LaborApi, MachineApi};
use crate::app::refresh_timer::SnapshotRefresher;
use crate::config::config_manager::{config_keys, ConfigManager};
use crate::decision::{HttpPlanner, LaborAdvisor, RebalancingPlanner};
use crate::domain::machine::MachineFleet;
use crate::domain::roster::Roster;
use crate::domain::types::Shift;
use crate::engine::load_redistribution::LoadRedistributionSolver;
use crate::importer::{demo_fleet, demo_roster};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 配置管理器
    pub config: Arc<ConfigManager>,

    /// 人力调配API
    pub labor_api: Arc<LaborApi>,

    /// 设备服务API
    pub machine_api: Arc<MachineApi>,
}

impl AppState {
    /// 按配置文件装配，并使用指定班次的演示数据
    ///
    /// # 参数
    /// - config_path: 配置文件路径（不存在时使用默认配置）
    pub fn new(config_path: &Path, shift: Shift) -> ApiResult<Self> {
        tracing::info!("初始化AppState，配置路径: {}", config_path.display());
        let manager = ConfigManager::load(config_path)?;
        Self::from_parts(manager, demo_roster(shift)?, demo_fleet())
    }

    /// 用已有的配置、花名册与设备台账装配
    ///
    /// # 说明
    /// 配置了外部规划服务时，调配顾问先走外部服务再本地兜底；否则只用本地求解器
    pub fn from_parts(manager: ConfigManager, roster: Roster, fleet: MachineFleet) -> ApiResult<Self> {
        let config = manager.config().clone();

        let delegated: Option<Arc<dyn RebalancingPlanner>> = match &config.planner.endpoint {
            Some(endpoint) if config.planner.is_delegated() => {
                let planner = HttpPlanner::new(endpoint.clone(), config.planner.api_key.clone())?;
                tracing::info!("外部规划服务已启用: {}", planner.endpoint());
                Some(Arc::new(planner))
            }
            _ => {
                tracing::info!("未配置外部规划服务，使用本地求解器");
                None
            }
        };
        let advisor = Arc::new(LaborAdvisor::new(delegated, config.planner.retry_policy()));

        let labor_api = Arc::new(LaborApi::new(roster, advisor, config.labor.clone()));
        let machine_api = Arc::new(MachineApi::new(
            fleet,
            LoadRedistributionSolver::new(config.redistribution.clone()),
        ));

        tracing::info!("AppState初始化完成");
        Ok(Self {
            config: Arc::new(manager),
            labor_api,
            machine_api,
        })
    }

    /// 启动快照刷新任务（间隔取自配置）
    pub fn start_refresh(&self) -> SnapshotRefresher {
        let secs = self.config.config().labor.refresh_interval_secs;
        SnapshotRefresher::spawn(Arc::clone(&self.labor_api), Duration::from_secs(secs))
    }
}

/// 获取默认配置文件路径
///
/// 优先级: FACTORY_OPS_CONFIG_PATH > 用户配置目录 > 当前目录
pub fn get_default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(config_keys::CONFIG_PATH) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }

    match dirs::config_dir() {
        Some(dir) => dir.join("factory-ops").join("config.json"),
        None => PathBuf::from("./factory-ops.json"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    #[test]
    fn test_get_default_config_path() {
        let path = get_default_config_path();
        assert!(path.to_string_lossy().ends_with(".json"));
    }

    #[test]
    fn test_from_parts_local_only() {
        let manager = ConfigManager::from_config(EngineConfig::default()).unwrap();
        let state = AppState::from_parts(manager, demo_roster(Shift::C).unwrap(), demo_fleet()).unwrap();

        assert_eq!(state.labor_api.get_snapshot().unwrap().len(), 6);
        assert_eq!(state.machine_api.list_machines().unwrap().len(), 12);
    }
}
