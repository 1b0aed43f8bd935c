// ==========================================
// 工厂运营驾驶舱 - 引擎配置项
// ==========================================
// 职责: 规划服务、人力调配、负载重分配三组配置及默认值
// 说明: 所有字段可缺省，缺省即使用默认值
// ==========================================

use crate::decision::retry::RetryPolicy;
use crate::engine::load_redistribution::RedistributionConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 外部规划服务配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// 规划服务地址（为空时只用本地求解器）
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub max_attempts: u32,       // 最大尝试次数: 3
    pub attempt_timeout_ms: u64, // 单次超时: 12000ms
    pub initial_backoff_ms: u64, // 初始退避: 1000ms
    pub total_budget_ms: u64,    // 总预算: 45000ms
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            max_attempts: 3,
            attempt_timeout_ms: 12_000,
            initial_backoff_ms: 1_000,
            total_budget_ms: 45_000,
        }
    }
}

impl PlannerConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            attempt_timeout: Duration::from_millis(self.attempt_timeout_ms),
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            total_budget: Duration::from_millis(self.total_budget_ms),
        }
    }

    pub fn is_delegated(&self) -> bool {
        self.endpoint
            .as_deref()
            .map(|e| !e.trim().is_empty())
            .unwrap_or(false)
    }
}

/// 人力调配配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaborConfig {
    /// 快照刷新间隔（秒）
    pub refresh_interval_secs: u64,
    /// 缺勤演练的目标产线
    pub absenteeism_line_id: String,
    /// 缺勤演练中缺勤的主岗人数
    pub absenteeism_main_count: usize,
}

impl Default for LaborConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 30,
            absenteeism_line_id: "L2".to_string(),
            absenteeism_main_count: 3,
        }
    }
}

/// 引擎配置（配置文件顶层结构）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub planner: PlannerConfig,
    pub labor: LaborConfig,
    pub redistribution: RedistributionConfig,
}
