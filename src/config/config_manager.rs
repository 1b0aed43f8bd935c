// ==========================================
// 工厂运营驾驶舱 - 配置管理器
// ==========================================
// 职责: 配置加载、环境变量覆写、范围校验、快照导出
// 存储: JSON 配置文件（不存在时使用默认值）
// 覆写顺序: 默认值 < 配置文件 < 环境变量
// ==========================================

use crate::config::engine_config::EngineConfig;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

// ==========================================
// 配置错误
// ==========================================
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("配置文件读取失败 ({path}): {message}")]
    Io { path: String, message: String },

    #[error("配置文件解析失败: {0}")]
    Parse(String),

    #[error("配置值非法: {key}={value}")]
    InvalidValue { key: String, value: String },

    #[error("配置值超出范围: {key}: {message}")]
    OutOfRange { key: String, message: String },
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    path: Option<PathBuf>,
    config: EngineConfig,
}

impl ConfigManager {
    /// 从已有配置创建（不读文件、不读环境变量）
    pub fn from_config(config: EngineConfig) -> Result<Self, ConfigError> {
        validate(&config)?;
        Ok(Self { path: None, config })
    }

    /// 加载配置
    ///
    /// # 参数
    /// - path: 配置文件路径；文件不存在时使用默认值
    ///
    /// # 说明
    /// - 读取文件后再应用 FACTORY_OPS_* 环境变量覆写，最后校验
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            serde_json::from_str(&raw).map_err(|e| ConfigError::Parse(e.to_string()))?
        } else {
            tracing::info!("配置文件不存在，使用默认配置: {}", path.display());
            EngineConfig::default()
        };

        apply_overrides(&mut config, |key| std::env::var(key).ok())?;
        validate(&config)?;

        Ok(Self {
            path: Some(path.to_path_buf()),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// 获取配置快照（JSON格式，API Key 已脱敏）
    pub fn get_config_snapshot(&self) -> Result<String, ConfigError> {
        let mut redacted = self.config.clone();
        if redacted.planner.api_key.is_some() {
            redacted.planner.api_key = Some("***".to_string());
        }
        serde_json::to_string_pretty(&redacted).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// 写回配置文件
    pub fn save(&self) -> Result<(), ConfigError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.display().to_string(),
                message: e.to_string(),
            })?;
        }
        let raw = serde_json::to_string_pretty(&self.config)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, raw).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

/// 按键名读取覆写值（lookup 通常为环境变量）
pub fn apply_overrides<F>(config: &mut EngineConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    use config_keys::*;

    if let Some(v) = lookup(PLANNER_ENDPOINT) {
        config.planner.endpoint = Some(v).filter(|s| !s.trim().is_empty());
    }
    if let Some(v) = lookup(PLANNER_API_KEY) {
        config.planner.api_key = Some(v).filter(|s| !s.is_empty());
    }
    if let Some(v) = lookup(PLANNER_MAX_ATTEMPTS) {
        config.planner.max_attempts = parse_value(PLANNER_MAX_ATTEMPTS, &v)?;
    }
    if let Some(v) = lookup(PLANNER_ATTEMPT_TIMEOUT_MS) {
        config.planner.attempt_timeout_ms = parse_value(PLANNER_ATTEMPT_TIMEOUT_MS, &v)?;
    }
    if let Some(v) = lookup(PLANNER_INITIAL_BACKOFF_MS) {
        config.planner.initial_backoff_ms = parse_value(PLANNER_INITIAL_BACKOFF_MS, &v)?;
    }
    if let Some(v) = lookup(PLANNER_TOTAL_BUDGET_MS) {
        config.planner.total_budget_ms = parse_value(PLANNER_TOTAL_BUDGET_MS, &v)?;
    }
    if let Some(v) = lookup(REFRESH_INTERVAL_SECS) {
        config.labor.refresh_interval_secs = parse_value(REFRESH_INTERVAL_SECS, &v)?;
    }
    if let Some(v) = lookup(BALANCED_CEILING_PCT) {
        config.redistribution.balanced_ceiling_pct = parse_value(BALANCED_CEILING_PCT, &v)?;
    }
    if let Some(v) = lookup(QUALITY_CEILING_PCT) {
        config.redistribution.quality_ceiling_pct = parse_value(QUALITY_CEILING_PCT, &v)?;
    }
    Ok(())
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
    })
}

/// 范围校验
pub fn validate(config: &EngineConfig) -> Result<(), ConfigError> {
    let out_of_range = |key: &str, message: &str| ConfigError::OutOfRange {
        key: key.to_string(),
        message: message.to_string(),
    };

    let p = &config.planner;
    if p.max_attempts == 0 || p.max_attempts > 10 {
        return Err(out_of_range("planner.max_attempts", "必须在 1~10 之间"));
    }
    if p.attempt_timeout_ms == 0 {
        return Err(out_of_range("planner.attempt_timeout_ms", "必须大于 0"));
    }
    if p.total_budget_ms < p.attempt_timeout_ms {
        return Err(out_of_range("planner.total_budget_ms", "不能小于单次超时"));
    }
    if config.labor.refresh_interval_secs == 0 {
        return Err(out_of_range("labor.refresh_interval_secs", "必须大于 0"));
    }

    let r = &config.redistribution;
    for (key, pct) in [
        ("redistribution.aggressive_ceiling_pct", r.aggressive_ceiling_pct),
        ("redistribution.balanced_ceiling_pct", r.balanced_ceiling_pct),
        ("redistribution.quality_ceiling_pct", r.quality_ceiling_pct),
    ] {
        if !(pct > 0.0 && pct <= 100.0) {
            return Err(out_of_range(key, "必须在 (0, 100] 之间"));
        }
    }
    if r.medium_risk_pct >= r.high_risk_pct {
        return Err(out_of_range("redistribution.medium_risk_pct", "必须小于 high_risk_pct"));
    }
    Ok(())
}

// ==========================================
// 配置键常量（环境变量名）
// ==========================================
pub mod config_keys {
    // 配置文件路径
    pub const CONFIG_PATH: &str = "FACTORY_OPS_CONFIG_PATH";

    // 外部规划服务
    pub const PLANNER_ENDPOINT: &str = "FACTORY_OPS_PLANNER_ENDPOINT";
    pub const PLANNER_API_KEY: &str = "FACTORY_OPS_PLANNER_API_KEY";
    pub const PLANNER_MAX_ATTEMPTS: &str = "FACTORY_OPS_PLANNER_MAX_ATTEMPTS";
    pub const PLANNER_ATTEMPT_TIMEOUT_MS: &str = "FACTORY_OPS_PLANNER_ATTEMPT_TIMEOUT_MS";
    pub const PLANNER_INITIAL_BACKOFF_MS: &str = "FACTORY_OPS_PLANNER_INITIAL_BACKOFF_MS";
    pub const PLANNER_TOTAL_BUDGET_MS: &str = "FACTORY_OPS_PLANNER_TOTAL_BUDGET_MS";

    // 人力调配
    pub const REFRESH_INTERVAL_SECS: &str = "FACTORY_OPS_REFRESH_INTERVAL_SECS";

    // 日志输出格式（text / json），仅由入口程序读取
    pub const LOG_FORMAT: &str = "FACTORY_OPS_LOG_FORMAT";

    // 负载重分配
    pub const BALANCED_CEILING_PCT: &str = "FACTORY_OPS_BALANCED_CEILING_PCT";
    pub const QUALITY_CEILING_PCT: &str = "FACTORY_OPS_QUALITY_CEILING_PCT";
}
