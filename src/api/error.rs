// ==========================================
// 工厂运营驾驶舱 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，把各层错误转换为可展示的错误消息
// 说明: 本子系统的任何错误都不应终止宿主进程
// ==========================================

use crate::config::config_manager::ConfigError;
use crate::decision::error::PlannerError;
use crate::domain::roster::RosterError;
use crate::engine::load_redistribution::RedistributionError;
use crate::importer::error::ImportError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 并发控制错误
    // ==========================================
    #[error("乐观锁冲突: {0}")]
    OptimisticLockFailure(String),

    #[error("求解请求已被更新的请求取代: generation={requested}, current={current}")]
    SupersededRequest { requested: u64, current: u64 },

    // ==========================================
    // 外部依赖错误
    // ==========================================
    #[error("规划服务错误: {0}")]
    PlannerError(#[from] PlannerError),

    #[error("文件导入失败: {0}")]
    ImportError(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<RosterError> for ApiError {
    fn from(err: RosterError) -> Self {
        ApiError::InvalidInput(err.to_string())
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::FileNotFound(path) => ApiError::NotFound(format!("文件 {}", path)),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<RedistributionError> for ApiError {
    fn from(err: RedistributionError) -> Self {
        match err {
            RedistributionError::MachineNotFound(id) => ApiError::NotFound(format!("设备(id={})", id)),
            other => ApiError::BusinessRuleViolation(other.to_string()),
        }
    }
}

/// API 结果类型
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        let err: ApiError = RedistributionError::MachineNotFound("R09".into()).into();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err: ApiError = ImportError::FileNotFound("/tmp/x.csv".into()).into();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err: ApiError = RosterError::DuplicateLine("L1".into()).into();
        assert!(err.to_string().contains("L1"));
    }

    #[test]
    fn test_anyhow_passthrough() {
        let err: ApiError = anyhow::anyhow!("后台任务失败").into();
        assert!(matches!(err, ApiError::Other(_)));
        assert_eq!(err.to_string(), "后台任务失败");
    }
}
