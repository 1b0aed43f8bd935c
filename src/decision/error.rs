// ==========================================
// 工厂运营驾驶舱 - 规划器错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分类: 可重试（传输失败/限流） vs 不可重试（超时/格式错误/预算耗尽/未配置）
// ==========================================

use thiserror::Error;

/// 规划器错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlannerError {
    #[error("规划服务不可达: {0}")]
    Transport(String),

    #[error("规划服务限流 (429): {0}")]
    RateLimited(String),

    #[error("规划服务超时: {after_ms}ms")]
    Timeout { after_ms: u64 },

    #[error("规划服务返回格式错误: {0}")]
    SchemaViolation(String),

    #[error("重试预算耗尽 (已尝试 {attempts} 次): {last}")]
    BudgetExhausted { attempts: u32, last: String },

    #[error("未配置外部规划服务")]
    NotConfigured,
}

impl PlannerError {
    /// 是否值得重试
    ///
    /// 超时与格式错误视为同一类失败，直接切换本地求解器
    pub fn is_retryable(&self) -> bool {
        matches!(self, PlannerError::Transport(_) | PlannerError::RateLimited(_))
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, PlannerError::RateLimited(_))
    }
}

impl From<serde_json::Error> for PlannerError {
    fn from(err: serde_json::Error) -> Self {
        PlannerError::SchemaViolation(err.to_string())
    }
}

impl From<reqwest::Error> for PlannerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PlannerError::Timeout { after_ms: 0 }
        } else if err.is_decode() {
            PlannerError::SchemaViolation(err.to_string())
        } else {
            PlannerError::Transport(err.to_string())
        }
    }
}
