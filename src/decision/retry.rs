// ==========================================
// 工厂运营驾驶舱 - 统一重试策略
// ==========================================
// 职责: 所有外部规划调用共用的重试/超时/退避
// 规则:
// 1) 单次调用硬超时
// 2) 指数退避（初始间隔 * 2^(n-1)），限流时间隔翻倍
// 3) 总时长预算，超出即停止
// 4) 不可重试错误立即返回
// ==========================================

use crate::decision::error::PlannerError;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// 重试策略
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub attempt_timeout: Duration,
    pub initial_backoff: Duration,
    pub total_budget: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            attempt_timeout: Duration::from_secs(12),
            initial_backoff: Duration::from_secs(1),
            total_budget: Duration::from_secs(45),
        }
    }
}

impl RetryPolicy {
    /// 第 attempt 次失败后的等待时长（attempt 从 1 开始）
    pub fn backoff_for(&self, attempt: u32, error: &PlannerError) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        let base = self.initial_backoff.saturating_mul(1u32 << exp);
        if error.is_rate_limited() {
            base.saturating_mul(2)
        } else {
            base
        }
    }
}

/// 按策略执行异步调用
///
/// # 参数
/// - op: 每次尝试调用一次，参数为尝试序号（从 1 开始）
///
/// # 返回
/// - Ok(T): 某次尝试成功
/// - Err(PlannerError): 不可重试错误 / 尝试次数用尽时的最后一次错误 / BudgetExhausted
pub async fn call_with_retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, PlannerError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, PlannerError>>,
{
    let started = Instant::now();
    let max_attempts = policy.max_attempts.max(1);
    let mut last_error = PlannerError::NotConfigured;

    for attempt in 1..=max_attempts {
        let remaining = policy.total_budget.saturating_sub(started.elapsed());
        if remaining.is_zero() {
            return Err(PlannerError::BudgetExhausted {
                attempts: attempt - 1,
                last: last_error.to_string(),
            });
        }

        let per_attempt = policy.attempt_timeout.min(remaining);
        let error = match tokio::time::timeout(per_attempt, op(attempt)).await {
            Ok(Ok(value)) => {
                if attempt > 1 {
                    tracing::info!("规划调用在第 {} 次尝试成功", attempt);
                }
                return Ok(value);
            }
            Ok(Err(e)) => e,
            Err(_) => PlannerError::Timeout {
                after_ms: per_attempt.as_millis() as u64,
            },
        };

        tracing::warn!(
            "规划调用失败: attempt={}/{}, error={}",
            attempt,
            max_attempts,
            error
        );

        if !error.is_retryable() || attempt == max_attempts {
            return Err(error);
        }

        let delay = policy.backoff_for(attempt, &error);
        if started.elapsed() + delay >= policy.total_budget {
            return Err(PlannerError::BudgetExhausted {
                attempts: attempt,
                last: error.to_string(),
            });
        }
        last_error = error;
        tokio::time::sleep(delay).await;
    }

    Err(last_error)
}
