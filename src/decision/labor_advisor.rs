// ==========================================
// 工厂运营驾驶舱 - 人力调配顾问
// ==========================================
// 职责: 编排"外部规划 -> 契约校验 -> 本地兜底"
// 流程:
// 1) 已配置外部规划服务时，按统一重试策略调用
// 2) 返回结果必须通过方案校验，否则视为格式错误
// 3) 任一失败切换到本地求解器，并在方案来源中记录原因
// 红线: 对调用方永不失败，总能给出满足约束的方案
// ==========================================

use crate::decision::error::PlannerError;
use crate::decision::planner::{LocalPlanner, PlannerRequest, RebalancingPlanner};
use crate::decision::retry::{call_with_retry, RetryPolicy};
use crate::domain::action::RebalancingResponse;
use crate::engine::plan_validator::validate_plan;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;

/// 方案来源
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanSource {
    /// 外部规划服务（已通过校验）
    Delegated { planner: String },
    /// 外部规划失败后由本地求解器兜底
    Fallback { reason: String },
    /// 未配置外部规划服务，直接本地求解
    Local,
}

impl PlanSource {
    pub fn is_fallback(&self) -> bool {
        matches!(self, PlanSource::Fallback { .. })
    }
}

/// 带来源的调配方案
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisedPlan {
    pub response: RebalancingResponse,
    pub source: PlanSource,
}

// ==========================================
// LaborAdvisor
// ==========================================
pub struct LaborAdvisor {
    delegated: Option<Arc<dyn RebalancingPlanner>>,
    local: LocalPlanner,
    retry: RetryPolicy,
}

impl LaborAdvisor {
    pub fn new(delegated: Option<Arc<dyn RebalancingPlanner>>, retry: RetryPolicy) -> Self {
        Self {
            delegated,
            local: LocalPlanner::new(),
            retry,
        }
    }

    /// 仅本地求解
    pub fn local_only() -> Self {
        Self::new(None, RetryPolicy::default())
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// 调用外部规划服务并校验（不兜底）
    ///
    /// # 返回
    /// - Err(NotConfigured): 未配置外部规划服务
    /// - Err(SchemaViolation): 返回 JSON 不合法或违反规划契约
    /// - Err(其他): 重试后仍不可达/超时/预算耗尽
    pub async fn delegate(&self, request: &PlannerRequest) -> Result<RebalancingResponse, PlannerError> {
        let planner = self.delegated.as_ref().ok_or(PlannerError::NotConfigured)?;

        let response = call_with_retry(&self.retry, |_| planner.plan(request)).await?;

        validate_plan(&request.snapshot, &response).map_err(|violations| {
            PlannerError::SchemaViolation(
                violations
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        })?;

        Ok(response)
    }

    /// 生成调配方案（外部优先，失败兜底）
    #[instrument(skip(self, request), fields(lines = request.snapshot.len()))]
    pub async fn advise(&self, request: &PlannerRequest) -> AdvisedPlan {
        let Some(planner) = self.delegated.as_ref() else {
            return AdvisedPlan {
                response: self.local.solve(request),
                source: PlanSource::Local,
            };
        };

        match self.delegate(request).await {
            Ok(response) => {
                tracing::info!(
                    "采用外部规划方案: planner={}, suggestions={}",
                    planner.name(),
                    response.suggestions.len()
                );
                AdvisedPlan {
                    response,
                    source: PlanSource::Delegated {
                        planner: planner.name().to_string(),
                    },
                }
            }
            Err(err) => {
                tracing::warn!("外部规划失败，切换本地求解器: {}", err);
                AdvisedPlan {
                    response: self.local.solve(request),
                    source: PlanSource::Fallback {
                        reason: err.to_string(),
                    },
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::action::ProposedAction;
    use crate::domain::snapshot::{LineSnapshot, SnapshotWorker};
    use async_trait::async_trait;
    use std::time::Duration;

    struct FixedPlanner(Result<RebalancingResponse, PlannerError>);

    #[async_trait]
    impl RebalancingPlanner for FixedPlanner {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn plan(&self, _request: &PlannerRequest) -> Result<RebalancingResponse, PlannerError> {
            self.0.clone()
        }
    }

    fn request() -> PlannerRequest {
        let line = |id: &str, required: usize, names: &[&str]| LineSnapshot {
            line_id: id.to_string(),
            line_name: id.to_string(),
            required,
            present: names.len(),
            surplus: names.len().saturating_sub(required),
            deficit: required.saturating_sub(names.len()),
            present_worker_names: names.iter().map(|n| n.to_string()).collect(),
            present_workers: names
                .iter()
                .map(|n| SnapshotWorker { id: n.to_string(), name: n.to_string() })
                .collect(),
            version: 0,
        };
        PlannerRequest::new("test", vec![line("L1", 2, &["A"]), line("L2", 1, &["B", "C"])])
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 2,
            attempt_timeout: Duration::from_millis(100),
            initial_backoff: Duration::from_millis(1),
            total_budget: Duration::from_secs(1),
        }
    }

    #[tokio::test]
    async fn test_local_only() {
        let plan = LaborAdvisor::local_only().advise(&request()).await;
        assert_eq!(plan.source, PlanSource::Local);
        assert_eq!(plan.response.suggestions.len(), 1);
    }

    #[tokio::test]
    async fn test_valid_delegated_plan_is_used() {
        let delegated = RebalancingResponse {
            suggestions: vec![ProposedAction::move_workers(
                "gap".into(),
                "fill".into(),
                vec![],
                vec!["b".into()],
                "L2",
                "L1",
            )],
        };
        let advisor = LaborAdvisor::new(Some(Arc::new(FixedPlanner(Ok(delegated.clone())))), fast_retry());

        let plan = advisor.advise(&request()).await;
        assert_eq!(plan.source, PlanSource::Delegated { planner: "fixed".into() });
        assert_eq!(plan.response, delegated);
    }

    #[tokio::test]
    async fn test_invalid_delegated_plan_falls_back() {
        // 引用不在岗人员属于契约违规
        let bogus = RebalancingResponse {
            suggestions: vec![ProposedAction::move_workers(
                String::new(),
                String::new(),
                vec![],
                vec!["Nobody".into()],
                "L2",
                "L1",
            )],
        };
        let advisor = LaborAdvisor::new(Some(Arc::new(FixedPlanner(Ok(bogus)))), fast_retry());

        let plan = advisor.advise(&request()).await;
        assert!(plan.source.is_fallback());
        assert_eq!(plan.response.suggestions[0].worker_names(), &["C".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_plan_with_fixable_deficit_falls_back() {
        let advisor = LaborAdvisor::new(
            Some(Arc::new(FixedPlanner(Ok(RebalancingResponse::default())))),
            fast_retry(),
        );

        let plan = advisor.advise(&request()).await;
        assert!(plan.source.is_fallback());
        assert_eq!(plan.response.suggestions[0].to_line(), Some("L1"));
    }

    #[tokio::test]
    async fn test_transport_failure_falls_back() {
        let advisor = LaborAdvisor::new(
            Some(Arc::new(FixedPlanner(Err(PlannerError::Transport("down".into()))))),
            fast_retry(),
        );

        let plan = advisor.advise(&request()).await;
        match plan.source {
            PlanSource::Fallback { reason } => assert!(reason.contains("down")),
            other => panic!("unexpected source: {:?}", other),
        }
    }
}
