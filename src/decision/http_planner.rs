// ==========================================
// 工厂运营驾驶舱 - 外部规划服务客户端
// ==========================================
// 职责: 以 HTTP JSON 方式调用外部规划服务
// 协议: POST {endpoint}  body = PlannerRequest  ->  RebalancingResponse
// 错误映射: 429 -> RateLimited；其他非 2xx / 网络错误 -> Transport；JSON 不合法 -> SchemaViolation
// 说明: 单次调用不做重试，重试由 LaborAdvisor 按统一策略负责
// ==========================================

use crate::decision::error::PlannerError;
use crate::decision::planner::{PlannerRequest, RebalancingPlanner};
use crate::domain::action::RebalancingResponse;
use async_trait::async_trait;
use reqwest::StatusCode;

pub struct HttpPlanner {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpPlanner {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Result<Self, PlannerError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| PlannerError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RebalancingPlanner for HttpPlanner {
    fn name(&self) -> &str {
        "http-delegated"
    }

    async fn plan(&self, request: &PlannerRequest) -> Result<RebalancingResponse, PlannerError> {
        let mut builder = self.client.post(&self.endpoint).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(PlannerError::RateLimited(body));
        }
        if !status.is_success() {
            return Err(PlannerError::Transport(format!("HTTP {}: {}", status.as_u16(), body)));
        }

        let parsed: RebalancingResponse = serde_json::from_str(&body)?;
        tracing::debug!(
            "外部规划服务返回: endpoint={}, suggestions={}",
            self.endpoint,
            parsed.suggestions.len()
        );
        Ok(parsed)
    }
}
