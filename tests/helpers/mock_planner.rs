// ==========================================
// Mock 规划器 - 用于集成测试
// ==========================================

use async_trait::async_trait;
use factory_ops::decision::{PlannerError, PlannerRequest, RebalancingPlanner};
use factory_ops::domain::RebalancingResponse;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// 固定返回值的规划器（可选延迟，记录调用次数）
pub struct ScriptedPlanner {
    result: Result<RebalancingResponse, PlannerError>,
    delay: Duration,
    calls: AtomicU32,
}

impl ScriptedPlanner {
    pub fn ok(response: RebalancingResponse) -> Self {
        Self {
            result: Ok(response),
            delay: Duration::ZERO,
            calls: AtomicU32::new(0),
        }
    }

    pub fn failing(error: PlannerError) -> Self {
        Self {
            result: Err(error),
            delay: Duration::ZERO,
            calls: AtomicU32::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RebalancingPlanner for ScriptedPlanner {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn plan(&self, _request: &PlannerRequest) -> Result<RebalancingResponse, PlannerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.result.clone()
    }
}
