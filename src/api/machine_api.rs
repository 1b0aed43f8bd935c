// ==========================================
// 工厂运营驾驶舱 - 设备服务 API
// ==========================================
// 职责: 设备台账查询、停机服务分析（重分配策略 + 维修商推荐）、
//       策略执行与服务进度推进
// 红线: 执行前整体校验，失败时台账保持不变
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::machine::{MachineFleet, MachineStatus, RedistributionStrategy, VendorEstimate};
use crate::domain::types::ServiceType;
use crate::engine::load_redistribution::{LoadRedistributionSolver, ServiceProgress};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

/// 服务分析请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    pub machine_id: String,
    pub service_type: ServiceType,
    #[serde(default)]
    pub issue_description: String,
    #[serde(default)]
    pub vendor_estimates: Vec<VendorEstimate>,
    /// 显式指定并联设备组；为空时取台账中的并联设备
    #[serde(default)]
    pub parallel_fleet: Option<Vec<MachineStatus>>,
}

impl ServiceRequest {
    pub fn new(machine_id: impl Into<String>, service_type: ServiceType) -> Self {
        Self {
            machine_id: machine_id.into(),
            service_type,
            issue_description: String::new(),
            vendor_estimates: Vec::new(),
            parallel_fleet: None,
        }
    }

    pub fn with_issue(mut self, issue: impl Into<String>) -> Self {
        self.issue_description = issue.into();
        self
    }

    pub fn with_vendors(mut self, vendors: Vec<VendorEstimate>) -> Self {
        self.vendor_estimates = vendors;
        self
    }
}

/// 推荐结果（下标指向分析结果中的列表）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRecommendation {
    pub strategy_index: Option<usize>,
    pub vendor_index: Option<usize>,
}

/// 服务分析结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAnalysis {
    pub machine_id: String,
    pub service_type: ServiceType,
    pub issue_description: String,
    pub under_warranty: bool,
    pub unserved_load: f64,
    pub candidate_ids: Vec<String>,
    pub strategies: Vec<RedistributionStrategy>,
    pub vendor_estimates: Vec<VendorEstimate>,
    pub recommendation: ServiceRecommendation,
}

/// 服务预约确认
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceBooking {
    pub machine_id: String,
    pub service_type: ServiceType,
    pub strategy_name: String,
    pub vendor_name: Option<String>,
}

// ==========================================
// MachineApi - 设备服务 API
// ==========================================
pub struct MachineApi {
    fleet: Arc<Mutex<MachineFleet>>,
    solver: LoadRedistributionSolver,
}

impl MachineApi {
    pub fn new(fleet: MachineFleet, solver: LoadRedistributionSolver) -> Self {
        Self {
            fleet: Arc::new(Mutex::new(fleet)),
            solver,
        }
    }

    pub fn list_machines(&self) -> ApiResult<Vec<MachineStatus>> {
        Ok(self.lock_fleet()?.machines().to_vec())
    }

    pub fn get_machine(&self, machine_id: &str) -> ApiResult<MachineStatus> {
        self.lock_fleet()?
            .get(machine_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("设备(id={})", machine_id)))
    }

    pub fn down_count(&self) -> ApiResult<usize> {
        Ok(self.lock_fleet()?.down_count())
    }

    /// 停机服务分析
    ///
    /// # 参数
    /// - request: 停机设备、服务类型、维修商报价、可选的并联设备组
    ///
    /// # 返回
    /// - 全部政策的重分配策略（固定顺序）与推荐下标
    pub fn analyze_service(&self, request: &ServiceRequest) -> ApiResult<ServiceAnalysis> {
        let (machine, candidates) = {
            let fleet = self.lock_fleet()?;
            let machine = fleet
                .get(&request.machine_id)
                .cloned()
                .ok_or_else(|| ApiError::NotFound(format!("设备(id={})", request.machine_id)))?;
            let candidates = match &request.parallel_fleet {
                Some(explicit) => {
                    let mut seen = HashSet::new();
                    explicit
                        .iter()
                        .filter(|m| seen.insert(m.id.as_str()))
                        .cloned()
                        .collect()
                }
                None => fleet.parallel_candidates(&request.machine_id),
            };
            (machine, candidates)
        };

        let unserved_load = machine.current_load_units_hr.max(0.0);
        let strategies = self.solver.generate(&machine, &candidates);
        let recommendation = ServiceRecommendation {
            strategy_index: self.solver.rank(&strategies, unserved_load),
            vendor_index: self
                .solver
                .recommend_vendor(&request.vendor_estimates, machine.is_under_warranty),
        };

        tracing::info!(
            "服务分析完成: machine_id={}, service_type={}, candidates={}, recommended={:?}",
            machine.id,
            request.service_type,
            candidates.len(),
            recommendation
        );

        Ok(ServiceAnalysis {
            machine_id: machine.id,
            service_type: request.service_type,
            issue_description: request.issue_description.clone(),
            under_warranty: machine.is_under_warranty,
            unserved_load,
            candidate_ids: candidates.into_iter().map(|m| m.id).collect(),
            strategies,
            vendor_estimates: request.vendor_estimates.clone(),
            recommendation,
        })
    }

    /// 执行重分配策略
    pub fn apply_strategy(
        &self,
        machine_id: &str,
        service_type: ServiceType,
        strategy: &RedistributionStrategy,
    ) -> ApiResult<()> {
        let mut fleet = self.lock_fleet()?;
        self.solver
            .apply_strategy(&mut fleet, machine_id, service_type, strategy)?;
        Ok(())
    }

    /// 按分析结果确认预约：执行所选策略，记录所选维修商
    ///
    /// # 参数
    /// - strategy_index: 为 None 时使用推荐策略
    /// - vendor_index: 为 None 时使用推荐维修商（可无）
    pub fn book_service(
        &self,
        analysis: &ServiceAnalysis,
        strategy_index: Option<usize>,
        vendor_index: Option<usize>,
    ) -> ApiResult<ServiceBooking> {
        let strategy_index = strategy_index
            .or(analysis.recommendation.strategy_index)
            .ok_or_else(|| ApiError::BusinessRuleViolation("无可用的重分配策略".to_string()))?;
        let strategy = analysis
            .strategies
            .get(strategy_index)
            .ok_or_else(|| ApiError::InvalidInput(format!("策略下标越界: {}", strategy_index)))?;

        let vendor_name = match vendor_index.or(analysis.recommendation.vendor_index) {
            Some(idx) => Some(
                analysis
                    .vendor_estimates
                    .get(idx)
                    .map(|v| v.vendor_name.clone())
                    .ok_or_else(|| ApiError::InvalidInput(format!("维修商下标越界: {}", idx)))?,
            ),
            None => None,
        };

        self.apply_strategy(&analysis.machine_id, analysis.service_type, strategy)?;

        Ok(ServiceBooking {
            machine_id: analysis.machine_id.clone(),
            service_type: analysis.service_type,
            strategy_name: strategy.name.clone(),
            vendor_name,
        })
    }

    /// 推进单台设备的服务阶段
    pub fn advance_service_stage(&self, machine_id: &str) -> ApiResult<ServiceProgress> {
        let mut fleet = self.lock_fleet()?;
        Ok(self.solver.advance_service_stage(&mut fleet, machine_id)?)
    }

    /// 推进所有服务中设备的阶段（返回 设备ID -> 进度）
    pub fn advance_all_in_service(&self) -> ApiResult<Vec<(String, ServiceProgress)>> {
        let mut fleet = self.lock_fleet()?;
        let in_service: Vec<String> = fleet
            .machines()
            .iter()
            .filter(|m| m.service_stage.is_some())
            .map(|m| m.id.clone())
            .collect();

        let mut progress = Vec::with_capacity(in_service.len());
        for id in in_service {
            let step = self.solver.advance_service_stage(&mut fleet, &id)?;
            progress.push((id, step));
        }
        Ok(progress)
    }

    fn lock_fleet(&self) -> ApiResult<MutexGuard<'_, MachineFleet>> {
        self.fleet
            .lock()
            .map_err(|e| ApiError::InternalError(format!("锁获取失败: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{MachineState, ServiceStage};
    use crate::engine::load_redistribution::RedistributionConfig;
    use crate::importer::demo_fleet;

    fn api() -> MachineApi {
        MachineApi::new(demo_fleet(), LoadRedistributionSolver::new(RedistributionConfig::default()))
    }

    #[test]
    fn test_analyze_unknown_machine() {
        let err = api()
            .analyze_service(&ServiceRequest::new("ZZ9", ServiceType::Breakdown))
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_book_recommended_and_walk_stages() {
        let api = api();
        let analysis = api
            .analyze_service(&ServiceRequest::new("R02", ServiceType::Breakdown))
            .unwrap();
        assert_eq!(analysis.strategies.len(), 4);
        assert_eq!(analysis.candidate_ids, vec!["R01", "R03", "R04"]);

        let booking = api.book_service(&analysis, None, None).unwrap();
        assert!(booking.vendor_name.is_none());

        let r02 = api.get_machine("R02").unwrap();
        assert_eq!(r02.status, MachineState::Down);
        assert_eq!(r02.current_load_units_hr, 0.0);
        assert_eq!(r02.service_stage, Some(ServiceStage::Dispatched));

        let mut steps = 0;
        loop {
            match api.advance_service_stage("R02").unwrap() {
                ServiceProgress::Advanced(_) => steps += 1,
                ServiceProgress::ReturnedToService => break,
                ServiceProgress::NotInService => panic!("R02 should be in service"),
            }
        }
        assert!(steps > 0);
        assert!(api.get_machine("R02").unwrap().is_operational());
    }
}
