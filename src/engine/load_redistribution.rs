// ==========================================
// 工厂运营驾驶舱 - 负载重分配引擎
// ==========================================
// 职责: 设备停机/保养时，把其负载分摊到在运行的并联设备
// 红线1: 每一步追加负载 >= 0
// 红线2: 单策略追加负载总和 <= 停机设备原负载
// 红线3: new_utilization = (load + add) / capacity * 100
// ==========================================
// 输入: 停机设备 + 并联候选设备（仅 operational）
// 输出: 多个命名策略（政策互不相同）+ 风险/产出权衡排名
// ==========================================

use crate::domain::machine::{
    compute_utilization, MachineFleet, MachineStatus, RedistributionStep, RedistributionStrategy,
    VendorEstimate,
};
use crate::domain::types::{MachineState, RiskLevel, ServiceStage, ServiceType};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use thiserror::Error;
use tracing::instrument;

const EPSILON: f64 = 1e-9;

// ==========================================
// 重分配错误
// ==========================================
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RedistributionError {
    #[error("设备不存在: {0}")]
    MachineNotFound(String),

    #[error("策略目标设备不可用: {0}")]
    TargetUnavailable(String),

    #[error("策略追加负载超出停机设备负载: {total:.2} > {available:.2}")]
    OverAllocation { total: f64, available: f64 },
}

// ==========================================
// RedistributionConfig - 重分配配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedistributionConfig {
    pub aggressive_ceiling_pct: f64, // 激进恢复上限: 100%
    pub balanced_ceiling_pct: f64,   // 均衡健康上限: 85%
    pub quality_ceiling_pct: f64,    // 质量优先上限: 75%
    pub medium_risk_pct: f64,        // 中风险阈值: 85%
    pub high_risk_pct: f64,          // 高风险阈值: 95%
}

impl Default for RedistributionConfig {
    fn default() -> Self {
        Self {
            aggressive_ceiling_pct: 100.0,
            balanced_ceiling_pct: 85.0,
            quality_ceiling_pct: 75.0,
            medium_risk_pct: 85.0,
            high_risk_pct: 95.0,
        }
    }
}

/// 重分配政策
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedistributionPolicy {
    AggressiveRecovery,
    BalancedHealth,
    EvenSpread,
    QualityFirst,
}

impl RedistributionPolicy {
    pub const ALL: [RedistributionPolicy; 4] = [
        RedistributionPolicy::AggressiveRecovery,
        RedistributionPolicy::BalancedHealth,
        RedistributionPolicy::EvenSpread,
        RedistributionPolicy::QualityFirst,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            RedistributionPolicy::AggressiveRecovery => "Aggressive Recovery",
            RedistributionPolicy::BalancedHealth => "Balanced Health",
            RedistributionPolicy::EvenSpread => "Even Spread",
            RedistributionPolicy::QualityFirst => "Quality First",
        }
    }

    fn describe(&self, config: &RedistributionConfig) -> String {
        match self {
            RedistributionPolicy::AggressiveRecovery => format!(
                "优先填满余量最大的设备，利用率上限 {:.0}%，产出损失最小",
                config.aggressive_ceiling_pct
            ),
            RedistributionPolicy::BalancedHealth => format!(
                "按余量比例分摊，利用率不超过 {:.0}%，保护并联设备寿命",
                config.balanced_ceiling_pct
            ),
            RedistributionPolicy::EvenSpread => format!(
                "各并联设备平均承接，单台不超过 {:.0}%",
                config.aggressive_ceiling_pct
            ),
            RedistributionPolicy::QualityFirst => format!(
                "只向低负载设备转移，利用率不超过 {:.0}%，接受产出下降",
                config.quality_ceiling_pct
            ),
        }
    }
}

impl std::str::FromStr for RedistributionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "aggressive_recovery" | "aggressive" => Ok(RedistributionPolicy::AggressiveRecovery),
            "balanced_health" | "balanced" => Ok(RedistributionPolicy::BalancedHealth),
            "even_spread" | "even" => Ok(RedistributionPolicy::EvenSpread),
            "quality_first" | "quality" => Ok(RedistributionPolicy::QualityFirst),
            other => Err(format!("未知重分配政策: {}", other)),
        }
    }
}

/// 服务进度推进结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceProgress {
    /// 进入下一阶段
    Advanced(ServiceStage),
    /// Restored 之后恢复运行，服务阶段清空
    ReturnedToService,
    /// 设备不在服务流程中
    NotInService,
}

// ==========================================
// LoadRedistributionSolver
// ==========================================
pub struct LoadRedistributionSolver {
    config: RedistributionConfig,
}

impl LoadRedistributionSolver {
    pub fn new(config: RedistributionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RedistributionConfig {
        &self.config
    }

    /// 生成全部政策的重分配策略（顺序与 RedistributionPolicy::ALL 一致）
    ///
    /// 非 operational 的候选设备会被过滤，不参与分摊；重复ID只保留首次出现
    #[instrument(skip(self, down, candidates), fields(machine_id = %down.id, candidates = candidates.len()))]
    pub fn generate(
        &self,
        down: &MachineStatus,
        candidates: &[MachineStatus],
    ) -> Vec<RedistributionStrategy> {
        let mut seen = HashSet::new();
        let operational: Vec<&MachineStatus> = candidates
            .iter()
            .filter(|m| m.is_operational() && m.id != down.id)
            .filter(|m| seen.insert(m.id.as_str()))
            .collect();
        let unserved_load = down.current_load_units_hr.max(0.0);

        let strategies: Vec<RedistributionStrategy> = RedistributionPolicy::ALL
            .iter()
            .map(|policy| {
                let allocation = match policy {
                    RedistributionPolicy::AggressiveRecovery => self.greedy_fill(
                        &operational,
                        unserved_load,
                        self.config.aggressive_ceiling_pct,
                        |a, b| {
                            b.headroom_at(self.config.aggressive_ceiling_pct)
                                .partial_cmp(&a.headroom_at(self.config.aggressive_ceiling_pct))
                                .unwrap_or(Ordering::Equal)
                        },
                    ),
                    RedistributionPolicy::BalancedHealth => self.proportional_fill(
                        &operational,
                        unserved_load,
                        self.config.balanced_ceiling_pct,
                    ),
                    RedistributionPolicy::EvenSpread => self.water_fill(
                        &operational,
                        unserved_load,
                        self.config.aggressive_ceiling_pct,
                    ),
                    RedistributionPolicy::QualityFirst => self.greedy_fill(
                        &operational,
                        unserved_load,
                        self.config.quality_ceiling_pct,
                        |a, b| {
                            a.utilization
                                .partial_cmp(&b.utilization)
                                .unwrap_or(Ordering::Equal)
                        },
                    ),
                };
                self.build_strategy(*policy, &operational, &allocation, unserved_load)
            })
            .collect();

        tracing::info!(
            "重分配策略生成完成: machine_id={}, load={:.2}, strategies={}",
            down.id,
            unserved_load,
            strategies.len()
        );

        strategies
    }

    /// 风险/产出权衡排名：得分 = 恢复比例(%) - 风险惩罚，同分取靠前者
    pub fn rank(&self, strategies: &[RedistributionStrategy], unserved_load: f64) -> Option<usize> {
        let score = |s: &RedistributionStrategy| {
            let recovered_pct = if unserved_load <= EPSILON {
                100.0
            } else {
                s.recovered_units / unserved_load * 100.0
            };
            recovered_pct - s.risk_level.penalty()
        };

        let mut best: Option<(usize, f64)> = None;
        for (idx, strategy) in strategies.iter().enumerate() {
            let current = score(strategy);
            match best {
                Some((_, best_score)) if current <= best_score + EPSILON => {}
                _ => best = Some((idx, current)),
            }
        }
        best.map(|(idx, _)| idx)
    }

    /// 维修商推荐：在保设备优先不破保的报价，其次最低价，再次口碑
    pub fn recommend_vendor(&self, estimates: &[VendorEstimate], under_warranty: bool) -> Option<usize> {
        let preserves_warranty = |v: &VendorEstimate| !v.voids_warranty;
        let restrict = under_warranty && estimates.iter().any(preserves_warranty);

        estimates
            .iter()
            .enumerate()
            .filter(|(_, v)| !restrict || preserves_warranty(v))
            .min_by(|(ia, a), (ib, b)| {
                a.repair_estimate_inr
                    .partial_cmp(&b.repair_estimate_inr)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| {
                        b.reputation_score
                            .partial_cmp(&a.reputation_score)
                            .unwrap_or(Ordering::Equal)
                    })
                    .then_with(|| ia.cmp(ib))
            })
            .map(|(idx, _)| idx)
    }

    /// 执行策略：停机设备转入保养/故障并清零负载，目标设备按步骤追加负载
    ///
    /// 先整体校验，失败时台账不变
    #[instrument(skip(self, fleet, strategy), fields(strategy = %strategy.name))]
    pub fn apply_strategy(
        &self,
        fleet: &mut MachineFleet,
        machine_id: &str,
        service_type: ServiceType,
        strategy: &RedistributionStrategy,
    ) -> Result<(), RedistributionError> {
        let machine = fleet
            .get(machine_id)
            .ok_or_else(|| RedistributionError::MachineNotFound(machine_id.to_string()))?;

        let total = strategy.total_additional_load();
        let available = machine.current_load_units_hr.max(0.0);
        if total > available + EPSILON {
            return Err(RedistributionError::OverAllocation { total, available });
        }
        for step in &strategy.steps {
            let usable = fleet
                .get(&step.target_machine_id)
                .map(|m| m.is_operational() && m.id != machine_id)
                .unwrap_or(false);
            if !usable || step.additional_load_units < 0.0 {
                return Err(RedistributionError::TargetUnavailable(
                    step.target_machine_id.clone(),
                ));
            }
        }

        if let Some(machine) = fleet.get_mut(machine_id) {
            machine.status = service_type.resulting_state();
            machine.set_load(0.0);
            machine.service_stage = Some(ServiceStage::Dispatched);
        }
        for step in &strategy.steps {
            if let Some(target) = fleet.get_mut(&step.target_machine_id) {
                let new_load = target.current_load_units_hr + step.additional_load_units;
                target.set_load(new_load);
            }
        }

        tracing::info!(
            "重分配策略已执行: machine_id={}, service_type={}, moved={:.2}",
            machine_id,
            service_type,
            total
        );
        Ok(())
    }

    /// 推进服务阶段；Restored 之后设备恢复 operational
    pub fn advance_service_stage(
        &self,
        fleet: &mut MachineFleet,
        machine_id: &str,
    ) -> Result<ServiceProgress, RedistributionError> {
        let machine = fleet
            .get_mut(machine_id)
            .ok_or_else(|| RedistributionError::MachineNotFound(machine_id.to_string()))?;

        let Some(stage) = machine.service_stage else {
            return Ok(ServiceProgress::NotInService);
        };

        let progress = match stage.next() {
            Some(next) => {
                machine.service_stage = Some(next);
                ServiceProgress::Advanced(next)
            }
            None => {
                machine.service_stage = None;
                machine.status = MachineState::Operational;
                ServiceProgress::ReturnedToService
            }
        };

        tracing::debug!("服务进度推进: machine_id={}, progress={:?}", machine_id, progress);
        Ok(progress)
    }

    // ==========================================
    // 分摊算法
    // ==========================================

    /// 按排序依次填满到上限
    fn greedy_fill<F>(
        &self,
        machines: &[&MachineStatus],
        load: f64,
        ceiling_pct: f64,
        order: F,
    ) -> Vec<f64>
    where
        F: Fn(&MachineStatus, &MachineStatus) -> Ordering,
    {
        let mut indices: Vec<usize> = (0..machines.len()).collect();
        indices.sort_by(|&a, &b| order(machines[a], machines[b]));

        let mut allocation = vec![0.0; machines.len()];
        let mut remaining = load;
        for idx in indices {
            if remaining <= EPSILON {
                break;
            }
            let take = machines[idx].headroom_at(ceiling_pct).min(remaining);
            allocation[idx] = take;
            remaining -= take;
        }
        allocation
    }

    /// 按余量比例分摊（余量总和不足时各自填满）
    fn proportional_fill(&self, machines: &[&MachineStatus], load: f64, ceiling_pct: f64) -> Vec<f64> {
        let headroom: Vec<f64> = machines.iter().map(|m| m.headroom_at(ceiling_pct)).collect();
        let total: f64 = headroom.iter().sum();

        if total <= EPSILON {
            return vec![0.0; machines.len()];
        }
        if total <= load {
            return headroom;
        }
        headroom.iter().map(|h| load * h / total).collect()
    }

    /// 注水法平均分摊：每轮平分剩余负载，满载设备退出
    fn water_fill(&self, machines: &[&MachineStatus], load: f64, ceiling_pct: f64) -> Vec<f64> {
        let mut headroom: Vec<f64> = machines.iter().map(|m| m.headroom_at(ceiling_pct)).collect();
        let mut allocation = vec![0.0; machines.len()];
        let mut remaining = load;

        loop {
            let active: Vec<usize> = (0..machines.len())
                .filter(|&i| headroom[i] > EPSILON)
                .collect();
            if active.is_empty() || remaining <= EPSILON {
                break;
            }
            let share = remaining / active.len() as f64;
            for i in active {
                let take = share.min(headroom[i]);
                allocation[i] += take;
                headroom[i] -= take;
                remaining -= take;
            }
        }
        allocation
    }

    fn step_risk(&self, utilization: f64) -> RiskLevel {
        if utilization >= self.config.high_risk_pct - EPSILON {
            RiskLevel::High
        } else if utilization >= self.config.medium_risk_pct - EPSILON {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    fn build_strategy(
        &self,
        policy: RedistributionPolicy,
        machines: &[&MachineStatus],
        allocation: &[f64],
        unserved_load: f64,
    ) -> RedistributionStrategy {
        let steps: Vec<RedistributionStep> = machines
            .iter()
            .zip(allocation.iter())
            .filter(|(_, add)| **add > EPSILON)
            .map(|(m, add)| {
                let new_utilization =
                    compute_utilization(m.current_load_units_hr + add, m.capacity_units_hr);
                RedistributionStep {
                    target_machine_id: m.id.clone(),
                    additional_load_units: *add,
                    new_utilization,
                    risk_level: self.step_risk(new_utilization),
                }
            })
            .collect();

        let recovered_units: f64 = steps.iter().map(|s| s.additional_load_units).sum();
        let recovered_units = recovered_units.min(unserved_load);
        let baseline: f64 = machines.iter().map(|m| m.current_load_units_hr).sum();
        let risk_level = steps
            .iter()
            .map(|s| s.risk_level)
            .max()
            .unwrap_or(RiskLevel::Low);

        RedistributionStrategy {
            name: policy.title().to_string(),
            description: policy.describe(&self.config),
            steps,
            recovered_units,
            unserved_units: (unserved_load - recovered_units).max(0.0),
            projected_throughput: baseline + recovered_units,
            risk_level,
        }
    }
}

impl Default for LoadRedistributionSolver {
    fn default() -> Self {
        Self::new(RedistributionConfig::default())
    }
}
