// ==========================================
// 工厂运营驾驶舱 - 设备台账与负载重分配对象
// ==========================================
// 职责: 设备状态、并联设备关系、重分配策略结构
// 红线: utilization = current_load / capacity * 100，负载变化时必须重算
// ==========================================

use crate::domain::types::{MachineState, RiskLevel, ServiceStage};
use serde::{Deserialize, Serialize};

/// 计算利用率（百分比）；产能为 0 时视为 0
pub fn compute_utilization(load_units_hr: f64, capacity_units_hr: f64) -> f64 {
    if capacity_units_hr <= 0.0 {
        return 0.0;
    }
    load_units_hr / capacity_units_hr * 100.0
}

// ==========================================
// MachineStatus - 设备状态
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineStatus {
    pub id: String,
    pub name: String,
    pub line_id: String,
    pub status: MachineState,
    pub capacity_units_hr: f64,
    pub current_load_units_hr: f64,
    pub utilization: f64,
    #[serde(default)]
    pub is_under_warranty: bool,
    #[serde(default)]
    pub parallel_machine_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_stage: Option<ServiceStage>,
}

impl MachineStatus {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        line_id: impl Into<String>,
        capacity_units_hr: f64,
        current_load_units_hr: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            line_id: line_id.into(),
            status: MachineState::Operational,
            capacity_units_hr,
            current_load_units_hr,
            utilization: compute_utilization(current_load_units_hr, capacity_units_hr),
            is_under_warranty: false,
            parallel_machine_ids: Vec::new(),
            service_stage: None,
        }
    }

    pub fn with_parallel(mut self, ids: &[&str]) -> Self {
        self.parallel_machine_ids = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_status(mut self, status: MachineState) -> Self {
        self.status = status;
        self
    }

    pub fn with_warranty(mut self, under_warranty: bool) -> Self {
        self.is_under_warranty = under_warranty;
        self
    }

    /// 设置负载并重算利用率
    pub fn set_load(&mut self, load_units_hr: f64) {
        self.current_load_units_hr = load_units_hr.max(0.0);
        self.utilization = compute_utilization(self.current_load_units_hr, self.capacity_units_hr);
    }

    pub fn is_operational(&self) -> bool {
        self.status == MachineState::Operational
    }

    /// 在给定利用率上限下的剩余可承接负载
    pub fn headroom_at(&self, ceiling_pct: f64) -> f64 {
        (self.capacity_units_hr * ceiling_pct / 100.0 - self.current_load_units_hr).max(0.0)
    }
}

// ==========================================
// MachineFleet - 设备台账
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MachineFleet {
    machines: Vec<MachineStatus>,
}

impl MachineFleet {
    pub fn new(machines: Vec<MachineStatus>) -> Self {
        Self { machines }
    }

    pub fn machines(&self) -> &[MachineStatus] {
        &self.machines
    }

    pub fn get(&self, machine_id: &str) -> Option<&MachineStatus> {
        self.machines.iter().find(|m| m.id == machine_id)
    }

    /// 可承接负载的并联设备（仅 operational，按台账顺序）
    pub fn parallel_candidates(&self, machine_id: &str) -> Vec<MachineStatus> {
        let Some(machine) = self.get(machine_id) else {
            return Vec::new();
        };
        self.machines
            .iter()
            .filter(|m| m.id != machine.id)
            .filter(|m| machine.parallel_machine_ids.iter().any(|p| p == &m.id))
            .filter(|m| m.is_operational())
            .cloned()
            .collect()
    }

    pub fn down_count(&self) -> usize {
        self.machines
            .iter()
            .filter(|m| m.status == MachineState::Down)
            .count()
    }

    pub(crate) fn get_mut(&mut self, machine_id: &str) -> Option<&mut MachineStatus> {
        self.machines.iter_mut().find(|m| m.id == machine_id)
    }
}

// ==========================================
// 重分配策略
// ==========================================

/// 单步：把一部分负载转给某台并联设备
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedistributionStep {
    pub target_machine_id: String,
    pub additional_load_units: f64,
    pub new_utilization: f64,
    pub risk_level: RiskLevel,
}

/// 重分配策略
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedistributionStrategy {
    pub name: String,
    pub description: String,
    pub steps: Vec<RedistributionStep>,
    /// 停机设备原负载中被转移的部分
    pub recovered_units: f64,
    /// 无法承接、将损失的负载
    pub unserved_units: f64,
    /// 并联设备组在执行后的总产出
    pub projected_throughput: f64,
    pub risk_level: RiskLevel,
}

impl RedistributionStrategy {
    pub fn total_additional_load(&self) -> f64 {
        self.steps.iter().map(|s| s.additional_load_units).sum()
    }
}

/// 外部维修商报价（展示用透传字段）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorEstimate {
    pub vendor_name: String,
    pub repair_estimate_inr: f64,
    #[serde(default)]
    pub warranty_months: u32,
    #[serde(default)]
    pub completion_time: String,
    #[serde(default)]
    pub reputation_score: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub voids_warranty: bool,
}
