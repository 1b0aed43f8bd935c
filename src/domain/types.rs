// ==========================================
// 工厂运营驾驶舱 - 领域类型定义
// ==========================================
// 职责: 人员状态、班次、设备状态、风险等级等枚举
// 序列化格式: 与驾驶舱前端展示文本一致
// ==========================================

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 人员状态 (Worker Status)
// ==========================================
// 红线: 只有 Present 计入在岗人数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkerStatus {
    Present,
    Absent,
    #[serde(rename = "On Leave")]
    OnLeave,
    Emergency,
    Maintenance,
    #[serde(rename = "TPM")]
    Tpm,
    #[serde(rename = "5S")]
    FiveS,
    Training,
    #[serde(rename = "Audit Prep")]
    AuditPrep,
    Support,
}

impl WorkerStatus {
    /// 是否在岗（计入 present）
    pub fn is_present(&self) -> bool {
        matches!(self, WorkerStatus::Present)
    }

    /// 是否缺勤（缺勤/请假/紧急事务）
    pub fn is_away(&self) -> bool {
        matches!(
            self,
            WorkerStatus::Absent | WorkerStatus::OnLeave | WorkerStatus::Emergency
        )
    }

    /// 是否被分派到增值任务
    pub fn is_on_task(&self) -> bool {
        !self.is_present() && !self.is_away()
    }

    pub fn parse(s: &str) -> Option<Self> {
        let key: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "present" => Some(WorkerStatus::Present),
            "absent" => Some(WorkerStatus::Absent),
            "onleave" => Some(WorkerStatus::OnLeave),
            "emergency" => Some(WorkerStatus::Emergency),
            "maintenance" => Some(WorkerStatus::Maintenance),
            "tpm" => Some(WorkerStatus::Tpm),
            "5s" | "fives" => Some(WorkerStatus::FiveS),
            "training" => Some(WorkerStatus::Training),
            "auditprep" => Some(WorkerStatus::AuditPrep),
            "support" => Some(WorkerStatus::Support),
            _ => None,
        }
    }
}

impl fmt::Display for WorkerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerStatus::Present => write!(f, "Present"),
            WorkerStatus::Absent => write!(f, "Absent"),
            WorkerStatus::OnLeave => write!(f, "On Leave"),
            WorkerStatus::Emergency => write!(f, "Emergency"),
            WorkerStatus::Maintenance => write!(f, "Maintenance"),
            WorkerStatus::Tpm => write!(f, "TPM"),
            WorkerStatus::FiveS => write!(f, "5S"),
            WorkerStatus::Training => write!(f, "Training"),
            WorkerStatus::AuditPrep => write!(f, "Audit Prep"),
            WorkerStatus::Support => write!(f, "Support"),
        }
    }
}

// ==========================================
// 人员类型 (Worker Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerType {
    Main,   // 主岗
    Buffer, // 机动
}

impl fmt::Display for WorkerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerType::Main => write!(f, "Main"),
            WorkerType::Buffer => write!(f, "Buffer"),
        }
    }
}

// ==========================================
// 班次 (Shift)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shift {
    A,
    B,
    C,
}

impl Shift {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "A" => Some(Shift::A),
            "B" => Some(Shift::B),
            "C" => Some(Shift::C),
            _ => None,
        }
    }

    /// 按时刻判定班次: A 06:00-14:00, B 14:00-22:00, 其余为 C
    pub fn for_time(time: NaiveTime) -> Self {
        let minutes = time.hour() * 60 + time.minute();
        if (360..840).contains(&minutes) {
            Shift::A
        } else if (840..1320).contains(&minutes) {
            Shift::B
        } else {
            Shift::C
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shift::A => write!(f, "A"),
            Shift::B => write!(f, "B"),
            Shift::C => write!(f, "C"),
        }
    }
}

// ==========================================
// 设备运行状态 (Machine State)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineState {
    Operational,
    Down,
    Maintenance,
}

impl fmt::Display for MachineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MachineState::Operational => write!(f, "operational"),
            MachineState::Down => write!(f, "down"),
            MachineState::Maintenance => write!(f, "maintenance"),
        }
    }
}

// ==========================================
// 服务类型 (Service Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceType {
    Regular,   // 计划保养 -> maintenance
    Breakdown, // 故障抢修 -> down
}

impl ServiceType {
    /// 停机后设备进入的状态
    pub fn resulting_state(&self) -> MachineState {
        match self {
            ServiceType::Regular => MachineState::Maintenance,
            ServiceType::Breakdown => MachineState::Down,
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceType::Regular => write!(f, "Regular"),
            ServiceType::Breakdown => write!(f, "Breakdown"),
        }
    }
}

// ==========================================
// 服务进度 (Service Stage)
// ==========================================
// 有序枚举: 派单 -> 技师到位 -> 诊断 -> 维修中 -> 质检 -> 恢复
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ServiceStage {
    Dispatched,
    #[serde(rename = "Technician Assigned")]
    TechnicianAssigned,
    Diagnosis,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Quality Check")]
    QualityCheck,
    Restored,
}

impl ServiceStage {
    /// 下一阶段（Restored 之后为 None）
    pub fn next(&self) -> Option<ServiceStage> {
        match self {
            ServiceStage::Dispatched => Some(ServiceStage::TechnicianAssigned),
            ServiceStage::TechnicianAssigned => Some(ServiceStage::Diagnosis),
            ServiceStage::Diagnosis => Some(ServiceStage::InProgress),
            ServiceStage::InProgress => Some(ServiceStage::QualityCheck),
            ServiceStage::QualityCheck => Some(ServiceStage::Restored),
            ServiceStage::Restored => None,
        }
    }
}

impl fmt::Display for ServiceStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceStage::Dispatched => write!(f, "Dispatched"),
            ServiceStage::TechnicianAssigned => write!(f, "Technician Assigned"),
            ServiceStage::Diagnosis => write!(f, "Diagnosis"),
            ServiceStage::InProgress => write!(f, "In Progress"),
            ServiceStage::QualityCheck => write!(f, "Quality Check"),
            ServiceStage::Restored => write!(f, "Restored"),
        }
    }
}

// ==========================================
// 风险等级 (Risk Level)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// 排名惩罚分（用于风险/产出权衡）
    pub fn penalty(&self) -> f64 {
        match self {
            RiskLevel::Low => 0.0,
            RiskLevel::Medium => 15.0,
            RiskLevel::High => 40.0,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Medium => write!(f, "Medium"),
            RiskLevel::High => write!(f, "High"),
        }
    }
}
