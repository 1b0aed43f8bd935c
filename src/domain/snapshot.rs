// ==========================================
// 工厂运营驾驶舱 - 产线快照（决策输入）
// ==========================================
// 职责: 花名册在某一时刻的最小投影，供规划器使用
// 生命周期: 每次求解重新计算，不落库
// ==========================================

use serde::{Deserialize, Serialize};

/// 快照中的在岗人员（ID 用于执行匹配，姓名用于展示）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotWorker {
    pub id: String,
    pub name: String,
}

/// 产线快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSnapshot {
    pub line_id: String,
    pub line_name: String,
    pub required: usize,
    pub present: usize,
    pub surplus: usize,
    pub deficit: usize,
    /// 在岗人员姓名（主岗在前，机动在后）
    pub present_worker_names: Vec<String>,
    #[serde(default)]
    pub present_workers: Vec<SnapshotWorker>,
    /// 快照时刻的产线版本
    #[serde(default)]
    pub version: u64,
}

impl LineSnapshot {
    pub fn is_short(&self) -> bool {
        self.deficit > 0
    }
}

/// 人员分布统计（驾驶舱汇总卡片）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationSummary {
    pub present: usize,
    /// Absent + On Leave + Emergency
    pub absent: usize,
    pub maintenance: usize,
    pub tpm: usize,
    pub five_s: usize,
    pub training: usize,
    pub audit_prep: usize,
    pub support: usize,
}

/// 花名册汇总
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterSummary {
    pub allocation: AllocationSummary,
    pub total_workers: usize,
    pub total_surplus: usize,
    pub total_deficit: usize,
    pub short_lines: Vec<String>,
}

impl RosterSummary {
    pub fn is_any_line_short(&self) -> bool {
        !self.short_lines.is_empty()
    }
}
