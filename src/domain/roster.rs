// ==========================================
// 工厂运营驾驶舱 - 人员花名册模型
// ==========================================
// 职责: 产线、人员及其状态/归属的内存表示
// 红线: 人员状态与归属产线只能由动作执行器或场景触发器修改
// 红线: 每名人员在任一时刻只出现在一条产线的主岗或机动名单中
// ==========================================

use crate::domain::types::{Shift, WorkerStatus, WorkerType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use thiserror::Error;

/// 产线版本表（line_id -> version），用于乐观并发校验
pub type LineVersions = BTreeMap<String, u64>;

// ==========================================
// 花名册错误
// ==========================================
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RosterError {
    #[error("产线ID重复: {0}")]
    DuplicateLine(String),

    #[error("人员ID重复: {0}")]
    DuplicateWorker(String),

    #[error("产线定员必须大于0: line_id={0}")]
    InvalidRequiredManpower(String),
}

// ==========================================
// Worker - 人员
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub skills: BTreeSet<String>,
    pub status: WorkerStatus,
    #[serde(rename = "type")]
    pub worker_type: WorkerType,
    pub assigned_line: String,
    pub shift: Shift,
}

impl Worker {
    /// 创建在岗人员（技能为空）
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        assigned_line: impl Into<String>,
        worker_type: WorkerType,
        shift: Shift,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            skills: BTreeSet::new(),
            status: WorkerStatus::Present,
            worker_type,
            assigned_line: assigned_line.into(),
            shift,
        }
    }

    pub fn with_status(mut self, status: WorkerStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_skill(mut self, skill: impl Into<String>) -> Self {
        self.skills.insert(skill.into());
        self
    }
}

// ==========================================
// ProductionLine - 产线
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionLine {
    pub id: String,
    pub name: String,
    pub takt_time_seconds: u32,
    pub required_manpower: usize,
    #[serde(default)]
    pub current_workers: Vec<Worker>,
    #[serde(default)]
    pub buffers: Vec<Worker>,
    /// 产线版本号（每次人员变动 +1）
    #[serde(default)]
    pub version: u64,
}

impl ProductionLine {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        takt_time_seconds: u32,
        required_manpower: usize,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            takt_time_seconds,
            required_manpower,
            current_workers: Vec::new(),
            buffers: Vec::new(),
            version: 0,
        }
    }

    /// 按人员类型放入主岗或机动名单
    pub fn push_worker(&mut self, worker: Worker) {
        match worker.worker_type {
            WorkerType::Main => self.current_workers.push(worker),
            WorkerType::Buffer => self.buffers.push(worker),
        }
    }

    pub fn with_worker(mut self, worker: Worker) -> Self {
        self.push_worker(worker);
        self
    }

    /// 主岗 + 机动，按名单顺序
    pub fn all_workers(&self) -> impl Iterator<Item = &Worker> {
        self.current_workers.iter().chain(self.buffers.iter())
    }

    /// 在岗人员（主岗在前，机动在后）
    pub fn present_workers(&self) -> impl Iterator<Item = &Worker> {
        self.all_workers().filter(|w| w.status.is_present())
    }

    pub fn present_count(&self) -> usize {
        self.present_workers().count()
    }

    pub(crate) fn bump_version(&mut self) {
        self.version += 1;
    }
}

// ==========================================
// Roster - 花名册
// ==========================================
/// 进程内花名册
///
/// 只读访问对外开放；修改入口限定在 crate 内的动作执行器与场景触发器
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    lines: Vec<ProductionLine>,
}

impl Roster {
    /// 校验并创建花名册
    ///
    /// # 校验
    /// - 产线ID唯一
    /// - 人员ID全局唯一（跨产线、跨主岗/机动）
    /// - 定员 > 0
    pub fn new(lines: Vec<ProductionLine>) -> Result<Self, RosterError> {
        let mut line_ids = HashSet::new();
        let mut worker_ids = HashSet::new();

        for line in &lines {
            if !line_ids.insert(line.id.as_str()) {
                return Err(RosterError::DuplicateLine(line.id.clone()));
            }
            if line.required_manpower == 0 {
                return Err(RosterError::InvalidRequiredManpower(line.id.clone()));
            }
            for worker in line.all_workers() {
                if !worker_ids.insert(worker.id.as_str()) {
                    return Err(RosterError::DuplicateWorker(worker.id.clone()));
                }
            }
        }

        Ok(Self { lines })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[ProductionLine] {
        &self.lines
    }

    pub fn line(&self, line_id: &str) -> Option<&ProductionLine> {
        self.lines.iter().find(|l| l.id == line_id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn workers(&self) -> impl Iterator<Item = &Worker> {
        self.lines.iter().flat_map(|l| l.all_workers())
    }

    /// 查找人员及其所在产线
    pub fn find_worker(&self, worker_id: &str) -> Option<(&ProductionLine, &Worker)> {
        self.lines.iter().find_map(|line| {
            line.all_workers()
                .find(|w| w.id == worker_id)
                .map(|w| (line, w))
        })
    }

    pub fn line_version(&self, line_id: &str) -> Option<u64> {
        self.line(line_id).map(|l| l.version)
    }

    pub fn line_versions(&self) -> LineVersions {
        self.lines
            .iter()
            .map(|l| (l.id.clone(), l.version))
            .collect()
    }

    pub(crate) fn line_mut(&mut self, line_id: &str) -> Option<&mut ProductionLine> {
        self.lines.iter_mut().find(|l| l.id == line_id)
    }

    pub(crate) fn lines_mut(&mut self) -> &mut [ProductionLine] {
        &mut self.lines
    }
}
