// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use factory_ops::domain::{LineSnapshot, ProductionLine, Roster, Worker};
use factory_ops::domain::{MachineFleet, MachineStatus, VendorEstimate};
use factory_ops::engine::SnapshotBuilder;
use factory_ops::{Shift, WorkerStatus, WorkerType};

/// 人员ID: {line}-W{i}；姓名: Worker {line}-{i}
pub fn worker_id(line_id: &str, index: usize) -> String {
    format!("{}-W{}", line_id, index)
}

pub fn worker_name(line_id: &str, index: usize) -> String {
    format!("Worker {}-{}", line_id, index)
}

// ==========================================
// Roster 构建器
// ==========================================

pub struct RosterBuilder {
    lines: Vec<ProductionLine>,
}

impl RosterBuilder {
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// 添加产线：present 名在岗主岗
    pub fn line(self, line_id: &str, required: usize, present: usize) -> Self {
        self.line_with_absent(line_id, required, present, 0)
    }

    /// 添加产线：present 名在岗主岗 + absent 名缺勤主岗（缺勤者排在后面）
    pub fn line_with_absent(mut self, line_id: &str, required: usize, present: usize, absent: usize) -> Self {
        let mut line = ProductionLine::new(line_id, format!("Line {}", line_id), 90, required);
        for i in 0..present + absent {
            let status = if i < present {
                WorkerStatus::Present
            } else {
                WorkerStatus::Absent
            };
            line.push_worker(
                Worker::new(
                    worker_id(line_id, i),
                    worker_name(line_id, i),
                    line_id,
                    WorkerType::Main,
                    Shift::A,
                )
                .with_status(status),
            );
        }
        self.lines.push(line);
        self
    }

    /// 添加机动人员
    pub fn buffer(mut self, line_id: &str, id: &str, name: &str) -> Self {
        if let Some(line) = self.lines.iter_mut().find(|l| l.id == line_id) {
            line.push_worker(Worker::new(id, name, line_id, WorkerType::Buffer, Shift::A));
        }
        self
    }

    pub fn build(self) -> Roster {
        Roster::new(self.lines).expect("测试花名册无效")
    }
}

/// 产线快照
pub fn snapshots(roster: &Roster) -> Vec<LineSnapshot> {
    SnapshotBuilder::new().build(roster)
}

pub fn present_of(roster: &Roster, line_id: &str) -> usize {
    roster.line(line_id).map(|l| l.present_count()).unwrap_or(0)
}

/// 六条产线（定员 4），按给定在岗人数
pub fn six_line_roster(present: [usize; 6]) -> Roster {
    present
        .iter()
        .enumerate()
        .fold(RosterBuilder::new(), |b, (i, p)| b.line(&format!("L{}", i + 1), 4, *p))
        .build()
}

// ==========================================
// 设备构建器
// ==========================================

/// 焊装组: R01 停机候选 (60/50)，R02 (60/30)，R03 (60/45)，R04 (60/10, maintenance)
pub fn weld_fleet() -> MachineFleet {
    MachineFleet::new(vec![
        MachineStatus::new("R01", "Weld Robot 1", "L2", 60.0, 50.0)
            .with_warranty(true)
            .with_parallel(&["R02", "R03", "R04"]),
        MachineStatus::new("R02", "Weld Robot 2", "L2", 60.0, 30.0).with_parallel(&["R01"]),
        MachineStatus::new("R03", "Weld Robot 3", "L2", 60.0, 45.0).with_parallel(&["R01"]),
        MachineStatus::new("R04", "Weld Robot 4", "L2", 60.0, 10.0)
            .with_status(factory_ops::MachineState::Maintenance)
            .with_parallel(&["R01"]),
    ])
}

pub fn vendor(name: &str, cost: f64, reputation: f64, voids_warranty: bool) -> VendorEstimate {
    VendorEstimate {
        vendor_name: name.to_string(),
        repair_estimate_inr: cost,
        warranty_months: 3,
        completion_time: "24h".to_string(),
        reputation_score: reputation,
        description: String::new(),
        voids_warranty,
    }
}
