// ==========================================
// 工厂运营驾驶舱 - 演示数据生成
// ==========================================
// 职责: 生成确定性的演示人员池、产线定义与设备台账
// 规模: 3 个班次 x 6 条产线 x (4 主岗 + 2 机动)；定员 4，节拍 90 秒
// ==========================================

use crate::domain::machine::{MachineFleet, MachineStatus};
use crate::domain::roster::{Roster, Worker};
use crate::domain::types::{MachineState, Shift, WorkerType};
use crate::importer::error::ImportError;
use crate::importer::roster_importer::{LineDefinition, RosterImporter};

pub const DEMO_LINE_NAMES: [&str; 6] = [
    "Trim Line",
    "Chassis Line",
    "Door Assembly",
    "Seat Fitment",
    "Marriage Line",
    "Final Assembly",
];

const DEMO_WORKER_NAMES: [&str; 36] = [
    "Rajesh Kumar", "Amit Sharma", "Suresh Patel", "Vijay Singh", "Rahul Gupta", "Manoj Tiwari",
    "Sanjay Yadav", "Anil Mehta", "Sunil Deshmukh", "Deepak Kulkarni", "Rakesh Verma", "Mahesh Joshi",
    "Vinod Reddy", "Santosh Nair", "Arvind Chauhan", "Dinesh Mishra", "Pankaj Rawat", "Ajay Thapar",
    "Vikram Malhotra", "Jitendra Saxena", "Prashant Rao", "Sandeep Pathak", "Nitin Ghadge", "Ashish Ranade",
    "Abhijit Bhave", "Yogesh Shinde", "Swapnil Pawar", "Sagar More", "Amol Gaikwad", "Kiran Thorat",
    "Sameer Salunkhe", "Rahul Waghmare", "Vishal Sawant", "Rohan Parab", "Akshay Kamble", "Sumit Jadhav",
];

const WORKERS_PER_LINE: usize = 6;
const MAIN_PER_LINE: usize = 4;

/// 演示产线定义（L1..L6）
pub fn demo_line_definitions() -> Vec<LineDefinition> {
    DEMO_LINE_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| LineDefinition::new(format!("L{}", i + 1), *name, 90, 4))
        .collect()
}

/// 演示人员池（三个班次）
///
/// 人员ID: TM-{班次}-{产线}-{MN|BUF}-{序号}；姓名带班次后缀
pub fn demo_worker_pool() -> Vec<Worker> {
    let mut pool = Vec::new();
    for shift in [Shift::A, Shift::B, Shift::C] {
        let mut name_index = 0;
        for line in demo_line_definitions() {
            for i in 1..=WORKERS_PER_LINE {
                let is_buffer = i > MAIN_PER_LINE;
                let (tag, worker_type) = if is_buffer {
                    ("BUF", WorkerType::Buffer)
                } else {
                    ("MN", WorkerType::Main)
                };
                pool.push(
                    Worker::new(
                        format!("TM-{}-{}-{}-{}", shift, line.id, tag, i),
                        format!("{} ({})", DEMO_WORKER_NAMES[name_index % DEMO_WORKER_NAMES.len()], shift),
                        line.id.clone(),
                        worker_type,
                        shift,
                    )
                    .with_skill("Assembly"),
                );
                name_index += 1;
            }
        }
    }
    pool
}

/// 指定班次的演示花名册
pub fn demo_roster(shift: Shift) -> Result<Roster, ImportError> {
    RosterImporter::build_roster_for_shift(&demo_line_definitions(), &demo_worker_pool(), shift)
}

/// 演示设备台账（冲压/焊装/涂装/物流）
pub fn demo_fleet() -> MachineFleet {
    MachineFleet::new(vec![
        MachineStatus::new("P01", "Press 2000T-01", "L1", 40.0, 36.0)
            .with_warranty(true)
            .with_parallel(&["P02"]),
        MachineStatus::new("P02", "Press 2000T-02", "L1", 40.0, 34.0)
            .with_warranty(true)
            .with_parallel(&["P01"]),
        MachineStatus::new("LC1", "Laser Cutter X1", "L1", 50.0, 48.0)
            .with_warranty(true)
            .with_parallel(&["LC2"]),
        MachineStatus::new("LC2", "Laser Cutter X2", "L1", 50.0, 0.0)
            .with_warranty(true)
            .with_status(MachineState::Maintenance)
            .with_parallel(&["LC1"]),
        MachineStatus::new("R01", "Weld Robot A1", "L2", 60.0, 56.0).with_parallel(&["R02", "R03"]),
        MachineStatus::new("R02", "Weld Robot A2", "L2", 60.0, 50.0)
            .with_warranty(true)
            .with_parallel(&["R01", "R03", "R04"]),
        MachineStatus::new("R03", "Weld Robot B1", "L2", 60.0, 40.0).with_parallel(&["R01", "R02"]),
        MachineStatus::new("R04", "Weld Robot B2", "L2", 60.0, 45.0)
            .with_warranty(true)
            .with_parallel(&["R02"]),
        MachineStatus::new("PB1", "Paint Booth A", "L3", 20.0, 19.0).with_parallel(&["PB2"]),
        MachineStatus::new("PB2", "Paint Booth B", "L3", 20.0, 18.0).with_parallel(&["PB1"]),
        MachineStatus::new("AGV1", "Tugger Bot 01", "LOG", 100.0, 88.0).with_parallel(&["AGV2"]),
        MachineStatus::new("AGV2", "Tugger Bot 02", "LOG", 100.0, 90.0).with_parallel(&["AGV1"]),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_roster_shape() {
        let roster = demo_roster(Shift::B).unwrap();
        assert_eq!(roster.lines().len(), 6);
        for line in roster.lines() {
            assert_eq!(line.required_manpower, 4);
            assert_eq!(line.takt_time_seconds, 90);
            assert_eq!(line.current_workers.len(), 4);
            assert_eq!(line.buffers.len(), 2);
        }
        assert_eq!(roster.lines()[1].name, "Chassis Line");
        assert_eq!(roster.lines()[0].current_workers[0].id, "TM-B-L1-MN-1");
        assert_eq!(roster.lines()[0].buffers[1].name, "Manoj Tiwari (B)");
    }

    #[test]
    fn test_demo_pool_ids_unique_across_shifts() {
        let pool = demo_worker_pool();
        assert_eq!(pool.len(), 3 * 6 * 6);
        let ids: std::collections::HashSet<&str> = pool.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids.len(), pool.len());
    }

    #[test]
    fn test_demo_fleet_candidates() {
        let fleet = demo_fleet();
        let ids: Vec<String> = fleet.parallel_candidates("R02").into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["R01", "R03", "R04"]);
        assert!(fleet.parallel_candidates("LC1").is_empty());
    }
}
