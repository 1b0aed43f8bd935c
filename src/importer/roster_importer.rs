// ==========================================
// 工厂运营驾驶舱 - 花名册导入器
// ==========================================
// 职责: 从 CSV 读取产线定义与人员池，按班次组装花名册
// 产线 CSV 表头: id, name, takt_time_seconds, required_manpower
// 人员 CSV 表头: id, name, line, type, shift [, status] [, skills]
// 组装规则: 按班次过滤 -> 按归属产线分组 -> Main 进主岗名单，Buffer 进机动名单
// ==========================================

use crate::domain::roster::{ProductionLine, Roster, Worker};
use crate::domain::types::{Shift, WorkerStatus, WorkerType};
use crate::importer::error::ImportError;
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// 产线定义（不含人员）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineDefinition {
    pub id: String,
    pub name: String,
    pub takt_time_seconds: u32,
    pub required_manpower: usize,
}

impl LineDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>, takt_time_seconds: u32, required_manpower: usize) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            takt_time_seconds,
            required_manpower,
        }
    }
}

type RawRecord = HashMap<String, String>;

// ==========================================
// RosterImporter
// ==========================================
pub struct RosterImporter;

impl RosterImporter {
    /// 读取产线定义 CSV
    pub fn parse_lines_csv(path: &Path) -> Result<Vec<LineDefinition>, ImportError> {
        let records = read_csv_file(path)?;
        Self::lines_from_records(&records)
    }

    /// 读取人员池 CSV
    pub fn parse_workers_csv(path: &Path) -> Result<Vec<Worker>, ImportError> {
        let records = read_csv_file(path)?;
        Self::workers_from_records(&records)
    }

    pub fn parse_lines_reader<R: Read>(reader: R) -> Result<Vec<LineDefinition>, ImportError> {
        Self::lines_from_records(&read_csv(reader)?)
    }

    pub fn parse_workers_reader<R: Read>(reader: R) -> Result<Vec<Worker>, ImportError> {
        Self::workers_from_records(&read_csv(reader)?)
    }

    /// 按班次组装花名册
    ///
    /// # 说明
    /// - 产线顺序与定义顺序一致
    /// - 归属产线不存在的人员跳过并告警
    pub fn build_roster_for_shift(
        lines: &[LineDefinition],
        pool: &[Worker],
        shift: Shift,
    ) -> Result<Roster, ImportError> {
        let mut built: Vec<ProductionLine> = lines
            .iter()
            .map(|d| ProductionLine::new(&d.id, &d.name, d.takt_time_seconds, d.required_manpower))
            .collect();

        let mut skipped = 0;
        for worker in pool.iter().filter(|w| w.shift == shift) {
            match built.iter_mut().find(|l| l.id == worker.assigned_line) {
                Some(line) => line.push_worker(worker.clone()),
                None => {
                    tracing::warn!(
                        "人员归属产线不存在，已跳过: worker_id={}, line={}",
                        worker.id,
                        worker.assigned_line
                    );
                    skipped += 1;
                }
            }
        }

        let roster = Roster::new(built)?;
        tracing::info!(
            "花名册组装完成: shift={}, lines={}, workers={}, skipped={}",
            shift,
            roster.lines().len(),
            roster.workers().count(),
            skipped
        );
        Ok(roster)
    }

    /// 读取两个 CSV 并组装花名册
    pub fn import_roster(lines_path: &Path, workers_path: &Path, shift: Shift) -> Result<Roster, ImportError> {
        let lines = Self::parse_lines_csv(lines_path)?;
        let pool = Self::parse_workers_csv(workers_path)?;
        Self::build_roster_for_shift(&lines, &pool, shift)
    }

    fn lines_from_records(records: &[RawRecord]) -> Result<Vec<LineDefinition>, ImportError> {
        records
            .iter()
            .enumerate()
            .map(|(idx, rec)| {
                let row = idx + 2; // 表头占第 1 行
                Ok(LineDefinition {
                    id: required(rec, "id", row)?,
                    name: required(rec, "name", row)?,
                    takt_time_seconds: parse_field(rec, "takt_time_seconds", row)?,
                    required_manpower: parse_field(rec, "required_manpower", row)?,
                })
            })
            .collect()
    }

    fn workers_from_records(records: &[RawRecord]) -> Result<Vec<Worker>, ImportError> {
        records
            .iter()
            .enumerate()
            .map(|(idx, rec)| {
                let row = idx + 2;
                let worker_type = match required(rec, "type", row)?.to_lowercase().as_str() {
                    "main" => WorkerType::Main,
                    "buffer" => WorkerType::Buffer,
                    other => {
                        return Err(ImportError::InvalidValue {
                            row,
                            field: "type".to_string(),
                            value: other.to_string(),
                        })
                    }
                };
                let shift_raw = required(rec, "shift", row)?;
                let shift = Shift::parse(&shift_raw).ok_or_else(|| ImportError::InvalidValue {
                    row,
                    field: "shift".to_string(),
                    value: shift_raw.clone(),
                })?;

                let mut worker = Worker::new(
                    required(rec, "id", row)?,
                    required(rec, "name", row)?,
                    required(rec, "line", row)?,
                    worker_type,
                    shift,
                );

                if let Some(raw) = optional(rec, "status") {
                    worker.status = WorkerStatus::parse(&raw).ok_or_else(|| ImportError::InvalidValue {
                        row,
                        field: "status".to_string(),
                        value: raw.clone(),
                    })?;
                }
                if let Some(raw) = optional(rec, "skills") {
                    for skill in raw.split(';').map(str::trim).filter(|s| !s.is_empty()) {
                        worker = worker.with_skill(skill);
                    }
                }
                Ok(worker)
            })
            .collect()
    }
}

fn read_csv_file(path: &Path) -> Result<Vec<RawRecord>, ImportError> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    if let Some(ext) = path.extension() {
        if !ext.eq_ignore_ascii_case("csv") {
            return Err(ImportError::UnsupportedFormat(ext.to_string_lossy().to_string()));
        }
    }
    read_csv(File::open(path)?)
}

fn read_csv<R: Read>(source: R) -> Result<Vec<RawRecord>, ImportError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // 允许行长度不一致
        .from_reader(source);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        let mut row_map = HashMap::new();
        for (col_idx, value) in record.iter().enumerate() {
            if let Some(header) = headers.get(col_idx) {
                row_map.insert(header.clone(), value.trim().to_string());
            }
        }

        // 跳过完全空白的行
        if row_map.values().all(|v| v.is_empty()) {
            continue;
        }
        records.push(row_map);
    }
    Ok(records)
}

fn optional(rec: &RawRecord, field: &str) -> Option<String> {
    rec.get(field).filter(|v| !v.is_empty()).cloned()
}

fn required(rec: &RawRecord, field: &str, row: usize) -> Result<String, ImportError> {
    optional(rec, field).ok_or_else(|| ImportError::MissingField {
        row,
        field: field.to_string(),
    })
}

fn parse_field<T: std::str::FromStr>(rec: &RawRecord, field: &str, row: usize) -> Result<T, ImportError> {
    let raw = required(rec, field, row)?;
    raw.parse::<T>().map_err(|_| ImportError::InvalidValue {
        row,
        field: field.to_string(),
        value: raw,
    })
}
