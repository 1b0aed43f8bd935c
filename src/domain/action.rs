// ==========================================
// 工厂运营驾驶舱 - 调配建议（ProposedAction）
// ==========================================
// 职责: 定义规划器输出契约（与外部规划服务的 JSON 结构一致）
// 结构: { title, description, executionMetadata{action, workerNames, fromLine, toLine, taskCategory} }
// ==========================================

use crate::domain::types::WorkerStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 动作类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    Move,       // 连续性原则：跨线补位
    AssignTask, // 生产力原则：富余人员转增值任务
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Move => write!(f, "MOVE"),
            ActionKind::AssignTask => write!(f, "ASSIGN_TASK"),
        }
    }
}

// ==========================================
// 增值任务类别（固定目录，轮转分派）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskCategory {
    Tpm,
    FiveS,
    Training,
    AuditPrep,
    Support,
}

impl TaskCategory {
    /// 轮转顺序
    pub const CATALOG: [TaskCategory; 5] = [
        TaskCategory::Tpm,
        TaskCategory::FiveS,
        TaskCategory::Training,
        TaskCategory::AuditPrep,
        TaskCategory::Support,
    ];

    /// 第 index 个分组对应的任务类别
    pub fn round_robin(index: usize) -> TaskCategory {
        Self::CATALOG[index % Self::CATALOG.len()]
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskCategory::Tpm => "TPM",
            TaskCategory::FiveS => "5S",
            TaskCategory::Training => "Training",
            TaskCategory::AuditPrep => "Audit Prep",
            TaskCategory::Support => "Logistics Support",
        }
    }

    /// 宽松解析（大小写/空白/分隔符不敏感）
    pub fn parse(s: &str) -> Option<TaskCategory> {
        let key: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        if key == "tpm" {
            Some(TaskCategory::Tpm)
        } else if key == "5s" || key == "fives" {
            Some(TaskCategory::FiveS)
        } else if key.contains("training") {
            Some(TaskCategory::Training)
        } else if key.contains("audit") {
            Some(TaskCategory::AuditPrep)
        } else if key.contains("support") || key.contains("logistic") {
            Some(TaskCategory::Support)
        } else {
            None
        }
    }

    pub fn worker_status(&self) -> WorkerStatus {
        match self {
            TaskCategory::Tpm => WorkerStatus::Tpm,
            TaskCategory::FiveS => WorkerStatus::FiveS,
            TaskCategory::Training => WorkerStatus::Training,
            TaskCategory::AuditPrep => WorkerStatus::AuditPrep,
            TaskCategory::Support => WorkerStatus::Support,
        }
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 任务类别文本 -> 人员状态
///
/// 未识别的类别一律落到 Support，不报错
pub fn status_for_task_category(category: Option<&str>) -> WorkerStatus {
    let raw = category.unwrap_or("");
    if raw.trim().eq_ignore_ascii_case("maintenance") {
        return WorkerStatus::Maintenance;
    }
    TaskCategory::parse(raw)
        .map(|c| c.worker_status())
        .unwrap_or(WorkerStatus::Support)
}

// ==========================================
// 执行元数据
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionMetadata {
    pub action: ActionKind,
    pub worker_names: Vec<String>,
    /// 人员ID（本地求解器总会填写；外部规划服务可能只给姓名）
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub worker_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_line: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_line: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_category: Option<String>,
}

// ==========================================
// ProposedAction - 调配建议
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedAction {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub execution_metadata: ExecutionMetadata,
}

impl ProposedAction {
    /// 跨线补位建议
    pub fn move_workers(
        title: String,
        description: String,
        worker_ids: Vec<String>,
        worker_names: Vec<String>,
        from_line: &str,
        to_line: &str,
    ) -> Self {
        Self {
            title,
            description,
            execution_metadata: ExecutionMetadata {
                action: ActionKind::Move,
                worker_names,
                worker_ids,
                from_line: Some(from_line.to_string()),
                to_line: Some(to_line.to_string()),
                task_category: None,
            },
        }
    }

    /// 增值任务分派建议
    pub fn assign_task(
        title: String,
        description: String,
        worker_ids: Vec<String>,
        worker_names: Vec<String>,
        from_line: &str,
        category: TaskCategory,
    ) -> Self {
        Self {
            title,
            description,
            execution_metadata: ExecutionMetadata {
                action: ActionKind::AssignTask,
                worker_names,
                worker_ids,
                from_line: Some(from_line.to_string()),
                to_line: None,
                task_category: Some(category.label().to_string()),
            },
        }
    }

    pub fn kind(&self) -> ActionKind {
        self.execution_metadata.action
    }

    pub fn worker_names(&self) -> &[String] {
        &self.execution_metadata.worker_names
    }

    pub fn worker_ids(&self) -> &[String] {
        &self.execution_metadata.worker_ids
    }

    pub fn from_line(&self) -> Option<&str> {
        self.execution_metadata.from_line.as_deref()
    }

    pub fn to_line(&self) -> Option<&str> {
        self.execution_metadata.to_line.as_deref()
    }

    pub fn task_category(&self) -> Option<&str> {
        self.execution_metadata.task_category.as_deref()
    }
}

/// 规划器响应 `{ suggestions: [...] }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RebalancingResponse {
    #[serde(default)]
    pub suggestions: Vec<ProposedAction>,
}
