// ==========================================
// 工厂运营驾驶舱 - 人力调配 API
// ==========================================
// 职责: 快照查询、调配求解、待执行建议看板、逐条执行、演练场景
// 并发模型:
// - 花名册单写者：执行器与场景触发器在锁内修改，锁不跨 await
// - 代际计数器：新的求解请求使进行中的旧请求失效
// - 产线版本：可选的乐观校验，提出建议后产线被改动则拒绝执行
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::engine_config::LaborConfig;
use crate::decision::labor_advisor::{LaborAdvisor, PlanSource};
use crate::decision::planner::PlannerRequest;
use crate::domain::action::ProposedAction;
use crate::domain::roster::{LineVersions, Roster};
use crate::domain::snapshot::{LineSnapshot, RosterSummary};
use crate::engine::action_executor::{ActionExecutor, ExecutionReport};
use crate::engine::name_matcher::NameMatcher;
use crate::engine::scenario::{ScenarioKind, ScenarioTrigger};
use crate::engine::snapshot::SnapshotBuilder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// 待执行建议
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSuggestion {
    pub id: String,
    pub generation: u64,
    pub action: ProposedAction,
    /// 提出建议时相关产线的版本
    pub line_versions: LineVersions,
}

/// 建议看板（一次求解的结果）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionBoard {
    pub generation: u64,
    pub event: String,
    pub source: PlanSource,
    pub created_at: DateTime<Utc>,
    pub suggestions: Vec<PendingSuggestion>,
}

impl SuggestionBoard {
    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
    }
}

// ==========================================
// LaborApi - 人力调配 API
// ==========================================

/// 人力调配API
///
/// 职责：
/// 1. 花名册快照/汇总查询
/// 2. 调配求解（外部规划优先，本地兜底）
/// 3. 待执行建议看板与逐条执行
/// 4. 演练场景（全员出勤 / 单线缺勤）与重置
pub struct LaborApi {
    roster: Arc<Mutex<Roster>>,
    baseline: Roster,
    advisor: Arc<LaborAdvisor>,
    config: LaborConfig,
    executor: ActionExecutor,
    snapshot_builder: SnapshotBuilder,
    scenario: ScenarioTrigger,
    generation: AtomicU64,
    board: Mutex<Option<SuggestionBoard>>,
    last_event: Mutex<String>,
    active_scenario: Mutex<Option<ScenarioKind>>,
}

impl LaborApi {
    /// 创建新的LaborApi实例
    ///
    /// # 参数
    /// - roster: 初始花名册（同时作为重置/演练的基线）
    pub fn new(roster: Roster, advisor: Arc<LaborAdvisor>, config: LaborConfig) -> Self {
        let initial_event = initial_event(&roster);
        Self {
            baseline: roster.clone(),
            roster: Arc::new(Mutex::new(roster)),
            advisor,
            config,
            executor: ActionExecutor::new(),
            snapshot_builder: SnapshotBuilder::new(),
            scenario: ScenarioTrigger::new(),
            generation: AtomicU64::new(0),
            board: Mutex::new(None),
            last_event: Mutex::new(initial_event),
            active_scenario: Mutex::new(None),
        }
    }

    /// 花名册共享句柄（供快照刷新任务只读使用）
    pub fn roster_handle(&self) -> Arc<Mutex<Roster>> {
        Arc::clone(&self.roster)
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn get_roster(&self) -> ApiResult<Roster> {
        Ok(self.lock_roster()?.clone())
    }

    /// 产线快照（按产线声明顺序）
    pub fn get_snapshot(&self) -> ApiResult<Vec<LineSnapshot>> {
        let roster = self.lock_roster()?;
        Ok(self.snapshot_builder.build(&roster))
    }

    /// 人员分布与缺员汇总
    pub fn get_summary(&self) -> ApiResult<RosterSummary> {
        let roster = self.lock_roster()?;
        Ok(self.snapshot_builder.summarize(&roster))
    }

    pub fn current_board(&self) -> ApiResult<Option<SuggestionBoard>> {
        Ok(lock(&self.board)?.clone())
    }

    pub fn last_event(&self) -> ApiResult<String> {
        Ok(lock(&self.last_event)?.clone())
    }

    pub fn active_scenario(&self) -> ApiResult<Option<ScenarioKind>> {
        Ok(*lock(&self.active_scenario)?)
    }

    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    // ==========================================
    // 求解
    // ==========================================

    /// 请求调配建议
    ///
    /// # 参数
    /// - event: 事件描述；为 None 时沿用上一次事件
    ///
    /// # 返回
    /// - Ok(SuggestionBoard): 新的建议看板（替换旧看板）
    /// - Err(SupersededRequest): 求解期间有更新的请求到达，本次结果作废
    pub async fn request_rebalancing(&self, event: Option<&str>) -> ApiResult<SuggestionBoard> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let event = match event {
            Some(e) => {
                let mut last = lock(&self.last_event)?;
                *last = e.to_string();
                e.to_string()
            }
            None => lock(&self.last_event)?.clone(),
        };

        let (snapshot, versions) = {
            let roster = self.lock_roster()?;
            (self.snapshot_builder.build(&roster), roster.line_versions())
        };

        let request = PlannerRequest::new(event.clone(), snapshot);
        let plan = self.advisor.advise(&request).await;

        let suggestions = plan
            .response
            .suggestions
            .into_iter()
            .map(|action| PendingSuggestion {
                id: uuid::Uuid::new_v4().to_string(),
                generation,
                line_versions: related_versions(&action, &request.snapshot, &versions),
                action,
            })
            .collect();

        let board = SuggestionBoard {
            generation,
            event,
            source: plan.source,
            created_at: Utc::now(),
            suggestions,
        };

        // 代次校验与看板写入在同一把锁内完成
        let mut slot = lock(&self.board)?;
        let current = self.generation.load(Ordering::SeqCst);
        if current != generation {
            tracing::info!(
                "求解结果作废（已有更新请求）: generation={}, current={}",
                generation,
                current
            );
            return Err(ApiError::SupersededRequest {
                requested: generation,
                current,
            });
        }

        tracing::info!(
            "建议看板更新: generation={}, suggestions={}, source={:?}",
            generation,
            board.suggestions.len(),
            board.source
        );

        *slot = Some(board.clone());
        Ok(board)
    }

    // ==========================================
    // 执行
    // ==========================================

    /// 执行看板上的一条建议（执行后从看板移除）
    pub fn execute_suggestion(&self, suggestion_id: &str) -> ApiResult<ExecutionReport> {
        self.execute_inner(suggestion_id, false)
    }

    /// 乐观执行：相关产线自建议提出后被修改过则拒绝（建议保留在看板上）
    pub fn execute_suggestion_if_unchanged(&self, suggestion_id: &str) -> ApiResult<ExecutionReport> {
        self.execute_inner(suggestion_id, true)
    }

    /// 丢弃一条建议
    pub fn dismiss_suggestion(&self, suggestion_id: &str) -> ApiResult<ProposedAction> {
        let mut board = lock(&self.board)?;
        let suggestions = board
            .as_mut()
            .map(|b| &mut b.suggestions)
            .ok_or_else(|| ApiError::NotFound(format!("建议(id={})", suggestion_id)))?;
        let index = suggestions
            .iter()
            .position(|s| s.id == suggestion_id)
            .ok_or_else(|| ApiError::NotFound(format!("建议(id={})", suggestion_id)))?;
        Ok(suggestions.remove(index).action)
    }

    fn execute_inner(&self, suggestion_id: &str, check_versions: bool) -> ApiResult<ExecutionReport> {
        // 锁顺序: board -> roster
        let mut board = lock(&self.board)?;
        let suggestions = board
            .as_mut()
            .map(|b| &mut b.suggestions)
            .ok_or_else(|| ApiError::NotFound(format!("建议(id={})", suggestion_id)))?;
        let index = suggestions
            .iter()
            .position(|s| s.id == suggestion_id)
            .ok_or_else(|| ApiError::NotFound(format!("建议(id={})", suggestion_id)))?;

        let mut roster = self.lock_roster()?;

        if check_versions {
            for (line_id, expected) in &suggestions[index].line_versions {
                let actual = roster.line_version(line_id);
                if actual != Some(*expected) {
                    return Err(ApiError::OptimisticLockFailure(format!(
                        "产线{}已被修改（期望version={}，实际version={}）",
                        line_id,
                        expected,
                        actual.map(|v| v.to_string()).unwrap_or_else(|| "无".to_string())
                    )));
                }
            }
        }

        let before = roster.line_versions();
        let pending = suggestions.remove(index);
        let report = self.executor.apply_action(&pending.action, &mut roster);

        // 同一看板内的执行不视为外部修改
        for line_id in &report.touched_lines {
            let (Some(old), Some(new)) = (before.get(line_id), roster.line_version(line_id)) else {
                continue;
            };
            for other in suggestions.iter_mut() {
                if let Some(recorded) = other.line_versions.get_mut(line_id) {
                    if *recorded == *old {
                        *recorded = new;
                    }
                }
            }
        }

        tracing::info!(
            "建议已执行: id={}, outcome={:?}, remaining={}",
            suggestion_id,
            report.outcome,
            suggestions.len()
        );
        Ok(report)
    }

    // ==========================================
    // 演练场景
    // ==========================================

    /// 全员出勤演练（基于基线花名册）
    pub async fn run_surplus_scenario(&self) -> ApiResult<SuggestionBoard> {
        let event = {
            let mut roster = self.lock_roster()?;
            *roster = self.baseline.clone();
            self.scenario.full_attendance(&mut roster)
        };
        *lock(&self.active_scenario)? = Some(ScenarioKind::SurplusOptimization);
        self.request_rebalancing(Some(&event)).await
    }

    /// 单线缺勤演练（基于基线花名册，目标产线与人数取自配置）
    pub async fn run_absenteeism_scenario(&self) -> ApiResult<SuggestionBoard> {
        let line_id = self.config.absenteeism_line_id.clone();
        let event = {
            let mut candidate = self.baseline.clone();
            let event = self
                .scenario
                .absenteeism(&mut candidate, &line_id, self.config.absenteeism_main_count)
                .ok_or_else(|| ApiError::NotFound(format!("产线(id={})", line_id)))?;
            *self.lock_roster()? = candidate;
            event
        };
        *lock(&self.active_scenario)? = Some(ScenarioKind::AbsenteeismRebalance);
        self.request_rebalancing(Some(&event)).await
    }

    /// 重置：恢复基线花名册，清空看板，作废进行中的求解
    pub fn reset(&self) -> ApiResult<()> {
        // 锁顺序: board -> roster
        let mut board = lock(&self.board)?;
        self.generation.fetch_add(1, Ordering::SeqCst);
        *board = None;
        *self.lock_roster()? = self.baseline.clone();
        drop(board);
        *lock(&self.active_scenario)? = None;
        *lock(&self.last_event)? = initial_event(&self.baseline);
        tracing::info!("人力调配状态已重置");
        Ok(())
    }

    fn lock_roster(&self) -> ApiResult<MutexGuard<'_, Roster>> {
        lock(&self.roster)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> ApiResult<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|e| ApiError::InternalError(format!("锁获取失败: {}", e)))
}

fn initial_event(roster: &Roster) -> String {
    match roster.workers().next() {
        Some(worker) => format!("Shift {} Initialized.", worker.shift),
        None => "Shift Initialized.".to_string(),
    }
}

/// 建议涉及的产线版本（来源/目标产线 + 被点名人员当前所在产线）
fn related_versions(action: &ProposedAction, snapshot: &[LineSnapshot], versions: &LineVersions) -> LineVersions {
    let mut related = LineVersions::new();
    let mut add = |line_id: &str| {
        if let Some(v) = versions.get(line_id) {
            related.insert(line_id.to_string(), *v);
        }
    };

    if let Some(from) = action.from_line() {
        add(from);
    }
    if let Some(to) = action.to_line() {
        add(to);
    }
    let matcher = NameMatcher::new(action.worker_names());
    for line in snapshot {
        let by_id = line
            .present_workers
            .iter()
            .any(|w| action.worker_ids().contains(&w.id));
        let by_name = line.present_worker_names.iter().any(|n| matcher.matches(n));
        if by_id || by_name {
            add(&line.line_id);
        }
    }
    related
}
