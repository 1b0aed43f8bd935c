// ==========================================
// 人力调配 API 集成测试
// ==========================================
// 职责: 验证求解编排（外部规划/兜底）、建议看板、并发控制与演练场景
// ==========================================

mod helpers;

use factory_ops::api::{ApiError, LaborApi};
use factory_ops::config::LaborConfig;
use factory_ops::decision::{LaborAdvisor, PlanSource, PlannerError, RebalancingPlanner, RetryPolicy};
use factory_ops::domain::{ActionKind, ProposedAction, RebalancingResponse, TaskCategory};
use factory_ops::engine::ActionExecutor;
use factory_ops::importer::demo_roster;
use factory_ops::Shift;
use helpers::mock_planner::ScriptedPlanner;
use helpers::test_data_builder::*;
use std::sync::Arc;
use std::time::Duration;

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        attempt_timeout: Duration::from_secs(2),
        initial_backoff: Duration::from_millis(10),
        total_budget: Duration::from_secs(5),
    }
}

fn local_api() -> LaborApi {
    LaborApi::new(
        demo_roster(Shift::A).unwrap(),
        Arc::new(LaborAdvisor::local_only()),
        LaborConfig::default(),
    )
}

fn delegated_api(planner: Arc<ScriptedPlanner>) -> LaborApi {
    let advisor = LaborAdvisor::new(Some(planner as Arc<dyn RebalancingPlanner>), fast_retry());
    LaborApi::new(
        demo_roster(Shift::A).unwrap(),
        Arc::new(advisor),
        LaborConfig::default(),
    )
}

// ==========================================
// 演练场景 + 本地求解
// ==========================================

#[tokio::test]
async fn test_absenteeism_scenario_restores_continuity() {
    let api = local_api();
    let board = api.run_absenteeism_scenario().await.unwrap();

    assert!(board.event.starts_with("Chassis Line Crisis: 83% Absenteeism"));
    assert_eq!(board.source, PlanSource::Local);

    let kinds: Vec<ActionKind> = board.suggestions.iter().map(|s| s.action.kind()).collect();
    assert_eq!(&kinds[..3], &[ActionKind::Move; 3]);
    assert!(kinds[3..].iter().all(|k| *k == ActionKind::AssignTask));
    assert_eq!(board.suggestions[0].action.from_line(), Some("L1"));
    assert_eq!(board.suggestions[2].action.from_line(), Some("L3"));

    // 同一看板内逐条执行不会触发乐观锁
    for suggestion in &board.suggestions {
        let report = api.execute_suggestion_if_unchanged(&suggestion.id).unwrap();
        assert!(report.is_applied());
    }

    let summary = api.get_summary().unwrap();
    assert_eq!(summary.total_deficit, 0);
    assert!(summary.short_lines.is_empty());
    assert!(api.current_board().unwrap().unwrap().is_empty());
}

#[tokio::test]
async fn test_surplus_scenario_rotates_categories() {
    let api = local_api();
    let board = api.run_surplus_scenario().await.unwrap();

    assert!(board.event.starts_with("SITUATION: 100% Attendance"));
    let categories: Vec<&str> = board
        .suggestions
        .iter()
        .map(|s| s.action.task_category().unwrap())
        .collect();
    assert_eq!(
        categories,
        vec!["TPM", "5S", "Training", "Audit Prep", "Logistics Support", "TPM"]
    );
}

#[tokio::test]
async fn test_reset_restores_baseline() {
    let api = local_api();
    let baseline = api.get_roster().unwrap();

    let board = api.run_absenteeism_scenario().await.unwrap();
    api.execute_suggestion(&board.suggestions[0].id).unwrap();
    assert_ne!(api.get_roster().unwrap(), baseline);

    api.reset().unwrap();
    assert_eq!(api.get_roster().unwrap(), baseline);
    assert!(api.current_board().unwrap().is_none());
    assert_eq!(api.last_event().unwrap(), "Shift A Initialized.");
}

// ==========================================
// 外部规划 + 兜底
// ==========================================

#[tokio::test]
async fn test_retryable_failure_falls_back_after_budget() {
    let planner = Arc::new(ScriptedPlanner::failing(PlannerError::Transport("connection reset".into())));
    let api = delegated_api(Arc::clone(&planner));

    let board = api.run_absenteeism_scenario().await.unwrap();

    assert_eq!(planner.calls(), 3);
    assert!(board.source.is_fallback());
    assert_eq!(board.suggestions[0].action.kind(), ActionKind::Move);
}

#[tokio::test]
async fn test_schema_violation_is_not_retried() {
    let planner = Arc::new(ScriptedPlanner::failing(PlannerError::SchemaViolation("missing suggestions".into())));
    let api = delegated_api(Arc::clone(&planner));

    let board = api.request_rebalancing(Some("check")).await.unwrap();

    assert_eq!(planner.calls(), 1);
    assert!(board.source.is_fallback());
    // 演示花名册全员在岗：每条产线富余 2 人
    assert_eq!(board.suggestions.len(), 6);
}

#[tokio::test]
async fn test_invalid_delegated_plan_triggers_fallback() {
    let oversized = ProposedAction::assign_task(
        "TPM".to_string(),
        String::new(),
        Vec::new(),
        vec![
            "Rajesh Kumar (A)".to_string(),
            "Amit Sharma (A)".to_string(),
            "Suresh Patel (A)".to_string(),
        ],
        "L1",
        TaskCategory::Tpm,
    );
    let planner = Arc::new(ScriptedPlanner::ok(RebalancingResponse {
        suggestions: vec![oversized],
    }));
    let api = delegated_api(Arc::clone(&planner));

    let board = api.request_rebalancing(None).await.unwrap();

    assert!(board.source.is_fallback());
    assert!(board
        .suggestions
        .iter()
        .all(|s| s.action.worker_names().len() <= 2));
}

#[tokio::test]
async fn test_plan_ignoring_fixable_deficit_triggers_fallback() {
    let planner = Arc::new(ScriptedPlanner::ok(RebalancingResponse::default()));
    let advisor = LaborAdvisor::new(Some(Arc::clone(&planner) as Arc<dyn RebalancingPlanner>), fast_retry());
    let api = LaborApi::new(
        six_line_roster([4, 2, 4, 4, 6, 4]),
        Arc::new(advisor),
        LaborConfig::default(),
    );

    let board = api.request_rebalancing(Some("L2 short")).await.unwrap();

    assert_eq!(planner.calls(), 1);
    match &board.source {
        PlanSource::Fallback { reason } => assert!(reason.contains("L2"), "reason: {}", reason),
        other => panic!("expected fallback, got {:?}", other),
    }
    assert_eq!(board.suggestions.len(), 2);
    for s in &board.suggestions {
        assert_eq!(s.action.to_line(), Some("L2"));
        api.execute_suggestion(&s.id).unwrap();
    }
    assert_eq!(present_of(&api.get_roster().unwrap(), "L2"), 4);
}

#[tokio::test]
async fn test_valid_delegated_plan_is_used() {
    let action = ProposedAction::assign_task(
        "5S".to_string(),
        String::new(),
        Vec::new(),
        vec!["manoj   tiwari (a)".to_string()],
        "L1",
        TaskCategory::FiveS,
    );
    let planner = Arc::new(ScriptedPlanner::ok(RebalancingResponse {
        suggestions: vec![action],
    }));
    let api = delegated_api(Arc::clone(&planner));

    let board = api.request_rebalancing(None).await.unwrap();

    assert_eq!(
        board.source,
        PlanSource::Delegated {
            planner: "scripted".to_string()
        }
    );
    assert_eq!(board.suggestions.len(), 1);

    let report = api.execute_suggestion(&board.suggestions[0].id).unwrap();
    assert_eq!(report.affected_worker_ids, vec!["TM-A-L1-BUF-6".to_string()]);
}

// ==========================================
// 并发控制
// ==========================================

#[tokio::test]
async fn test_newer_request_supersedes_in_flight_one() {
    let planner = Arc::new(
        ScriptedPlanner::ok(RebalancingResponse::default()).with_delay(Duration::from_millis(150)),
    );
    let api = delegated_api(planner);

    let (first, second) = tokio::join!(api.request_rebalancing(Some("first")), async {
        tokio::time::sleep(Duration::from_millis(30)).await;
        api.request_rebalancing(Some("second")).await
    });

    match first {
        Err(ApiError::SupersededRequest { requested, current }) => {
            assert_eq!(requested, 1);
            assert_eq!(current, 2);
        }
        other => panic!("expected SupersededRequest, got {:?}", other),
    }
    let second = second.unwrap();
    assert_eq!(second.generation, 2);
    assert_eq!(api.current_board().unwrap().unwrap().event, "second");
}

#[tokio::test]
async fn test_reset_discards_in_flight_solve() {
    let planner = Arc::new(
        ScriptedPlanner::ok(RebalancingResponse::default()).with_delay(Duration::from_millis(150)),
    );
    let api = delegated_api(planner);

    let (solve, reset) = tokio::join!(api.request_rebalancing(Some("in flight")), async {
        tokio::time::sleep(Duration::from_millis(30)).await;
        api.reset()
    });

    reset.unwrap();
    assert!(matches!(solve, Err(ApiError::SupersededRequest { requested: 1, current: 2 })));
    assert!(api.current_board().unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_solves_keep_newest_board() {
    let api = Arc::new(local_api());

    let handles: Vec<_> = (0..32)
        .map(|i| {
            let api = Arc::clone(&api);
            tokio::spawn(async move { api.request_rebalancing(Some(&format!("burst {}", i))).await })
        })
        .collect();

    let mut published = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => published += 1,
            Err(ApiError::SupersededRequest { requested, current }) => assert!(requested < current),
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert!(published >= 1);
    let board = api.current_board().unwrap().unwrap();
    assert_eq!(board.generation, api.current_generation());
    assert_eq!(api.current_generation(), 32);
}

#[tokio::test]
async fn test_optimistic_execute_rejects_changed_line() {
    let api = local_api();
    let board = api.run_absenteeism_scenario().await.unwrap();
    let first = board.suggestions[0].clone();
    assert_eq!(first.action.from_line(), Some("L1"));

    // 看板之外的修改：直接对 L1 的一名主岗分派任务
    {
        let handle = api.roster_handle();
        let mut roster = handle.lock().unwrap();
        let external = ProposedAction::assign_task(
            "Training".to_string(),
            String::new(),
            vec!["TM-A-L1-MN-1".to_string()],
            vec!["Rajesh Kumar (A)".to_string()],
            "L1",
            TaskCategory::Training,
        );
        assert!(ActionExecutor::new().apply_action(&external, &mut roster).is_applied());
    }

    let err = api.execute_suggestion_if_unchanged(&first.id).unwrap_err();
    assert!(matches!(err, ApiError::OptimisticLockFailure(_)));
    // 失败后建议仍保留在看板上
    let still_pending = api.current_board().unwrap().unwrap();
    assert!(still_pending.suggestions.iter().any(|s| s.id == first.id));

    // 不做版本校验的执行仍可进行
    assert!(api.execute_suggestion(&first.id).unwrap().is_applied());
}

#[tokio::test]
async fn test_stale_suggestion_id_is_not_found() {
    let api = local_api();
    let board = api.run_absenteeism_scenario().await.unwrap();
    let id = board.suggestions[0].id.clone();

    api.execute_suggestion(&id).unwrap();
    assert!(matches!(api.execute_suggestion(&id), Err(ApiError::NotFound(_))));

    // 新看板替换旧看板，旧ID全部失效
    let old = board.suggestions[1].id.clone();
    api.request_rebalancing(None).await.unwrap();
    assert!(matches!(api.execute_suggestion(&old), Err(ApiError::NotFound(_))));
    assert!(matches!(api.dismiss_suggestion("missing"), Err(ApiError::NotFound(_))));
}

#[tokio::test]
async fn test_custom_roster_shortfall_summary() {
    let api = LaborApi::new(
        six_line_roster([4, 2, 4, 4, 6, 4]),
        Arc::new(LaborAdvisor::local_only()),
        LaborConfig::default(),
    );

    let summary = api.get_summary().unwrap();
    assert_eq!(summary.short_lines, vec!["L2".to_string()]);
    assert_eq!(summary.total_surplus, 2);

    let board = api.request_rebalancing(Some("L2 short")).await.unwrap();
    assert_eq!(board.suggestions.len(), 2);
    for s in &board.suggestions {
        api.execute_suggestion(&s.id).unwrap();
    }
    assert_eq!(present_of(&api.get_roster().unwrap(), "L2"), 4);
}
