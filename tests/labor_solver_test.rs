// ==========================================
// 本地求解器集成测试
// ==========================================
// 职责: 验证连续性优先求解器的核心性质
// 场景: 快照 -> 求解 -> 执行 -> 再快照 -> 再求解
// ==========================================

mod helpers;

use factory_ops::domain::{ActionKind, ProposedAction, RebalancingResponse, Roster};
use factory_ops::engine::{
    validate_plan, ActionExecutor, ContinuityFirstSolver, NameMatcher, MAX_TASK_GROUP_SIZE,
};
use helpers::test_data_builder::*;
use std::collections::HashMap;

fn solve(roster: &Roster) -> RebalancingResponse {
    ContinuityFirstSolver::new().solve(&snapshots(roster), "test event")
}

fn apply_all(roster: &mut Roster, response: &RebalancingResponse) {
    let executor = ActionExecutor::new();
    for action in &response.suggestions {
        let report = executor.apply_action(action, roster);
        assert!(report.is_applied(), "建议未生效: {:?}", action);
    }
}

fn moves(response: &RebalancingResponse) -> Vec<&ProposedAction> {
    response
        .suggestions
        .iter()
        .filter(|a| a.kind() == ActionKind::Move)
        .collect()
}

#[test]
fn test_six_lines_two_moves_from_l5_to_l2() {
    let mut roster = six_line_roster([4, 2, 4, 4, 6, 4]);
    let response = solve(&roster);

    let mv = moves(&response);
    assert_eq!(mv.len(), 2);
    for action in &mv {
        assert_eq!(action.from_line(), Some("L5"));
        assert_eq!(action.to_line(), Some("L2"));
    }
    // 尾部淘汰：L5 名单末尾两人
    assert_eq!(mv[0].worker_ids(), &[worker_id("L5", 4)]);
    assert_eq!(mv[1].worker_ids(), &[worker_id("L5", 5)]);
    assert_eq!(response.suggestions.len(), 2);

    apply_all(&mut roster, &response);
    assert_eq!(present_of(&roster, "L2"), 4);
    assert_eq!(present_of(&roster, "L5"), 4);
}

#[test]
fn test_balanced_roster_yields_empty_suggestions() {
    let roster = six_line_roster([4; 6]);
    let response = solve(&roster);
    assert!(response.suggestions.is_empty());

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json, serde_json::json!({ "suggestions": [] }));
}

#[test]
fn test_surplus_five_groups_two_two_one() {
    let roster = RosterBuilder::new()
        .line("L1", 4, 9)
        .line("L2", 4, 4)
        .line("L3", 4, 4)
        .build();
    let response = solve(&roster);

    assert_eq!(response.suggestions.len(), 3);
    let sizes: Vec<usize> = response
        .suggestions
        .iter()
        .map(|a| a.worker_names().len())
        .collect();
    assert_eq!(sizes, vec![2, 2, 1]);

    let categories: Vec<&str> = response
        .suggestions
        .iter()
        .map(|a| a.task_category().unwrap())
        .collect();
    assert_eq!(categories, vec!["TPM", "5S", "Training"]);
    assert!(response
        .suggestions
        .iter()
        .all(|a| a.kind() == ActionKind::AssignTask));
}

#[test]
fn test_enough_surplus_resolves_all_deficits() {
    let mut roster = RosterBuilder::new()
        .line("L1", 4, 1)
        .line("L2", 4, 2)
        .line("L3", 4, 7)
        .line("L4", 4, 6)
        .build();
    let response = solve(&roster);
    assert_eq!(moves(&response).len(), 5);

    apply_all(&mut roster, &response);
    for line in snapshots(&roster) {
        assert_eq!(line.deficit, 0, "产线 {} 仍缺员", line.line_id);
    }
}

#[test]
fn test_insufficient_surplus_fills_in_line_order() {
    let mut roster = RosterBuilder::new()
        .line("L1", 4, 2)
        .line("L2", 4, 2)
        .line("L3", 4, 7)
        .build();
    let response = solve(&roster);

    let mv = moves(&response);
    assert_eq!(mv.len(), 3);
    assert_eq!(mv[0].to_line(), Some("L1"));
    assert_eq!(mv[1].to_line(), Some("L1"));
    assert_eq!(mv[2].to_line(), Some("L2"));
    // 富余已耗尽，不再有任务分派
    assert_eq!(response.suggestions.len(), 3);

    apply_all(&mut roster, &response);
    assert_eq!(present_of(&roster, "L1"), 4);
    assert_eq!(present_of(&roster, "L2"), 3);
    assert_eq!(present_of(&roster, "L3"), 4);
}

#[test]
fn test_donor_never_drops_below_required() {
    let roster = RosterBuilder::new()
        .line("L1", 4, 0)
        .line("L2", 4, 5)
        .line("L3", 3, 5)
        .line("L4", 4, 1)
        .build();
    let snaps = snapshots(&roster);
    let response = solve(&roster);

    let mut taken: HashMap<&str, usize> = HashMap::new();
    for action in moves(&response) {
        *taken.entry(action.from_line().unwrap()).or_default() += action.worker_names().len();
    }
    for snap in &snaps {
        let out = taken.get(snap.line_id.as_str()).copied().unwrap_or(0);
        assert!(out <= snap.surplus, "产线 {} 调出 {} 超过富余 {}", snap.line_id, out, snap.surplus);
    }
    assert!(validate_plan(&snaps, &response).is_ok());
}

#[test]
fn test_no_assign_before_move_and_group_limit() {
    let roster = RosterBuilder::new()
        .line("L1", 4, 3)
        .line("L2", 4, 9)
        .line("L3", 2, 6)
        .build();
    let response = solve(&roster);

    let first_assign = response
        .suggestions
        .iter()
        .position(|a| a.kind() == ActionKind::AssignTask)
        .unwrap();
    let last_move = response
        .suggestions
        .iter()
        .rposition(|a| a.kind() == ActionKind::Move)
        .unwrap();
    assert!(last_move < first_assign);

    assert!(response
        .suggestions
        .iter()
        .filter(|a| a.kind() == ActionKind::AssignTask)
        .all(|a| a.worker_names().len() <= MAX_TASK_GROUP_SIZE));
}

#[test]
fn test_apply_then_resolve_has_no_redundant_moves() {
    let mut roster = RosterBuilder::new()
        .line("L1", 4, 1)
        .line("L2", 4, 8)
        .line("L3", 4, 6)
        .build();
    let first = solve(&roster);
    apply_all(&mut roster, &first);

    let second = solve(&roster);
    assert!(moves(&second).is_empty());
    assert!(second.suggestions.is_empty());
}

#[test]
fn test_name_normalization_matches() {
    let matcher = NameMatcher::new(&[" john   smith "]);
    assert!(matcher.matches("John Smith"));
    assert!(!matcher.matches("John Smithe"));
}
