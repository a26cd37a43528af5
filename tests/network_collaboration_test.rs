// ==========================================
// NetworkApi / CollaborationApi 集成测试
// ==========================================
// 测试范围:
// 1. 网络关系校验: 自环 / 未知端点 / 重复 / 删除 / 并发重复创建
// 2. 协同记录状态机 / 并发流转只允许一个成功
// ==========================================


use std::sync::{Arc, Barrier};
use std::thread;

use chrono::{Local, NaiveDate};
use supply_planning::api::ApiError;
use supply_planning::app::AppState;
use supply_planning::db::open_shared_connection;
use supply_planning::domain::{
    CollaborationStatus, NewCollaborationRecord, NewNodeRelationship, NodeType, SupplyNode,
};
use supply_planning::repository::{CollaborationRepository, RepositoryError};
use test_helpers::create_test_state;

fn node(id: &str, node_type: NodeType) -> SupplyNode {
    SupplyNode {
        node_id: id.to_string(),
        name: format!("节点{}", id),
        node_type,
        location_code: None,
    }
}

fn seed_network(state: &AppState) {
    for n in [
        node("PLANT1", NodeType::Plant),
        node("DC1", NodeType::DistributionCenter),
        node("WH1", NodeType::Warehouse),
        node("WH2", NodeType::Warehouse),
    ] {
        state.network_api.upsert_node(&n).expect("保存节点失败");
    }
}

fn link(from: &str, to: &str, product_id: Option<&str>) -> NewNodeRelationship {
    NewNodeRelationship {
        from_node_id: from.to_string(),
        to_node_id: to.to_string(),
        product_id: product_id.map(String::from),
        lead_time_days: 3,
    }
}

// ==========================================
// 供应网络
// ==========================================

#[test]
fn test_create_relationship_与下游查询() {
    let (_tmp, state) = create_test_state().expect("无法创建测试环境");
    seed_network(&state);

    let rel = state
        .network_api
        .create_relationship(&link("DC1", "WH1", None))
        .expect("创建关系失败");
    assert_eq!(rel.relationship_id.len(), 36);
    state
        .network_api
        .create_relationship(&link("DC1", "WH2", Some("P1")))
        .expect("创建关系失败");

    let downstream = state
        .network_api
        .get_downstream_nodes("DC1")
        .expect("查询下游失败");
    let ids: Vec<&str> = downstream.iter().map(|n| n.node_id.as_str()).collect();
    assert_eq!(ids, vec!["WH1", "WH2"]);
}

#[test]
fn test_create_relationship_拒绝自环() {
    let (_tmp, state) = create_test_state().expect("无法创建测试环境");
    seed_network(&state);

    let result = state.network_api.create_relationship(&link("DC1", "DC1", None));
    assert!(matches!(result, Err(ApiError::BusinessRuleViolation(_))));
}

#[test]
fn test_create_relationship_端点不存在() {
    let (_tmp, state) = create_test_state().expect("无法创建测试环境");
    seed_network(&state);

    let result = state.network_api.create_relationship(&link("DC1", "GHOST", None));
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[test]
fn test_create_relationship_拒绝重复() {
    let (_tmp, state) = create_test_state().expect("无法创建测试环境");
    seed_network(&state);

    state
        .network_api
        .create_relationship(&link("PLANT1", "DC1", None))
        .expect("创建关系失败");
    let dup = state.network_api.create_relationship(&link("PLANT1", "DC1", None));
    assert!(matches!(dup, Err(ApiError::BusinessRuleViolation(_))));

    // 限定产品的关系与通用关系不冲突
    state
        .network_api
        .create_relationship(&link("PLANT1", "DC1", Some("P1")))
        .expect("产品关系应可创建");
}

#[test]
fn test_create_relationship_并发重复只成功一次() {
    let (_tmp, state) = create_test_state().expect("无法创建测试环境");
    seed_network(&state);

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = (0..2)
        .map(|_| {
            let api = state.network_api.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                api.create_relationship(&link("PLANT1", "WH1", None))
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("线程异常"))
        .collect();
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(ApiError::BusinessRuleViolation(_)))));
    assert_eq!(state.network_api.list_relationships().expect("查询失败").len(), 1);
}

#[test]
fn test_delete_relationship() {
    let (_tmp, state) = create_test_state().expect("无法创建测试环境");
    seed_network(&state);

    let rel = state
        .network_api
        .create_relationship(&link("PLANT1", "DC1", None))
        .expect("创建关系失败");
    state
        .network_api
        .delete_relationship(&rel.relationship_id)
        .expect("删除失败");

    assert!(state.network_api.list_relationships().expect("查询失败").is_empty());
    let again = state.network_api.delete_relationship(&rel.relationship_id);
    assert!(matches!(again, Err(ApiError::NotFound(_))));
}

// ==========================================
// 商务协同
// ==========================================

fn new_record(product_id: &str, quantity: f64) -> NewCollaborationRecord {
    NewCollaborationRecord {
        product_id: product_id.to_string(),
        customer_id: "C1".to_string(),
        period: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        proposed_quantity: quantity,
        comment: "促销备货".to_string(),
        created_by: String::new(),
    }
}

#[test]
fn test_collaboration_完整流转() {
    let (_tmp, state) = create_test_state().expect("无法创建测试环境");
    let api = &state.collaboration_api;

    let record = api.create_record(&new_record("P1", 120.0)).expect("创建失败");
    assert_eq!(record.status, CollaborationStatus::Draft);
    assert_eq!(record.created_by, "system");

    let submitted = api
        .transition_status(&record.record_id, CollaborationStatus::Submitted)
        .expect("提交失败");
    assert_eq!(submitted.status, CollaborationStatus::Submitted);

    let rejected = api
        .transition_status(&record.record_id, CollaborationStatus::Rejected)
        .expect("驳回失败");
    assert_eq!(rejected.status, CollaborationStatus::Rejected);

    let reworked = api
        .transition_status(&record.record_id, CollaborationStatus::Draft)
        .expect("退回失败");
    assert_eq!(reworked.status, CollaborationStatus::Draft);

    let stored = api.get_record(&record.record_id).expect("查询失败");
    assert_eq!(stored.status, CollaborationStatus::Draft);
    assert_eq!(stored.updated_at, reworked.updated_at);
}

#[test]
fn test_collaboration_非法流转() {
    let (_tmp, state) = create_test_state().expect("无法创建测试环境");
    let api = &state.collaboration_api;

    let record = api.create_record(&new_record("P1", 10.0)).expect("创建失败");
    let result = api.transition_status(&record.record_id, CollaborationStatus::Accepted);

    match result {
        Err(ApiError::InvalidStateTransition { from, to }) => {
            assert_eq!(from, "DRAFT");
            assert_eq!(to, "ACCEPTED");
        }
        other => panic!("期望 InvalidStateTransition, 实际 {:?}", other),
    }
}

#[test]
fn test_collaboration_校验与过滤() {
    let (_tmp, state) = create_test_state().expect("无法创建测试环境");
    let api = &state.collaboration_api;

    let invalid = api.create_record(&new_record("P1", -5.0));
    assert!(matches!(invalid, Err(ApiError::InvalidInput(_))));

    api.create_record(&new_record("P1", 1.0)).expect("创建失败");
    api.create_record(&new_record("P2", 2.0)).expect("创建失败");

    let p2 = api.list_records(Some("P2"), None).expect("查询失败");
    assert_eq!(p2.len(), 1);
    assert_eq!(p2[0].proposed_quantity, 2.0);
    assert_eq!(api.list_records(None, None).expect("查询失败").len(), 2);
}

#[test]
fn test_collaboration_过期状态更新被拒绝() {
    let (_tmp, state) = create_test_state().expect("无法创建测试环境");
    let api = &state.collaboration_api;

    let record = api.create_record(&new_record("P1", 50.0)).expect("创建失败");
    api.transition_status(&record.record_id, CollaborationStatus::Submitted)
        .expect("提交失败");
    api.transition_status(&record.record_id, CollaborationStatus::Accepted)
        .expect("采纳失败");

    // 以 SUBMITTED 为前提的迟到更新
    let repo = CollaborationRepository::from_connection(
        open_shared_connection(&state.db_path).expect("打开连接失败"),
    );
    let stale = repo.update_status(
        &record.record_id,
        CollaborationStatus::Submitted,
        CollaborationStatus::Rejected,
        Local::now().naive_local(),
    );
    match stale {
        Err(RepositoryError::OptimisticLockFailure { expected, actual, .. }) => {
            assert_eq!(expected, "SUBMITTED");
            assert_eq!(actual, "ACCEPTED");
        }
        other => panic!("期望 OptimisticLockFailure, 实际 {:?}", other),
    }

    let missing = repo.update_status(
        "no-such-record",
        CollaborationStatus::Draft,
        CollaborationStatus::Submitted,
        Local::now().naive_local(),
    );
    assert!(matches!(missing, Err(RepositoryError::NotFound { .. })));

    let stored = api.get_record(&record.record_id).expect("查询失败");
    assert_eq!(stored.status, CollaborationStatus::Accepted);
}

#[test]
fn test_collaboration_并发采纳与驳回只成功一个() {
    let (_tmp, state) = create_test_state().expect("无法创建测试环境");
    let record = state
        .collaboration_api
        .create_record(&new_record("P1", 80.0))
        .expect("创建失败");
    state
        .collaboration_api
        .transition_status(&record.record_id, CollaborationStatus::Submitted)
        .expect("提交失败");

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = [CollaborationStatus::Accepted, CollaborationStatus::Rejected]
        .into_iter()
        .map(|next| {
            let api = state.collaboration_api.clone();
            let barrier = barrier.clone();
            let record_id = record.record_id.clone();
            thread::spawn(move || {
                barrier.wait();
                api.transition_status(&record_id, next)
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("线程异常"))
        .collect();
    let winners: Vec<CollaborationStatus> = results
        .iter()
        .filter_map(|r| r.as_ref().ok().map(|rec| rec.status))
        .collect();
    assert_eq!(winners.len(), 1);
    assert!(results.iter().any(|r| matches!(
        r,
        Err(ApiError::OptimisticLockFailure(_)) | Err(ApiError::InvalidStateTransition { .. })
    )));

    let stored = state
        .collaboration_api
        .get_record(&record.record_id)
        .expect("查询失败");
    assert_eq!(stored.status, winners[0]);
}
