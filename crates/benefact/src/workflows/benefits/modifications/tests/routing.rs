use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;

use super::common::{build_engine, member, spouse_record, text, values, MemoryTargets};
use crate::workflows::benefits::modifications::domain::{TargetId, TargetKind};
use crate::workflows::benefits::modifications::router::{
    approve_handler, propose_handler, reject_handler, review_handler, DecisionBody, ProposeBody,
};

async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

fn propose_body(target_id: Option<&str>) -> ProposeBody {
    ProposeBody {
        requester_id: "adh-1".to_string(),
        target_kind: "spouse".to_string(),
        target_id: target_id.map(str::to_string),
        values: values(&[("phone", text("0611111111"))]),
        documents: Vec::new(),
    }
}

fn decision(staff: &str) -> DecisionBody {
    DecisionBody {
        staff_id: staff.to_string(),
        comment: None,
    }
}

#[tokio::test]
async fn propose_handler_files_a_modification() {
    let (engine, _, _) = build_engine(MemoryTargets::with_spouse(spouse_record("sp-1", "adh-1")));

    let response = propose_handler(State(engine), axum::Json(propose_body(Some("sp-1")))).await;

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("status").and_then(Value::as_str), Some("pending"));
    assert_eq!(
        payload.get("action").and_then(Value::as_str),
        Some("modification")
    );
}

#[tokio::test]
async fn propose_handler_routes_missing_target_to_creation() {
    let (engine, _, _) = build_engine(MemoryTargets::default());

    let response = propose_handler(State(engine), axum::Json(propose_body(None))).await;

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload.get("action").and_then(Value::as_str),
        Some("creation")
    );
}

#[tokio::test]
async fn propose_handler_rejects_unknown_kinds() {
    let (engine, _, _) = build_engine(MemoryTargets::default());

    let mut body = propose_body(None);
    body.target_kind = "vehicle".to_string();
    let response = propose_handler(State(engine), axum::Json(body)).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn propose_handler_returns_conflict_for_duplicate_pending() {
    let (engine, _, _) = build_engine(MemoryTargets::with_spouse(spouse_record("sp-1", "adh-1")));

    engine
        .propose_modification(
            member("adh-1"),
            TargetKind::Spouse,
            TargetId("sp-1".to_string()),
            values(&[("phone", text("0611111111"))]),
            Vec::new(),
        )
        .expect("first proposal");

    let response = propose_handler(State(engine), axum::Json(propose_body(Some("sp-1")))).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn review_handler_includes_field_changes() {
    let (engine, _, _) = build_engine(MemoryTargets::with_spouse(spouse_record("sp-1", "adh-1")));
    let proposal = engine
        .propose_modification(
            member("adh-1"),
            TargetKind::Spouse,
            TargetId("sp-1".to_string()),
            values(&[("phone", text("0611111111"))]),
            Vec::new(),
        )
        .expect("proposal filed");

    let response = review_handler(State(engine), Path(proposal.id.0.clone())).await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let changes = payload
        .get("changes")
        .and_then(Value::as_array)
        .expect("changes array");
    assert_eq!(changes.len(), 1);
    assert_eq!(
        changes[0].get("field").and_then(Value::as_str),
        Some("phone")
    );
    assert_eq!(
        changes[0].get("label").and_then(Value::as_str),
        Some("Phone number")
    );
}

#[tokio::test]
async fn approve_then_reject_reports_conflict() {
    let (engine, _, _) = build_engine(MemoryTargets::with_spouse(spouse_record("sp-1", "adh-1")));
    let proposal = engine
        .propose_modification(
            member("adh-1"),
            TargetKind::Spouse,
            TargetId("sp-1".to_string()),
            values(&[("phone", text("0611111111"))]),
            Vec::new(),
        )
        .expect("proposal filed");

    let response = approve_handler(
        State(engine.clone()),
        Path(proposal.id.0.clone()),
        axum::Json(decision("staff-1")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = reject_handler(
        State(engine),
        Path(proposal.id.0.clone()),
        axum::Json(decision("staff-2")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn review_handler_returns_not_found_for_unknown_proposal() {
    let (engine, _, _) = build_engine(MemoryTargets::default());

    let response = review_handler(State(engine), Path("chg-404".to_string())).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
