use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::diff::FieldChange;
use super::domain::{ProposalId, TargetId, TargetKind};
use super::engine::{ModificationEngine, ModificationError};
use super::repository::{ProposalRepository, ProposalView};
use super::targets::TargetGateway;
use crate::workflows::benefits::values::{DocumentUpload, ValueMap};
use crate::workflows::benefits::{MemberId, StaffId};

/// Router builder exposing HTTP endpoints for filing and reviewing
/// modification requests.
pub fn modification_router<P, G>(engine: Arc<ModificationEngine<P, G>>) -> Router
where
    P: ProposalRepository + 'static,
    G: TargetGateway + 'static,
{
    Router::new()
        .route("/api/v1/members/modifications", post(propose_handler::<P, G>))
        .route(
            "/api/v1/members/modifications/:proposal_id",
            get(review_handler::<P, G>),
        )
        .route(
            "/api/v1/members/modifications/:proposal_id/approve",
            post(approve_handler::<P, G>),
        )
        .route(
            "/api/v1/members/modifications/:proposal_id/reject",
            post(reject_handler::<P, G>),
        )
        .with_state(engine)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProposeBody {
    pub(crate) requester_id: String,
    pub(crate) target_kind: String,
    #[serde(default)]
    pub(crate) target_id: Option<String>,
    pub(crate) values: ValueMap,
    #[serde(default)]
    pub(crate) documents: Vec<DocumentUpload>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DecisionBody {
    pub(crate) staff_id: String,
    #[serde(default)]
    pub(crate) comment: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReviewPayload {
    #[serde(flatten)]
    pub(crate) proposal: ProposalView,
    pub(crate) changes: Vec<FieldChange>,
}

pub(crate) async fn propose_handler<P, G>(
    State(engine): State<Arc<ModificationEngine<P, G>>>,
    axum::Json(body): axum::Json<ProposeBody>,
) -> Response
where
    P: ProposalRepository + 'static,
    G: TargetGateway + 'static,
{
    let Some(kind) = TargetKind::from_label(&body.target_kind) else {
        let payload = json!({
            "error": format!("unknown target kind '{}'", body.target_kind),
        });
        return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
    };

    let requester = MemberId(body.requester_id);
    let outcome = match body.target_id {
        Some(target) => engine.propose_modification(
            requester,
            kind,
            TargetId(target),
            body.values,
            body.documents,
        ),
        None => engine.propose_creation(requester, kind, body.values, body.documents),
    };

    match outcome {
        Ok(proposal) => {
            (StatusCode::ACCEPTED, axum::Json(proposal.summary_view())).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn review_handler<P, G>(
    State(engine): State<Arc<ModificationEngine<P, G>>>,
    Path(proposal_id): Path<String>,
) -> Response
where
    P: ProposalRepository + 'static,
    G: TargetGateway + 'static,
{
    let id = ProposalId(proposal_id);
    match engine.get(&id) {
        Ok(proposal) => {
            let payload = ReviewPayload {
                changes: proposal.review_changes(),
                proposal: proposal.summary_view(),
            };
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn approve_handler<P, G>(
    State(engine): State<Arc<ModificationEngine<P, G>>>,
    Path(proposal_id): Path<String>,
    axum::Json(body): axum::Json<DecisionBody>,
) -> Response
where
    P: ProposalRepository + 'static,
    G: TargetGateway + 'static,
{
    let id = ProposalId(proposal_id);
    match engine.approve(&id, StaffId(body.staff_id), body.comment) {
        Ok(proposal) => (StatusCode::OK, axum::Json(proposal.summary_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reject_handler<P, G>(
    State(engine): State<Arc<ModificationEngine<P, G>>>,
    Path(proposal_id): Path<String>,
    axum::Json(body): axum::Json<DecisionBody>,
) -> Response
where
    P: ProposalRepository + 'static,
    G: TargetGateway + 'static,
{
    let id = ProposalId(proposal_id);
    match engine.reject(&id, StaffId(body.staff_id), body.comment) {
        Ok(proposal) => (StatusCode::OK, axum::Json(proposal.summary_view())).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: ModificationError) -> Response {
    let status = match &error {
        ModificationError::DuplicatePending(_) | ModificationError::AlreadyProcessed => {
            StatusCode::CONFLICT
        }
        ModificationError::NotFound | ModificationError::TargetNotFound => StatusCode::NOT_FOUND,
        ModificationError::CreationUnsupported(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ModificationError::Serialization(_) | ModificationError::Repository(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
