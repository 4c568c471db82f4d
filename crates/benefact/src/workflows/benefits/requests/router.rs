use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{RequestId, RequestStatus};
use super::repository::RequestRepository;
use super::service::{BenefitRequestService, RequestServiceError};
use crate::workflows::benefits::catalog::{OfferingId, OfferingRepository};
use crate::workflows::benefits::values::{DocumentUpload, ValueMap};
use crate::workflows::benefits::{MemberId, RepositoryError, StaffId};

/// Router builder exposing HTTP endpoints for intake and staff processing.
pub fn benefit_request_router<R, O>(service: Arc<BenefitRequestService<R, O>>) -> Router
where
    R: RequestRepository + 'static,
    O: OfferingRepository + 'static,
{
    Router::new()
        .route("/api/v1/benefits/requests", post(submit_handler::<R, O>))
        .route(
            "/api/v1/benefits/requests/:request_id",
            get(status_handler::<R, O>),
        )
        .route(
            "/api/v1/benefits/requests/:request_id/status",
            post(transition_handler::<R, O>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitRequestBody {
    pub(crate) member_id: String,
    pub(crate) offering_id: String,
    #[serde(default)]
    pub(crate) answers: Option<ValueMap>,
    #[serde(default)]
    pub(crate) documents: Vec<DocumentUpload>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransitionBody {
    pub(crate) status: String,
    #[serde(default)]
    pub(crate) comment: Option<String>,
    #[serde(default)]
    pub(crate) staff_id: Option<String>,
}

pub(crate) async fn submit_handler<R, O>(
    State(service): State<Arc<BenefitRequestService<R, O>>>,
    axum::Json(body): axum::Json<SubmitRequestBody>,
) -> Response
where
    R: RequestRepository + 'static,
    O: OfferingRepository + 'static,
{
    let member = MemberId(body.member_id);
    let offering = OfferingId(body.offering_id);

    match service.submit(member, &offering, body.answers, body.documents) {
        Ok(record) => (StatusCode::ACCEPTED, axum::Json(record.status_view())).into_response(),
        Err(RequestServiceError::NotEligible(refusal)) => {
            let payload = json!({
                "error": refusal.to_string(),
                "rule": refusal.rule(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(RequestServiceError::OfferingNotFound) => {
            let payload = json!({
                "error": "offering not found",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn status_handler<R, O>(
    State(service): State<Arc<BenefitRequestService<R, O>>>,
    Path(request_id): Path<String>,
) -> Response
where
    R: RequestRepository + 'static,
    O: OfferingRepository + 'static,
{
    let id = RequestId(request_id);
    match service.get(&id) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(RequestServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({
                "error": "request not found",
                "request_id": id.0,
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn transition_handler<R, O>(
    State(service): State<Arc<BenefitRequestService<R, O>>>,
    Path(request_id): Path<String>,
    axum::Json(body): axum::Json<TransitionBody>,
) -> Response
where
    R: RequestRepository + 'static,
    O: OfferingRepository + 'static,
{
    let Some(status) = RequestStatus::from_label(&body.status) else {
        let payload = json!({
            "error": format!("unknown status '{}'", body.status),
        });
        return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
    };

    let id = RequestId(request_id);
    let processor = body.staff_id.map(StaffId);

    match service.set_status(&id, status, body.comment, processor) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(RequestServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({
                "error": "request not found",
                "request_id": id.0,
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
