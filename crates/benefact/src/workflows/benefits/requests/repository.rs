use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{RequestId, RequestStatus};
use crate::workflows::benefits::catalog::OfferingId;
use crate::workflows::benefits::{MemberId, RepositoryError, StaffId};

/// One member's application to an offering, as persisted.
///
/// Answers and attached documents are stored as serialized payloads the
/// workflow treats as opaque; only the status and processing metadata are
/// mutated after submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenefitRequest {
    pub id: RequestId,
    pub member: MemberId,
    pub offering: OfferingId,
    pub status: RequestStatus,
    pub answers_json: Option<String>,
    pub documents_json: Option<String>,
    pub staff_comment: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub finalized_at: Option<DateTime<Utc>>,
    pub processed_by: Option<StaffId>,
}

impl BenefitRequest {
    pub fn status_view(&self) -> RequestStatusView {
        RequestStatusView {
            request_id: self.id.clone(),
            offering_id: self.offering.clone(),
            status: self.status.label(),
            submitted_at: self.submitted_at,
            processed_at: self.processed_at,
            finalized_at: self.finalized_at,
            staff_comment: self.staff_comment.clone(),
        }
    }
}

/// Sanitized representation of a request's exposed status.
#[derive(Debug, Clone, Serialize)]
pub struct RequestStatusView {
    pub request_id: RequestId,
    pub offering_id: OfferingId,
    pub status: &'static str,
    pub submitted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finalized_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff_comment: Option<String>,
}

/// Storage abstraction for benefit requests.
///
/// The two count queries back the eligibility gate and must reflect every
/// committed insert; the service serializes submissions per offering so a
/// count-then-insert pair observes a stable view.
pub trait RequestRepository: Send + Sync {
    fn insert(&self, record: BenefitRequest) -> Result<BenefitRequest, RepositoryError>;
    fn update(&self, record: BenefitRequest) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &RequestId) -> Result<Option<BenefitRequest>, RepositoryError>;
    fn pending(&self, limit: usize) -> Result<Vec<BenefitRequest>, RepositoryError>;
    fn count_active_for_offering(&self, offering: &OfferingId) -> Result<u64, RepositoryError>;
    fn count_active_for_member(
        &self,
        member: &MemberId,
        offering: &OfferingId,
    ) -> Result<u64, RepositoryError>;
}
