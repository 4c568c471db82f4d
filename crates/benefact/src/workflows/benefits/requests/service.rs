use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use super::domain::{RequestId, RequestStatus};
use super::eligibility::{self, EligibilityRefusal, OfferingActivity};
use super::repository::{BenefitRequest, RequestRepository};
use crate::sync::KeyedMutex;
use crate::workflows::benefits::catalog::{Offering, OfferingId, OfferingRepository};
use crate::workflows::benefits::values::{
    encode_documents, encode_values, DocumentUpload, ValueMap,
};
use crate::workflows::benefits::{MemberId, RepositoryError, StaffId};

static REQUEST_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_request_id() -> RequestId {
    let id = REQUEST_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    RequestId(format!("req-{id:06}"))
}

/// Intake and processing facade for benefit requests.
pub struct BenefitRequestService<R, O> {
    requests: Arc<R>,
    offerings: Arc<O>,
    submission_gate: KeyedMutex<OfferingId>,
}

impl<R, O> BenefitRequestService<R, O>
where
    R: RequestRepository + 'static,
    O: OfferingRepository + 'static,
{
    pub fn new(requests: Arc<R>, offerings: Arc<O>) -> Self {
        Self {
            requests,
            offerings,
            submission_gate: KeyedMutex::new(),
        }
    }

    /// Submit a new request, re-running the eligibility gate first.
    pub fn submit(
        &self,
        member: MemberId,
        offering: &OfferingId,
        answers: Option<ValueMap>,
        documents: Vec<DocumentUpload>,
    ) -> Result<BenefitRequest, RequestServiceError> {
        self.submit_at(member, offering, answers, documents, Utc::now())
    }

    /// Submission with an explicit clock, serialized per offering so the
    /// quota count, the duplicate count, and the insert see one state.
    pub fn submit_at(
        &self,
        member: MemberId,
        offering_id: &OfferingId,
        answers: Option<ValueMap>,
        documents: Vec<DocumentUpload>,
        now: DateTime<Utc>,
    ) -> Result<BenefitRequest, RequestServiceError> {
        let slot = self.submission_gate.slot(offering_id);
        let _serialized = slot.lock().expect("submission gate poisoned");

        let offering = self
            .offerings
            .fetch(offering_id)?
            .ok_or(RequestServiceError::OfferingNotFound)?;
        self.ensure_eligible(&member, &offering, now)?;

        let record = BenefitRequest {
            id: next_request_id(),
            member,
            offering: offering.id.clone(),
            status: RequestStatus::Submitted,
            answers_json: answers.map(|map| encode_values(&map)).transpose()?,
            documents_json: if documents.is_empty() {
                None
            } else {
                Some(encode_documents(&documents)?)
            },
            staff_comment: None,
            submitted_at: now,
            processed_at: None,
            finalized_at: None,
            processed_by: None,
        };

        let stored = self.requests.insert(record)?;
        info!(request = %stored.id.0, offering = %stored.offering.0, "benefit request submitted");
        Ok(stored)
    }

    /// Whether the gate would currently let `member` apply.
    pub fn can_apply(
        &self,
        member: &MemberId,
        offering_id: &OfferingId,
    ) -> Result<bool, RequestServiceError> {
        match self.check_eligibility(member, offering_id) {
            Ok(()) => Ok(true),
            Err(RequestServiceError::NotEligible(_)) => Ok(false),
            Err(other) => Err(other),
        }
    }

    /// Run the gate without submitting, reporting the refusal if any.
    pub fn check_eligibility(
        &self,
        member: &MemberId,
        offering_id: &OfferingId,
    ) -> Result<(), RequestServiceError> {
        let offering = self
            .offerings
            .fetch(offering_id)?
            .ok_or(RequestServiceError::OfferingNotFound)?;
        self.ensure_eligible(member, &offering, Utc::now())
    }

    fn ensure_eligible(
        &self,
        member: &MemberId,
        offering: &Offering,
        now: DateTime<Utc>,
    ) -> Result<(), RequestServiceError> {
        let activity = OfferingActivity {
            active_requests: self.requests.count_active_for_offering(&offering.id)?,
            member_active_requests: self
                .requests
                .count_active_for_member(member, &offering.id)?,
        };
        eligibility::evaluate(offering, &activity, now.date_naive())?;
        Ok(())
    }

    /// Staff transition. Status, comment, and processor are always
    /// overwritten; the processing timestamp is stamped only on the first
    /// move into `InProgress`, while a terminal transition re-stamps the
    /// finalization timestamp every time it happens.
    pub fn set_status(
        &self,
        id: &RequestId,
        status: RequestStatus,
        comment: Option<String>,
        processor: Option<StaffId>,
    ) -> Result<BenefitRequest, RequestServiceError> {
        self.set_status_at(id, status, comment, processor, Utc::now())
    }

    pub fn set_status_at(
        &self,
        id: &RequestId,
        status: RequestStatus,
        comment: Option<String>,
        processor: Option<StaffId>,
        now: DateTime<Utc>,
    ) -> Result<BenefitRequest, RequestServiceError> {
        let mut record = self
            .requests
            .fetch(id)?
            .ok_or(RequestServiceError::Repository(RepositoryError::NotFound))?;

        record.status = status;
        record.staff_comment = comment;
        record.processed_by = processor;

        if status == RequestStatus::InProgress && record.processed_at.is_none() {
            record.processed_at = Some(now);
        }
        if status.is_terminal() {
            record.finalized_at = Some(now);
        }

        self.requests.update(record.clone())?;
        info!(request = %record.id.0, status = status.label(), "benefit request transitioned");
        Ok(record)
    }

    pub fn get(&self, id: &RequestId) -> Result<BenefitRequest, RequestServiceError> {
        self.requests
            .fetch(id)?
            .ok_or(RequestServiceError::Repository(RepositoryError::NotFound))
    }

    /// Requests awaiting staff action, oldest first by repository contract.
    pub fn pending(&self, limit: usize) -> Result<Vec<BenefitRequest>, RequestServiceError> {
        Ok(self.requests.pending(limit)?)
    }
}

/// Error raised by the benefit request service.
#[derive(Debug, thiserror::Error)]
pub enum RequestServiceError {
    #[error("member is not eligible: {0}")]
    NotEligible(#[from] EligibilityRefusal),
    #[error("offering not found")]
    OfferingNotFound,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("could not encode request payload: {0}")]
    Serialization(#[from] serde_json::Error),
}
