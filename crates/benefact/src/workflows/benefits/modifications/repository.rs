use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{ModificationProposal, ProposalId, TargetId, TargetKind};
use crate::workflows::benefits::{MemberId, RepositoryError};

impl ModificationProposal {
    pub fn summary_view(&self) -> ProposalView {
        ProposalView {
            proposal_id: self.id.clone(),
            status: self.status.label(),
            target_kind: self.target_kind.label(),
            action: self.action.label(),
            target_id: self.target_id.clone(),
            target_label: self.target_label.clone(),
            created_at: self.created_at,
            processed_at: self.processed_at,
            staff_comment: self.staff_comment.clone(),
        }
    }
}

/// Sanitized representation of a proposal for listings and API responses.
#[derive(Debug, Clone, Serialize)]
pub struct ProposalView {
    pub proposal_id: ProposalId,
    pub status: &'static str,
    pub target_kind: &'static str,
    pub action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<TargetId>,
    pub target_label: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff_comment: Option<String>,
}

/// Storage abstraction for modification proposals.
///
/// `has_pending_for` backs the duplicate-proposal guard; the engine
/// serializes the probe and the subsequent insert per target, so the
/// repository only needs a consistent point-in-time answer.
pub trait ProposalRepository: Send + Sync {
    fn insert(
        &self,
        proposal: ModificationProposal,
    ) -> Result<ModificationProposal, RepositoryError>;
    fn update(&self, proposal: ModificationProposal) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ProposalId) -> Result<Option<ModificationProposal>, RepositoryError>;
    fn pending(&self, limit: usize) -> Result<Vec<ModificationProposal>, RepositoryError>;
    fn has_pending_for(
        &self,
        requester: &MemberId,
        kind: TargetKind,
        target: &TargetId,
    ) -> Result<bool, RepositoryError>;
}
