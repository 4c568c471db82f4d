use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use super::diff::FieldChange;
use super::domain::{
    ActionKind, ModificationProposal, ProposalId, ProposalStatus, TargetId, TargetKind,
};
use super::repository::ProposalRepository;
use super::targets::TargetGateway;
use crate::sync::KeyedMutex;
use crate::workflows::benefits::values::{
    decode_documents, decode_values, encode_documents, encode_values, DocumentUpload, ValueMap,
};
use crate::workflows::benefits::{MemberId, RepositoryError, StaffId};

static PROPOSAL_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_proposal_id() -> ProposalId {
    let id = PROPOSAL_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ProposalId(format!("chg-{id:06}"))
}

/// Error raised by the modification engine.
#[derive(Debug, thiserror::Error)]
pub enum ModificationError {
    #[error("a modification request is already pending for this {} record", .0.label())]
    DuplicatePending(TargetKind),
    #[error("modification request not found")]
    NotFound,
    #[error("this modification request has already been processed")]
    AlreadyProcessed,
    #[error("the record targeted by this request does not exist")]
    TargetNotFound,
    #[error("new {} records cannot be created through a modification request", .0.label())]
    CreationUnsupported(TargetKind),
    #[error("could not encode or decode proposal payload: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Facade over proposal storage and the per-kind target adapters.
pub struct ModificationEngine<P, G> {
    proposals: Arc<P>,
    targets: Arc<G>,
    proposal_gate: KeyedMutex<(MemberId, TargetKind, TargetId)>,
    decision_gate: KeyedMutex<ProposalId>,
}

impl<P, G> ModificationEngine<P, G>
where
    P: ProposalRepository + 'static,
    G: TargetGateway + 'static,
{
    pub fn new(proposals: Arc<P>, targets: Arc<G>) -> Self {
        Self {
            proposals,
            targets,
            proposal_gate: KeyedMutex::new(),
            decision_gate: KeyedMutex::new(),
        }
    }

    /// Propose changes to an existing record. At most one proposal may be
    /// pending per (requester, kind, target) at a time.
    pub fn propose_modification(
        &self,
        requester: MemberId,
        kind: TargetKind,
        target: TargetId,
        proposed: ValueMap,
        documents: Vec<DocumentUpload>,
    ) -> Result<ModificationProposal, ModificationError> {
        self.propose_modification_at(requester, kind, target, proposed, documents, Utc::now())
    }

    pub fn propose_modification_at(
        &self,
        requester: MemberId,
        kind: TargetKind,
        target: TargetId,
        proposed: ValueMap,
        documents: Vec<DocumentUpload>,
        now: DateTime<Utc>,
    ) -> Result<ModificationProposal, ModificationError> {
        let key = (requester.clone(), kind, target.clone());
        let slot = self.proposal_gate.slot(&key);
        let _serialized = slot.lock().expect("proposal gate poisoned");

        if self.proposals.has_pending_for(&requester, kind, &target)? {
            return Err(ModificationError::DuplicatePending(kind));
        }

        let snapshot = kind
            .adapter()
            .snapshot(self.targets.as_ref(), &target)?
            .ok_or(ModificationError::TargetNotFound)?;

        let proposal = ModificationProposal {
            id: next_proposal_id(),
            requester,
            target_kind: kind,
            action: ActionKind::Modify,
            target_id: Some(target),
            target_label: snapshot.label,
            previous_values_json: Some(encode_values(&snapshot.values)?),
            proposed_values_json: encode_values(&proposed)?,
            documents_json: encode_optional_documents(&documents)?,
            status: ProposalStatus::Pending,
            staff_comment: None,
            created_at: now,
            processed_at: None,
            processed_by: None,
        };

        let stored = self.proposals.insert(proposal)?;
        info!(proposal = %stored.id.0, kind = kind.label(), "modification request filed");
        Ok(stored)
    }

    /// Propose a brand-new record. There is no duplicate guard (no record
    /// exists yet) and no previous-values map; the target id stays empty
    /// until approval back-fills it.
    pub fn propose_creation(
        &self,
        requester: MemberId,
        kind: TargetKind,
        proposed: ValueMap,
        documents: Vec<DocumentUpload>,
    ) -> Result<ModificationProposal, ModificationError> {
        self.propose_creation_at(requester, kind, proposed, documents, Utc::now())
    }

    pub fn propose_creation_at(
        &self,
        requester: MemberId,
        kind: TargetKind,
        proposed: ValueMap,
        documents: Vec<DocumentUpload>,
        now: DateTime<Utc>,
    ) -> Result<ModificationProposal, ModificationError> {
        let adapter = kind.adapter();
        if !adapter.supports_creation() {
            return Err(ModificationError::CreationUnsupported(kind));
        }

        let proposal = ModificationProposal {
            id: next_proposal_id(),
            requester,
            target_kind: kind,
            action: ActionKind::Create,
            target_id: None,
            target_label: adapter.creation_label(&proposed),
            previous_values_json: None,
            proposed_values_json: encode_values(&proposed)?,
            documents_json: encode_optional_documents(&documents)?,
            status: ProposalStatus::Pending,
            staff_comment: None,
            created_at: now,
            processed_at: None,
            processed_by: None,
        };

        let stored = self.proposals.insert(proposal)?;
        info!(proposal = %stored.id.0, kind = kind.label(), "creation request filed");
        Ok(stored)
    }

    /// Approve a pending proposal: dispatch the kind-specific apply or
    /// create routine, then mark the proposal validated. The proposal is
    /// never marked validated unless the target write succeeded.
    pub fn approve(
        &self,
        id: &ProposalId,
        staff: StaffId,
        comment: Option<String>,
    ) -> Result<ModificationProposal, ModificationError> {
        self.approve_at(id, staff, comment, Utc::now())
    }

    pub fn approve_at(
        &self,
        id: &ProposalId,
        staff: StaffId,
        comment: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<ModificationProposal, ModificationError> {
        let slot = self.decision_gate.slot(id);
        let _serialized = slot.lock().expect("decision gate poisoned");

        let mut proposal = self
            .proposals
            .fetch(id)?
            .ok_or(ModificationError::NotFound)?;
        if !proposal.is_pending() {
            return Err(ModificationError::AlreadyProcessed);
        }

        let proposed = decode_values(&proposal.proposed_values_json)?;
        let documents = decode_documents(proposal.documents_json.as_deref())?;
        let adapter = proposal.target_kind.adapter();

        if proposal.is_creation() {
            let created_id = adapter.create(
                self.targets.as_ref(),
                &proposal.requester,
                &proposed,
                &documents,
                now,
            )?;
            proposal.target_id = Some(created_id);
        } else {
            let target = proposal
                .target_id
                .clone()
                .ok_or(ModificationError::TargetNotFound)?;
            adapter.apply(self.targets.as_ref(), &target, &proposed, &documents, now)?;
        }

        proposal.status = ProposalStatus::Validated;
        proposal.processed_at = Some(now);
        proposal.processed_by = Some(staff);
        proposal.staff_comment = comment;

        self.proposals.update(proposal.clone())?;
        info!(proposal = %proposal.id.0, "modification request validated");
        Ok(proposal)
    }

    /// Refuse a pending proposal without touching the target record.
    pub fn reject(
        &self,
        id: &ProposalId,
        staff: StaffId,
        reason: Option<String>,
    ) -> Result<ModificationProposal, ModificationError> {
        self.reject_at(id, staff, reason, Utc::now())
    }

    pub fn reject_at(
        &self,
        id: &ProposalId,
        staff: StaffId,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<ModificationProposal, ModificationError> {
        let slot = self.decision_gate.slot(id);
        let _serialized = slot.lock().expect("decision gate poisoned");

        let mut proposal = self
            .proposals
            .fetch(id)?
            .ok_or(ModificationError::NotFound)?;
        if !proposal.is_pending() {
            return Err(ModificationError::AlreadyProcessed);
        }

        proposal.status = ProposalStatus::Refused;
        proposal.processed_at = Some(now);
        proposal.processed_by = Some(staff);
        proposal.staff_comment = reason;

        self.proposals.update(proposal.clone())?;
        info!(proposal = %proposal.id.0, "modification request refused");
        Ok(proposal)
    }

    /// Field-by-field changes for a reviewer, via the diff engine.
    pub fn compare(&self, id: &ProposalId) -> Result<Vec<FieldChange>, ModificationError> {
        let proposal = self
            .proposals
            .fetch(id)?
            .ok_or(ModificationError::NotFound)?;
        Ok(proposal.review_changes())
    }

    pub fn get(&self, id: &ProposalId) -> Result<ModificationProposal, ModificationError> {
        self.proposals
            .fetch(id)?
            .ok_or(ModificationError::NotFound)
    }

    /// Proposals awaiting review, oldest first by repository contract.
    pub fn pending(&self, limit: usize) -> Result<Vec<ModificationProposal>, ModificationError> {
        Ok(self.proposals.pending(limit)?)
    }
}

fn encode_optional_documents(
    documents: &[DocumentUpload],
) -> Result<Option<String>, serde_json::Error> {
    if documents.is_empty() {
        Ok(None)
    } else {
        encode_documents(documents).map(Some)
    }
}
