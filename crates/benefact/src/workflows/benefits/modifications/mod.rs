//! Review-then-apply change proposals for member household records.
//!
//! A member (or an administrator acting for one) assembles proposed field
//! values and documents for a member, spouse, or dependent record. The
//! engine snapshots the record's current values, stores the proposal as
//! pending, and lets a reviewer compare old and new field by field. On
//! approval the proposal is dispatched to its target kind's apply routine,
//! which mutates or creates the target record; rejection only closes the
//! proposal.

pub mod diff;
pub mod domain;
pub mod engine;
pub mod repository;
pub mod router;
pub mod targets;

#[cfg(test)]
mod tests;

pub use diff::{compare, compare_serialized, field_label, is_document_field, FieldChange};
pub use domain::{
    ActionKind, ModificationProposal, ProposalId, ProposalStatus, TargetId, TargetKind,
};
pub use engine::{ModificationEngine, ModificationError};
pub use repository::{ProposalRepository, ProposalView};
pub use router::modification_router;
pub use targets::{DependentRecord, MemberRecord, SpouseRecord, TargetGateway};
