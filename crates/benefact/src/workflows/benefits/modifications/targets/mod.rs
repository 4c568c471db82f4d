//! Target-kind dispatch for modification proposals.
//!
//! Each record kind owns its modifiable-field whitelist, document slots,
//! value extraction, and apply/create routines, co-located in its module.
//! [`TargetKind::adapter`] is the single lookup the engine dispatches
//! through; [`TargetGateway`] is the dumb storage surface underneath.

pub mod dependent;
pub mod member;
pub mod spouse;

pub use dependent::DependentRecord;
pub use member::MemberRecord;
pub use spouse::SpouseRecord;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{TargetId, TargetKind};
use super::engine::ModificationError;
use crate::workflows::benefits::values::{DocumentUpload, ValueMap};
use crate::workflows::benefits::{MemberId, RepositoryError};

/// A populated document attachment point on a target record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSlot {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl DocumentSlot {
    pub fn from_upload(upload: &DocumentUpload) -> Self {
        Self {
            filename: upload.filename.clone(),
            content_type: upload.content_type.clone(),
            data: upload.data.clone(),
        }
    }
}

/// Current state of a target record as seen by a proposal: its display
/// label and the extracted field values.
#[derive(Debug, Clone)]
pub struct TargetSnapshot {
    pub label: String,
    pub values: ValueMap,
}

/// Storage surface for the three record kinds. Save assigns an id when the
/// record does not carry one yet and returns the definitive id either way.
pub trait TargetGateway: Send + Sync {
    fn load_member(&self, id: &TargetId) -> Result<Option<MemberRecord>, RepositoryError>;
    fn save_member(&self, record: MemberRecord) -> Result<TargetId, RepositoryError>;

    fn load_spouse(&self, id: &TargetId) -> Result<Option<SpouseRecord>, RepositoryError>;
    fn save_spouse(&self, record: SpouseRecord) -> Result<TargetId, RepositoryError>;

    fn load_dependent(&self, id: &TargetId) -> Result<Option<DependentRecord>, RepositoryError>;
    fn save_dependent(&self, record: DependentRecord) -> Result<TargetId, RepositoryError>;
}

/// Per-kind capability surface the engine dispatches through.
pub trait KindAdapter: Send + Sync {
    /// Whether new records of this kind may be proposed at all.
    fn supports_creation(&self) -> bool;

    /// Display label for a creation proposal, built from proposed values.
    fn creation_label(&self, values: &ValueMap) -> String;

    /// Load the target and extract its current values and label.
    fn snapshot(
        &self,
        gateway: &dyn TargetGateway,
        id: &TargetId,
    ) -> Result<Option<TargetSnapshot>, RepositoryError>;

    /// Apply whitelisted fields and matching documents to an existing
    /// record, stamp its modification time, and persist it.
    fn apply(
        &self,
        gateway: &dyn TargetGateway,
        id: &TargetId,
        values: &ValueMap,
        documents: &[DocumentUpload],
        at: DateTime<Utc>,
    ) -> Result<(), ModificationError>;

    /// Build a new record for `owner` from whitelisted values, attach
    /// documents, persist it, and return the assigned id.
    fn create(
        &self,
        gateway: &dyn TargetGateway,
        owner: &MemberId,
        values: &ValueMap,
        documents: &[DocumentUpload],
        at: DateTime<Utc>,
    ) -> Result<TargetId, ModificationError>;
}

impl TargetKind {
    /// The kind-to-implementation lookup used by every engine operation.
    pub fn adapter(self) -> &'static dyn KindAdapter {
        match self {
            TargetKind::Member => &member::MemberAdapter,
            TargetKind::Spouse => &spouse::SpouseAdapter,
            TargetKind::Dependent => &dependent::DependentAdapter,
        }
    }
}

/// Text value for a label slot, tolerating absent or non-text entries.
pub(super) fn label_part(values: &ValueMap, key: &str) -> String {
    values
        .get(key)
        .and_then(|value| value.as_text())
        .unwrap_or_default()
}
