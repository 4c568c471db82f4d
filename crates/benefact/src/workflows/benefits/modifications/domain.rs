use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::benefits::{MemberId, StaffId};

/// Identifier wrapper for modification proposals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProposalId(pub String);

/// Identifier of a member, spouse, or dependent record targeted by a
/// proposal. Assigned by the target gateway.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetId(pub String);

/// The closed set of record kinds a proposal may affect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Member,
    Spouse,
    Dependent,
}

impl TargetKind {
    pub const fn label(self) -> &'static str {
        match self {
            TargetKind::Member => "member",
            TargetKind::Spouse => "spouse",
            TargetKind::Dependent => "dependent",
        }
    }

    pub const fn display(self) -> &'static str {
        match self {
            TargetKind::Member => "Member",
            TargetKind::Spouse => "Spouse",
            TargetKind::Dependent => "Dependent",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "member" => Some(TargetKind::Member),
            "spouse" => Some(TargetKind::Spouse),
            "dependent" => Some(TargetKind::Dependent),
            _ => None,
        }
    }
}

/// Whether the proposal edits an existing record or creates a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Modify,
    Create,
}

impl ActionKind {
    pub const fn label(self) -> &'static str {
        match self {
            ActionKind::Modify => "modification",
            ActionKind::Create => "creation",
        }
    }
}

/// Review status of a proposal. `Pending` is initial; the other two are
/// terminal and reached exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Pending,
    Validated,
    Refused,
}

impl ProposalStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ProposalStatus::Pending => "pending",
            ProposalStatus::Validated => "validated",
            ProposalStatus::Refused => "refused",
        }
    }
}

/// A pending or resolved change request, as persisted.
///
/// Value maps and documents are stored serialized. After creation only the
/// status and processing metadata change, except that approving a creation
/// back-fills `target_id` with the id the gateway assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModificationProposal {
    pub id: ProposalId,
    pub requester: MemberId,
    pub target_kind: TargetKind,
    pub action: ActionKind,
    pub target_id: Option<TargetId>,
    pub target_label: String,
    pub previous_values_json: Option<String>,
    pub proposed_values_json: String,
    pub documents_json: Option<String>,
    pub status: ProposalStatus,
    pub staff_comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub processed_by: Option<StaffId>,
}

impl ModificationProposal {
    pub fn is_creation(&self) -> bool {
        self.action == ActionKind::Create
    }

    pub fn is_pending(&self) -> bool {
        self.status == ProposalStatus::Pending
    }

    /// Field-by-field changes for review, via the diff engine.
    pub fn review_changes(&self) -> Vec<super::diff::FieldChange> {
        super::diff::compare_serialized(
            self.previous_values_json.as_deref(),
            Some(&self.proposed_values_json),
        )
    }
}
