use serde::{Deserialize, Serialize};

/// Identifier wrapper for submitted benefit requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub String);

/// Processing status of a benefit request.
///
/// `Submitted` is the initial status. `Accepted`, `Rejected`, and
/// `Completed` are terminal for the workflow, although staff transitions
/// are deliberately unconstrained so a mis-click can be corrected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Submitted,
    InProgress,
    Accepted,
    Rejected,
    Completed,
}

impl RequestStatus {
    pub const fn label(self) -> &'static str {
        match self {
            RequestStatus::Submitted => "submitted",
            RequestStatus::InProgress => "in_progress",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Completed => "completed",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "submitted" => Some(RequestStatus::Submitted),
            "in_progress" => Some(RequestStatus::InProgress),
            "accepted" => Some(RequestStatus::Accepted),
            "rejected" => Some(RequestStatus::Rejected),
            "completed" => Some(RequestStatus::Completed),
            _ => None,
        }
    }

    /// Whether the request still holds a seat against the offering quota
    /// and blocks a second submission by the same member. Accepted requests
    /// stay active; rejected and completed ones free their seat.
    pub const fn is_active(self) -> bool {
        matches!(
            self,
            RequestStatus::Submitted | RequestStatus::InProgress | RequestStatus::Accepted
        )
    }

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            RequestStatus::Accepted | RequestStatus::Rejected | RequestStatus::Completed
        )
    }
}
