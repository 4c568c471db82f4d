//! The eligibility gate: a pure decision over an offering, a storage
//! activity snapshot, and today's date. Rules run in order and stop at the
//! first refusal; the caller is expected to re-run the gate at submission
//! time under the per-offering lock rather than trust an earlier check.

use chrono::NaiveDate;

use super::super::catalog::Offering;

/// Counts the gate needs from storage, taken for one (member, offering)
/// pair. "Active" follows [`super::domain::RequestStatus::is_active`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfferingActivity {
    pub active_requests: u64,
    pub member_active_requests: u64,
}

/// Why a member may not apply, naming the first rule that failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EligibilityRefusal {
    #[error("offering is closed to new requests")]
    OfferingClosed,
    #[error("offering does not open until {opens_on}")]
    BeforeWindow { opens_on: NaiveDate },
    #[error("offering closed on {closed_on}")]
    AfterWindow { closed_on: NaiveDate },
    #[error("offering quota reached ({active}/{quota} active requests)")]
    QuotaReached { quota: u32, active: u64 },
    #[error("member already has an active request for this offering")]
    DuplicateActiveRequest,
}

impl EligibilityRefusal {
    /// Stable identifier for API payloads and logs.
    pub const fn rule(&self) -> &'static str {
        match self {
            EligibilityRefusal::OfferingClosed => "closed_offering",
            EligibilityRefusal::BeforeWindow { .. } => "before_window",
            EligibilityRefusal::AfterWindow { .. } => "after_window",
            EligibilityRefusal::QuotaReached { .. } => "quota_reached",
            EligibilityRefusal::DuplicateActiveRequest => "duplicate_active_request",
        }
    }
}

/// Run the ordered eligibility rules. Window edges are inclusive: a
/// submission on the start or end date itself is allowed.
pub fn evaluate(
    offering: &Offering,
    activity: &OfferingActivity,
    today: NaiveDate,
) -> Result<(), EligibilityRefusal> {
    if !offering.open {
        return Err(EligibilityRefusal::OfferingClosed);
    }

    if let Some(opens_on) = offering.window_start {
        if today < opens_on {
            return Err(EligibilityRefusal::BeforeWindow { opens_on });
        }
    }

    if let Some(closed_on) = offering.window_end {
        if today > closed_on {
            return Err(EligibilityRefusal::AfterWindow { closed_on });
        }
    }

    if !offering.unlimited() && activity.active_requests >= u64::from(offering.quota) {
        return Err(EligibilityRefusal::QuotaReached {
            quota: offering.quota,
            active: activity.active_requests,
        });
    }

    if activity.member_active_requests > 0 {
        return Err(EligibilityRefusal::DuplicateActiveRequest);
    }

    Ok(())
}
