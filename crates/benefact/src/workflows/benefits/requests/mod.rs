//! Benefit request intake and processing lifecycle.
//!
//! Members apply to an offering through [`service::BenefitRequestService`];
//! the eligibility gate re-runs at submission time under a per-offering
//! lock so the quota and single-active-request invariants hold even for
//! concurrent submissions. Staff then move a request through the
//! processing statuses until it reaches a terminal one.

pub mod domain;
pub mod eligibility;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{RequestId, RequestStatus};
pub use eligibility::{EligibilityRefusal, OfferingActivity};
pub use repository::{BenefitRequest, RequestRepository, RequestStatusView};
pub use router::benefit_request_router;
pub use service::{BenefitRequestService, RequestServiceError};
