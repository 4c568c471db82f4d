use std::sync::Arc;

use chrono::{Duration, Utc};

use super::common::{build_service, member, offering};
use crate::workflows::benefits::catalog::OfferingId;
use crate::workflows::benefits::requests::domain::{RequestId, RequestStatus};
use crate::workflows::benefits::requests::eligibility::EligibilityRefusal;
use crate::workflows::benefits::requests::repository::RequestRepository;
use crate::workflows::benefits::requests::service::RequestServiceError;
use crate::workflows::benefits::values::{DocumentUpload, FieldValue, ValueMap};
use crate::workflows::benefits::{RepositoryError, StaffId};

#[test]
fn submit_persists_an_initial_record() {
    let (service, requests) = build_service(vec![offering("off-1", 0)]);

    let mut answers = ValueMap::new();
    answers.insert("reason".to_string(), FieldValue::Text("first stay".into()));
    let documents = vec![DocumentUpload::new(
        "enrollment_form",
        "form.pdf",
        "application/pdf",
        vec![1, 2, 3],
    )];

    let record = service
        .submit(
            member("adh-1"),
            &OfferingId("off-1".to_string()),
            Some(answers),
            documents,
        )
        .expect("submission succeeds");

    assert_eq!(record.status, RequestStatus::Submitted);
    assert!(record.answers_json.is_some());
    assert!(record.documents_json.is_some());
    assert!(record.processed_at.is_none());
    assert!(record.finalized_at.is_none());

    let stored = requests
        .fetch(&record.id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored.status, RequestStatus::Submitted);
}

#[test]
fn submit_unknown_offering_is_refused() {
    let (service, _) = build_service(vec![]);

    match service.submit(
        member("adh-1"),
        &OfferingId("off-missing".to_string()),
        None,
        Vec::new(),
    ) {
        Err(RequestServiceError::OfferingNotFound) => {}
        other => panic!("expected missing offering, got {other:?}"),
    }
}

#[test]
fn second_submission_by_same_member_is_refused() {
    let (service, _) = build_service(vec![offering("off-1", 0)]);
    let offering_id = OfferingId("off-1".to_string());

    service
        .submit(member("adh-1"), &offering_id, None, Vec::new())
        .expect("first submission");

    match service.submit(member("adh-1"), &offering_id, None, Vec::new()) {
        Err(RequestServiceError::NotEligible(EligibilityRefusal::DuplicateActiveRequest)) => {}
        other => panic!("expected duplicate refusal, got {other:?}"),
    }
}

#[test]
fn quota_refuses_the_next_member_once_full() {
    let (service, _) = build_service(vec![offering("off-1", 1)]);
    let offering_id = OfferingId("off-1".to_string());

    service
        .submit(member("adh-1"), &offering_id, None, Vec::new())
        .expect("seat taken");

    match service.submit(member("adh-2"), &offering_id, None, Vec::new()) {
        Err(RequestServiceError::NotEligible(EligibilityRefusal::QuotaReached {
            quota: 1,
            active: 1,
        })) => {}
        other => panic!("expected quota refusal, got {other:?}"),
    }
}

#[test]
fn rejected_request_frees_its_quota_seat() {
    let (service, _) = build_service(vec![offering("off-1", 1)]);
    let offering_id = OfferingId("off-1".to_string());

    let first = service
        .submit(member("adh-1"), &offering_id, None, Vec::new())
        .expect("seat taken");
    service
        .set_status(
            &first.id,
            RequestStatus::Rejected,
            Some("missing documents".to_string()),
            None,
        )
        .expect("rejection");

    service
        .submit(member("adh-2"), &offering_id, None, Vec::new())
        .expect("seat freed for the next member");
}

#[test]
fn completed_request_lets_the_member_apply_again() {
    let (service, _) = build_service(vec![offering("off-1", 0)]);
    let offering_id = OfferingId("off-1".to_string());

    let first = service
        .submit(member("adh-1"), &offering_id, None, Vec::new())
        .expect("first submission");
    service
        .set_status(&first.id, RequestStatus::Completed, None, None)
        .expect("completion");

    service
        .submit(member("adh-1"), &offering_id, None, Vec::new())
        .expect("member can reapply after completion");
}

#[test]
fn accepted_request_still_blocks_reapplication() {
    let (service, _) = build_service(vec![offering("off-1", 0)]);
    let offering_id = OfferingId("off-1".to_string());

    let first = service
        .submit(member("adh-1"), &offering_id, None, Vec::new())
        .expect("first submission");
    service
        .set_status(&first.id, RequestStatus::Accepted, None, None)
        .expect("acceptance");

    match service.submit(member("adh-1"), &offering_id, None, Vec::new()) {
        Err(RequestServiceError::NotEligible(EligibilityRefusal::DuplicateActiveRequest)) => {}
        other => panic!("expected duplicate refusal, got {other:?}"),
    }
}

#[test]
fn processing_timestamp_is_stamped_once() {
    let (service, _) = build_service(vec![offering("off-1", 0)]);
    let offering_id = OfferingId("off-1".to_string());
    let record = service
        .submit(member("adh-1"), &offering_id, None, Vec::new())
        .expect("submission");

    let first_pass = Utc::now();
    let taken = service
        .set_status_at(
            &record.id,
            RequestStatus::InProgress,
            None,
            None,
            first_pass,
        )
        .expect("first transition");
    assert_eq!(taken.processed_at, Some(first_pass));

    // A later repeat of the same transition must keep the original stamp.
    let second_pass = first_pass + Duration::seconds(90);
    let repeated = service
        .set_status_at(
            &record.id,
            RequestStatus::InProgress,
            None,
            None,
            second_pass,
        )
        .expect("repeat transition");
    assert_eq!(repeated.processed_at, Some(first_pass));
}

#[test]
fn finalization_timestamp_is_reset_on_each_terminal_transition() {
    let (service, _) = build_service(vec![offering("off-1", 0)]);
    let offering_id = OfferingId("off-1".to_string());
    let record = service
        .submit(member("adh-1"), &offering_id, None, Vec::new())
        .expect("submission");

    let first_decision = Utc::now();
    let accepted = service
        .set_status_at(
            &record.id,
            RequestStatus::Accepted,
            None,
            None,
            first_decision,
        )
        .expect("acceptance");
    assert_eq!(accepted.finalized_at, Some(first_decision));

    let corrected = first_decision + Duration::minutes(5);
    let rejected = service
        .set_status_at(
            &record.id,
            RequestStatus::Rejected,
            Some("reversed after audit".to_string()),
            None,
            corrected,
        )
        .expect("correction");
    assert_eq!(rejected.finalized_at, Some(corrected));
}

#[test]
fn transitions_always_overwrite_comment_and_processor() {
    let (service, _) = build_service(vec![offering("off-1", 0)]);
    let offering_id = OfferingId("off-1".to_string());
    let record = service
        .submit(member("adh-1"), &offering_id, None, Vec::new())
        .expect("submission");

    let updated = service
        .set_status(
            &record.id,
            RequestStatus::InProgress,
            Some("checking enrollment".to_string()),
            Some(StaffId("staff-7".to_string())),
        )
        .expect("transition");
    assert_eq!(updated.staff_comment.as_deref(), Some("checking enrollment"));

    let cleared = service
        .set_status(&record.id, RequestStatus::Accepted, None, None)
        .expect("second transition");
    assert!(cleared.staff_comment.is_none());
    assert!(cleared.processed_by.is_none());
}

#[test]
fn backward_transitions_are_not_rejected() {
    let (service, _) = build_service(vec![offering("off-1", 0)]);
    let offering_id = OfferingId("off-1".to_string());
    let record = service
        .submit(member("adh-1"), &offering_id, None, Vec::new())
        .expect("submission");

    service
        .set_status(&record.id, RequestStatus::Accepted, None, None)
        .expect("acceptance");
    let reopened = service
        .set_status(&record.id, RequestStatus::Submitted, None, None)
        .expect("staff may rewind a request");
    assert_eq!(reopened.status, RequestStatus::Submitted);
}

#[test]
fn set_status_on_unknown_request_is_not_found() {
    let (service, _) = build_service(vec![offering("off-1", 0)]);

    match service.set_status(
        &RequestId("req-missing".to_string()),
        RequestStatus::InProgress,
        None,
        None,
    ) {
        Err(RequestServiceError::Repository(RepositoryError::NotFound)) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn can_apply_reports_eligibility_without_submitting() {
    let (service, requests) = build_service(vec![offering("off-1", 1)]);
    let offering_id = OfferingId("off-1".to_string());

    assert!(service
        .can_apply(&member("adh-1"), &offering_id)
        .expect("gate runs"));

    service
        .submit(member("adh-1"), &offering_id, None, Vec::new())
        .expect("submission");

    assert!(!service
        .can_apply(&member("adh-2"), &offering_id)
        .expect("gate runs"));
    assert_eq!(requests.records.lock().expect("lock").len(), 1);
}

#[test]
fn concurrent_submissions_never_exceed_the_quota() {
    let quota = 3u32;
    let (service, requests) = build_service(vec![offering("off-1", quota)]);
    let offering_id = OfferingId("off-1".to_string());

    let outcomes: Vec<bool> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..16)
            .map(|index| {
                let service = Arc::clone(&service);
                let offering_id = offering_id.clone();
                scope.spawn(move || {
                    service
                        .submit(
                            member(&format!("adh-{index}")),
                            &offering_id,
                            None,
                            Vec::new(),
                        )
                        .is_ok()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("thread completes"))
            .collect()
    });

    let accepted = outcomes.iter().filter(|ok| **ok).count();
    assert_eq!(accepted, quota as usize);
    assert_eq!(
        requests
            .count_active_for_offering(&offering_id)
            .expect("count"),
        u64::from(quota)
    );
}
