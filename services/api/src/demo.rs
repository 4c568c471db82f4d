use crate::infra::{
    default_offerings, seed_households, InMemoryOfferingRepository, InMemoryProposalRepository,
    InMemoryRequestRepository, InMemoryTargetDirectory,
};
use benefact::error::AppError;
use benefact::workflows::benefits::catalog::{OfferingId, OfferingRepository};
use benefact::workflows::benefits::modifications::{ModificationEngine, TargetId, TargetKind};
use benefact::workflows::benefits::requests::{BenefitRequestService, RequestStatus};
use benefact::workflows::benefits::values::{DocumentUpload, FieldValue, ValueMap};
use benefact::workflows::benefits::{MemberId, StaffId};
use std::sync::Arc;

pub(crate) fn run_demo() -> Result<(), AppError> {
    println!("Benefits administration demo");

    let offerings = Arc::new(InMemoryOfferingRepository::default());
    for offering in default_offerings() {
        if let Err(err) = offerings.insert(offering) {
            println!("  Could not seed offerings: {err}");
            return Ok(());
        }
    }
    let targets = Arc::new(InMemoryTargetDirectory::default());
    if let Err(err) = seed_households(&targets) {
        println!("  Could not seed household records: {err}");
        return Ok(());
    }

    let requests = Arc::new(BenefitRequestService::new(
        Arc::new(InMemoryRequestRepository::default()),
        offerings.clone(),
    ));
    let modifications = Arc::new(ModificationEngine::new(
        Arc::new(InMemoryProposalRepository::default()),
        targets,
    ));

    let member = MemberId("adh-1001".to_string());
    let staff = StaffId("staff-1".to_string());
    let offering = OfferingId("off-summer-camp".to_string());

    println!("\nBenefit request intake");
    let mut answers = ValueMap::new();
    answers.insert(
        "stay_weeks".to_string(),
        FieldValue::Text("2".to_string()),
    );
    let record = match requests.submit(member.clone(), &offering, Some(answers), Vec::new()) {
        Ok(record) => record,
        Err(err) => {
            println!("  Submission refused: {err}");
            return Ok(());
        }
    };
    println!(
        "- Request {} for {} -> status {}",
        record.id.0,
        offering.0,
        record.status.label()
    );

    // A second attempt by the same member trips the duplicate rule.
    match requests.submit(member.clone(), &offering, None, Vec::new()) {
        Ok(_) => println!("  Unexpected: duplicate submission accepted"),
        Err(err) => println!("  Second submission refused as expected: {err}"),
    }

    for status in [RequestStatus::InProgress, RequestStatus::Accepted] {
        match requests.set_status(
            &record.id,
            status,
            Some("processed during demo".to_string()),
            Some(staff.clone()),
        ) {
            Ok(updated) => println!("  -> {}", updated.status.label()),
            Err(err) => {
                println!("  Transition failed: {err}");
                return Ok(());
            }
        }
    }

    println!("\nRecord modification review");
    let mut proposed = ValueMap::new();
    proposed.insert(
        "phone".to_string(),
        FieldValue::Text("0611111111".to_string()),
    );
    let documents = vec![DocumentUpload::new(
        "marriage_certificate_photo",
        "acte.pdf",
        "application/pdf",
        vec![0x25, 0x50, 0x44, 0x46],
    )];
    let proposal = match modifications.propose_modification(
        member,
        TargetKind::Spouse,
        TargetId("sp-1001".to_string()),
        proposed,
        documents,
    ) {
        Ok(proposal) => proposal,
        Err(err) => {
            println!("  Proposal refused: {err}");
            return Ok(());
        }
    };
    println!(
        "- Proposal {} targets {}",
        proposal.id.0, proposal.target_label
    );

    match modifications.compare(&proposal.id) {
        Ok(changes) => {
            println!("  Changes under review:");
            for change in changes {
                let kind = if change.document { "document" } else { "field" };
                println!(
                    "    - {} ({kind}): {:?} -> {:?}",
                    change.label, change.previous, change.proposed
                );
            }
        }
        Err(err) => println!("  Comparison unavailable: {err}"),
    }

    match modifications.approve(&proposal.id, staff, Some("documents verified".to_string())) {
        Ok(approved) => println!(
            "  Approved at {} -> status {}",
            approved
                .processed_at
                .map(|at| at.to_rfc3339())
                .unwrap_or_default(),
            approved.status.label()
        ),
        Err(err) => println!("  Approval failed: {err}"),
    }

    Ok(())
}
