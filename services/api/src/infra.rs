use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use benefact::workflows::benefits::catalog::{Offering, OfferingId, OfferingRepository};
use benefact::workflows::benefits::modifications::{
    DependentRecord, MemberRecord, ModificationProposal, ProposalId, ProposalRepository,
    SpouseRecord, TargetGateway, TargetId, TargetKind,
};
use benefact::workflows::benefits::requests::{BenefitRequest, RequestId, RequestRepository};
use benefact::workflows::benefits::{MemberId, RepositoryError};
use chrono::{Duration, Utc};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryOfferingRepository {
    records: Arc<Mutex<HashMap<OfferingId, Offering>>>,
}

impl OfferingRepository for InMemoryOfferingRepository {
    fn insert(&self, offering: Offering) -> Result<Offering, RepositoryError> {
        let mut guard = self.records.lock().expect("offering mutex poisoned");
        if guard.contains_key(&offering.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(offering.id.clone(), offering.clone());
        Ok(offering)
    }

    fn update(&self, offering: Offering) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("offering mutex poisoned");
        if guard.contains_key(&offering.id) {
            guard.insert(offering.id.clone(), offering);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &OfferingId) -> Result<Option<Offering>, RepositoryError> {
        let guard = self.records.lock().expect("offering mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Offering>, RepositoryError> {
        let guard = self.records.lock().expect("offering mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryRequestRepository {
    records: Arc<Mutex<HashMap<RequestId, BenefitRequest>>>,
}

impl RequestRepository for InMemoryRequestRepository {
    fn insert(&self, record: BenefitRequest) -> Result<BenefitRequest, RepositoryError> {
        let mut guard = self.records.lock().expect("request mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: BenefitRequest) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("request mutex poisoned");
        if guard.contains_key(&record.id) {
            guard.insert(record.id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &RequestId) -> Result<Option<BenefitRequest>, RepositoryError> {
        let guard = self.records.lock().expect("request mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn pending(&self, limit: usize) -> Result<Vec<BenefitRequest>, RepositoryError> {
        let guard = self.records.lock().expect("request mutex poisoned");
        let mut pending: Vec<BenefitRequest> = guard
            .values()
            .filter(|record| !record.status.is_terminal())
            .cloned()
            .collect();
        pending.sort_by_key(|record| record.submitted_at);
        pending.truncate(limit);
        Ok(pending)
    }

    fn count_active_for_offering(&self, offering: &OfferingId) -> Result<u64, RepositoryError> {
        let guard = self.records.lock().expect("request mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| &record.offering == offering && record.status.is_active())
            .count() as u64)
    }

    fn count_active_for_member(
        &self,
        member: &MemberId,
        offering: &OfferingId,
    ) -> Result<u64, RepositoryError> {
        let guard = self.records.lock().expect("request mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| {
                &record.member == member
                    && &record.offering == offering
                    && record.status.is_active()
            })
            .count() as u64)
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryProposalRepository {
    records: Arc<Mutex<HashMap<ProposalId, ModificationProposal>>>,
}

impl ProposalRepository for InMemoryProposalRepository {
    fn insert(
        &self,
        proposal: ModificationProposal,
    ) -> Result<ModificationProposal, RepositoryError> {
        let mut guard = self.records.lock().expect("proposal mutex poisoned");
        if guard.contains_key(&proposal.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(proposal.id.clone(), proposal.clone());
        Ok(proposal)
    }

    fn update(&self, proposal: ModificationProposal) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("proposal mutex poisoned");
        if guard.contains_key(&proposal.id) {
            guard.insert(proposal.id.clone(), proposal);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &ProposalId) -> Result<Option<ModificationProposal>, RepositoryError> {
        let guard = self.records.lock().expect("proposal mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn pending(&self, limit: usize) -> Result<Vec<ModificationProposal>, RepositoryError> {
        let guard = self.records.lock().expect("proposal mutex poisoned");
        let mut pending: Vec<ModificationProposal> = guard
            .values()
            .filter(|proposal| proposal.is_pending())
            .cloned()
            .collect();
        pending.sort_by_key(|proposal| proposal.created_at);
        pending.truncate(limit);
        Ok(pending)
    }

    fn has_pending_for(
        &self,
        requester: &MemberId,
        kind: TargetKind,
        target: &TargetId,
    ) -> Result<bool, RepositoryError> {
        let guard = self.records.lock().expect("proposal mutex poisoned");
        Ok(guard.values().any(|proposal| {
            proposal.is_pending()
                && &proposal.requester == requester
                && proposal.target_kind == kind
                && proposal.target_id.as_ref() == Some(target)
        }))
    }
}

#[derive(Default)]
pub(crate) struct InMemoryTargetDirectory {
    members: Mutex<HashMap<TargetId, MemberRecord>>,
    spouses: Mutex<HashMap<TargetId, SpouseRecord>>,
    dependents: Mutex<HashMap<TargetId, DependentRecord>>,
    sequence: AtomicU64,
}

impl InMemoryTargetDirectory {
    fn next_id(&self, prefix: &str) -> TargetId {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        TargetId(format!("{prefix}-{id:04}"))
    }
}

impl TargetGateway for InMemoryTargetDirectory {
    fn load_member(&self, id: &TargetId) -> Result<Option<MemberRecord>, RepositoryError> {
        Ok(self
            .members
            .lock()
            .expect("member mutex poisoned")
            .get(id)
            .cloned())
    }

    fn save_member(&self, record: MemberRecord) -> Result<TargetId, RepositoryError> {
        let id = record.id.clone();
        self.members
            .lock()
            .expect("member mutex poisoned")
            .insert(id.clone(), record);
        Ok(id)
    }

    fn load_spouse(&self, id: &TargetId) -> Result<Option<SpouseRecord>, RepositoryError> {
        Ok(self
            .spouses
            .lock()
            .expect("spouse mutex poisoned")
            .get(id)
            .cloned())
    }

    fn save_spouse(&self, mut record: SpouseRecord) -> Result<TargetId, RepositoryError> {
        let id = match &record.id {
            Some(id) => id.clone(),
            None => {
                let id = self.next_id("sp");
                record.id = Some(id.clone());
                id
            }
        };
        self.spouses
            .lock()
            .expect("spouse mutex poisoned")
            .insert(id.clone(), record);
        Ok(id)
    }

    fn load_dependent(&self, id: &TargetId) -> Result<Option<DependentRecord>, RepositoryError> {
        Ok(self
            .dependents
            .lock()
            .expect("dependent mutex poisoned")
            .get(id)
            .cloned())
    }

    fn save_dependent(&self, mut record: DependentRecord) -> Result<TargetId, RepositoryError> {
        let id = match &record.id {
            Some(id) => id.clone(),
            None => {
                let id = self.next_id("dep");
                record.id = Some(id.clone());
                id
            }
        };
        self.dependents
            .lock()
            .expect("dependent mutex poisoned")
            .insert(id.clone(), record);
        Ok(id)
    }
}

/// Seed a small member household so the modification endpoints have
/// records to work against out of the box.
pub(crate) fn seed_households(
    targets: &InMemoryTargetDirectory,
) -> Result<(), RepositoryError> {
    let member_id = TargetId("adh-1001".to_string());
    targets.save_member(MemberRecord {
        id: member_id.clone(),
        last_name: "Kaloui".to_string(),
        first_name: "Ahmed".to_string(),
        phone: Some("0600000000".to_string()),
        email: Some("ahmed@example.net".to_string()),
        address: Some("12 rue des Orangers".to_string()),
        city: Some("Rabat".to_string()),
        postal_code: Some("10000".to_string()),
        marital_status: Some("married".to_string()),
        portrait_photo: None,
        id_card_image: None,
        bank_reference: None,
        updated_at: None,
    })?;

    targets.save_spouse(SpouseRecord {
        id: Some(TargetId("sp-1001".to_string())),
        owner: MemberId(member_id.0.clone()),
        last_name: Some("Kaloui".to_string()),
        first_name: Some("Fatima".to_string()),
        national_id: Some("AB123456".to_string()),
        birth_date: None,
        sex: Some("F".to_string()),
        phone: Some("0600000000".to_string()),
        email: Some("fatima@example.net".to_string()),
        city: Some("Rabat".to_string()),
        portrait_photo: None,
        id_card_image: None,
        marriage_certificate_photo: None,
        updated_at: None,
    })?;

    targets.save_dependent(DependentRecord {
        id: Some(TargetId("dep-1001".to_string())),
        owner: MemberId(member_id.0),
        last_name: Some("Kaloui".to_string()),
        first_name: Some("Yassine".to_string()),
        birth_date: None,
        sex: Some("M".to_string()),
        national_id: None,
        phone: None,
        email: None,
        schooling_level: Some("primary".to_string()),
        portrait_photo: None,
        id_card_image: None,
        school_certificate_photo: None,
        created_at: None,
        updated_at: None,
    })?;

    Ok(())
}

/// Fallback offerings when no catalog file is configured.
pub(crate) fn default_offerings() -> Vec<Offering> {
    let today = Utc::now().date_naive();
    vec![
        Offering {
            id: OfferingId("off-summer-camp".to_string()),
            label: "Summer camp".to_string(),
            description: Some("Seaside stay for dependents".to_string()),
            open: true,
            window_start: Some(today - Duration::days(7)),
            window_end: Some(today + Duration::days(60)),
            quota: 40,
        },
        Offering {
            id: OfferingId("off-eye-care".to_string()),
            label: "Eye care allowance".to_string(),
            description: None,
            open: true,
            window_start: None,
            window_end: None,
            quota: 0,
        },
    ]
}
