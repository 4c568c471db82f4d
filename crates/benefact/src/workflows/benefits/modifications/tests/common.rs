use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::workflows::benefits::modifications::domain::{
    ModificationProposal, ProposalId, TargetId, TargetKind,
};
use crate::workflows::benefits::modifications::engine::ModificationEngine;
use crate::workflows::benefits::modifications::repository::ProposalRepository;
use crate::workflows::benefits::modifications::targets::{
    DependentRecord, MemberRecord, SpouseRecord, TargetGateway,
};
use crate::workflows::benefits::values::{FieldValue, ValueMap};
use crate::workflows::benefits::{MemberId, RepositoryError, StaffId};

pub(super) fn member(id: &str) -> MemberId {
    MemberId(id.to_string())
}

pub(super) fn staff(id: &str) -> StaffId {
    StaffId(id.to_string())
}

pub(super) fn text(value: &str) -> FieldValue {
    FieldValue::Text(value.to_string())
}

pub(super) fn values(entries: &[(&str, FieldValue)]) -> ValueMap {
    entries
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}

pub(super) fn member_record(id: &str) -> MemberRecord {
    MemberRecord {
        id: TargetId(id.to_string()),
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
    }
}

pub(super) fn spouse_record(id: &str, owner: &str) -> SpouseRecord {
    SpouseRecord {
        id: Some(TargetId(id.to_string())),
        owner: member(owner),
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
    }
}

pub(super) fn dependent_record(id: &str, owner: &str) -> DependentRecord {
    DependentRecord {
        id: Some(TargetId(id.to_string())),
        owner: member(owner),
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
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryProposals {
    pub(super) records: Arc<Mutex<HashMap<ProposalId, ModificationProposal>>>,
}

impl ProposalRepository for MemoryProposals {
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
pub(super) struct MemoryTargets {
    pub(super) members: Mutex<HashMap<TargetId, MemberRecord>>,
    pub(super) spouses: Mutex<HashMap<TargetId, SpouseRecord>>,
    pub(super) dependents: Mutex<HashMap<TargetId, DependentRecord>>,
    sequence: AtomicU64,
}

impl MemoryTargets {
    pub(super) fn with_member(record: MemberRecord) -> Self {
        let store = Self::default();
        store
            .members
            .lock()
            .expect("member mutex poisoned")
            .insert(record.id.clone(), record);
        store
    }

    pub(super) fn with_spouse(record: SpouseRecord) -> Self {
        let store = Self::default();
        let id = record.id.clone().expect("seeded spouse has an id");
        store
            .spouses
            .lock()
            .expect("spouse mutex poisoned")
            .insert(id, record);
        store
    }

    pub(super) fn with_dependent(record: DependentRecord) -> Self {
        let store = Self::default();
        let id = record.id.clone().expect("seeded dependent has an id");
        store
            .dependents
            .lock()
            .expect("dependent mutex poisoned")
            .insert(id, record);
        store
    }

    fn next_id(&self, prefix: &str) -> TargetId {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        TargetId(format!("{prefix}-{id:04}"))
    }
}

impl TargetGateway for MemoryTargets {
    fn load_member(&self, id: &TargetId) -> Result<Option<MemberRecord>, RepositoryError> {
        let guard = self.members.lock().expect("member mutex poisoned");
        Ok(guard.get(id).cloned())
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
        let guard = self.spouses.lock().expect("spouse mutex poisoned");
        Ok(guard.get(id).cloned())
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
        let guard = self.dependents.lock().expect("dependent mutex poisoned");
        Ok(guard.get(id).cloned())
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

pub(super) fn build_engine(
    targets: MemoryTargets,
) -> (
    Arc<ModificationEngine<MemoryProposals, MemoryTargets>>,
    Arc<MemoryProposals>,
    Arc<MemoryTargets>,
) {
    let proposals = Arc::new(MemoryProposals::default());
    let targets = Arc::new(targets);
    let engine = Arc::new(ModificationEngine::new(proposals.clone(), targets.clone()));
    (engine, proposals, targets)
}
