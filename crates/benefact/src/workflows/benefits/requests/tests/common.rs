use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, Utc};

use crate::workflows::benefits::catalog::{Offering, OfferingId, OfferingRepository};
use crate::workflows::benefits::requests::repository::{BenefitRequest, RequestRepository};
use crate::workflows::benefits::requests::service::BenefitRequestService;
use crate::workflows::benefits::requests::domain::RequestId;
use crate::workflows::benefits::{MemberId, RepositoryError};

pub(super) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub(super) fn offering(id: &str, quota: u32) -> Offering {
    Offering {
        id: OfferingId(id.to_string()),
        label: "Summer camp".to_string(),
        description: Some("Seaside stay for dependents".to_string()),
        open: true,
        window_start: None,
        window_end: None,
        quota,
    }
}

pub(super) fn member(id: &str) -> MemberId {
    MemberId(id.to_string())
}

#[derive(Default, Clone)]
pub(super) struct MemoryRequests {
    pub(super) records: Arc<Mutex<HashMap<RequestId, BenefitRequest>>>,
}

impl RequestRepository for MemoryRequests {
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
pub(super) struct MemoryOfferings {
    records: Arc<Mutex<HashMap<OfferingId, Offering>>>,
}

impl MemoryOfferings {
    pub(super) fn with(offerings: Vec<Offering>) -> Self {
        let store = Self::default();
        {
            let mut guard = store.records.lock().expect("offering mutex poisoned");
            for offering in offerings {
                guard.insert(offering.id.clone(), offering);
            }
        }
        store
    }
}

impl OfferingRepository for MemoryOfferings {
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

pub(super) fn build_service(
    offerings: Vec<Offering>,
) -> (
    Arc<BenefitRequestService<MemoryRequests, MemoryOfferings>>,
    Arc<MemoryRequests>,
) {
    let requests = Arc::new(MemoryRequests::default());
    let catalog = Arc::new(MemoryOfferings::with(offerings));
    let service = Arc::new(BenefitRequestService::new(requests.clone(), catalog));
    (service, requests)
}
