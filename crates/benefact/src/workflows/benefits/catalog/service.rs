use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::info;

use super::domain::{Offering, OfferingDraft, OfferingId};
use super::parser::{parse_catalog, CatalogImportError};
use super::repository::OfferingRepository;
use crate::workflows::benefits::RepositoryError;

static OFFERING_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_offering_id() -> OfferingId {
    let id = OFFERING_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    OfferingId(format!("off-{id:04}"))
}

/// Staff-facing catalog operations. Offerings are edited directly, without
/// the review step the member-facing workflows go through.
pub struct CatalogService<O> {
    offerings: Arc<O>,
}

impl<O> CatalogService<O>
where
    O: OfferingRepository + 'static,
{
    pub fn new(offerings: Arc<O>) -> Self {
        Self { offerings }
    }

    pub fn create(&self, draft: OfferingDraft) -> Result<Offering, RepositoryError> {
        let offering = draft.into_offering(next_offering_id());
        self.offerings.insert(offering)
    }

    pub fn update(&self, offering: Offering) -> Result<(), RepositoryError> {
        self.offerings.update(offering)
    }

    /// Open or close an offering for new submissions.
    pub fn set_open(&self, id: &OfferingId, open: bool) -> Result<Offering, RepositoryError> {
        let mut offering = self.offerings.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        offering.open = open;
        self.offerings.update(offering.clone())?;
        Ok(offering)
    }

    pub fn get(&self, id: &OfferingId) -> Result<Option<Offering>, RepositoryError> {
        self.offerings.fetch(id)
    }

    pub fn list(&self) -> Result<Vec<Offering>, RepositoryError> {
        self.offerings.list()
    }

    /// Bulk-load offerings from a CSV export, returning the stored entries.
    pub fn import<R: Read>(&self, reader: R) -> Result<Vec<Offering>, CatalogImportError> {
        let drafts = parse_catalog(reader)?;
        let mut imported = Vec::with_capacity(drafts.len());
        for draft in drafts {
            imported.push(self.create(draft)?);
        }
        info!(count = imported.len(), "imported offering catalog");
        Ok(imported)
    }

    pub fn import_path<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Offering>, CatalogImportError> {
        let file = std::fs::File::open(path)?;
        self.import(file)
    }
}
