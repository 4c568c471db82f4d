use super::domain::{Offering, OfferingId};
use crate::workflows::benefits::RepositoryError;

/// Storage abstraction for the offering catalog.
pub trait OfferingRepository: Send + Sync {
    fn insert(&self, offering: Offering) -> Result<Offering, RepositoryError>;
    fn update(&self, offering: Offering) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &OfferingId) -> Result<Option<Offering>, RepositoryError>;
    fn list(&self) -> Result<Vec<Offering>, RepositoryError>;
}
