//! Staff-managed offering catalog.
//!
//! Offerings are the benefit entries members apply against. Staff create
//! and edit them directly (no review step), toggle them open or closed, and
//! can bulk-load a catalog from a CSV export.

pub mod domain;
pub mod parser;
pub mod repository;
pub mod service;

pub use domain::{Offering, OfferingDraft, OfferingId};
pub use parser::CatalogImportError;
pub use repository::OfferingRepository;
pub use service::CatalogService;
