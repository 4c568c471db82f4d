use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for catalog offerings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OfferingId(pub String);

/// A benefit catalog entry.
///
/// `quota` bounds the number of *active* requests the offering accepts at
/// once; zero means unlimited. The optional date window further restricts
/// when submissions are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offering {
    pub id: OfferingId,
    pub label: String,
    pub description: Option<String>,
    pub open: bool,
    pub window_start: Option<NaiveDate>,
    pub window_end: Option<NaiveDate>,
    pub quota: u32,
}

impl Offering {
    pub fn unlimited(&self) -> bool {
        self.quota == 0
    }
}

/// Staff-supplied fields for a new offering, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferingDraft {
    pub label: String,
    pub description: Option<String>,
    pub open: bool,
    pub window_start: Option<NaiveDate>,
    pub window_end: Option<NaiveDate>,
    pub quota: u32,
}

impl OfferingDraft {
    pub fn into_offering(self, id: OfferingId) -> Offering {
        Offering {
            id,
            label: self.label,
            description: self.description,
            open: self.open,
            window_start: self.window_start,
            window_end: self.window_end,
            quota: self.quota,
        }
    }
}
