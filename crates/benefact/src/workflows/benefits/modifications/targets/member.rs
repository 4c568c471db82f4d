use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DocumentSlot, KindAdapter, TargetGateway, TargetSnapshot};
use crate::workflows::benefits::modifications::domain::{TargetId, TargetKind};
use crate::workflows::benefits::modifications::engine::ModificationError;
use crate::workflows::benefits::values::{DocumentUpload, FieldValue, ValueMap};
use crate::workflows::benefits::{MemberId, RepositoryError};

/// Contact fields members may ask to change on their own record. Identity
/// fields (names, national id) are administrative and stay read-only here.
pub const MODIFIABLE_FIELDS: &[&str] = &[
    "phone",
    "email",
    "address",
    "city",
    "postal_code",
    "marital_status",
];

pub const DOCUMENT_SLOTS: &[&str] = &["portrait_photo", "id_card_image", "bank_reference"];

/// The primary member record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberRecord {
    pub id: TargetId,
    pub last_name: String,
    pub first_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub marital_status: Option<String>,
    pub portrait_photo: Option<DocumentSlot>,
    pub id_card_image: Option<DocumentSlot>,
    pub bank_reference: Option<DocumentSlot>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl MemberRecord {
    pub fn display_label(&self) -> String {
        format!("Member: {} {}", self.last_name, self.first_name)
    }

    /// Snapshot of the modifiable fields, keeping empty fields as explicit
    /// nulls so the review diff can show them being filled in.
    pub fn current_values(&self) -> ValueMap {
        let mut values = ValueMap::new();
        put(&mut values, "phone", &self.phone);
        put(&mut values, "email", &self.email);
        put(&mut values, "address", &self.address);
        put(&mut values, "city", &self.city);
        put(&mut values, "postal_code", &self.postal_code);
        put(&mut values, "marital_status", &self.marital_status);
        values
    }

    /// Overwrite whitelisted fields present in `values`; everything else,
    /// including unknown keys, is ignored.
    pub fn apply_values(&mut self, values: &ValueMap) {
        if let Some(value) = values.get("phone") {
            self.phone = value.as_text();
        }
        if let Some(value) = values.get("email") {
            self.email = value.as_text();
        }
        if let Some(value) = values.get("address") {
            self.address = value.as_text();
        }
        if let Some(value) = values.get("city") {
            self.city = value.as_text();
        }
        if let Some(value) = values.get("postal_code") {
            self.postal_code = value.as_text();
        }
        if let Some(value) = values.get("marital_status") {
            self.marital_status = value.as_text();
        }
    }

    /// Route an uploaded document to its slot; returns false when the
    /// field key matches no slot on this kind.
    pub fn attach_document(&mut self, upload: &DocumentUpload) -> bool {
        let slot = match upload.field.as_str() {
            "portrait_photo" => &mut self.portrait_photo,
            "id_card_image" => &mut self.id_card_image,
            "bank_reference" => &mut self.bank_reference,
            _ => return false,
        };
        *slot = Some(DocumentSlot::from_upload(upload));
        true
    }
}

fn put(values: &mut ValueMap, key: &str, field: &Option<String>) {
    let value = match field {
        Some(text) => FieldValue::Text(text.clone()),
        None => FieldValue::Null,
    };
    values.insert(key.to_string(), value);
}

pub(super) struct MemberAdapter;

impl KindAdapter for MemberAdapter {
    fn supports_creation(&self) -> bool {
        false
    }

    fn creation_label(&self, _values: &ValueMap) -> String {
        "New member".to_string()
    }

    fn snapshot(
        &self,
        gateway: &dyn TargetGateway,
        id: &TargetId,
    ) -> Result<Option<TargetSnapshot>, RepositoryError> {
        Ok(gateway.load_member(id)?.map(|record| TargetSnapshot {
            label: record.display_label(),
            values: record.current_values(),
        }))
    }

    fn apply(
        &self,
        gateway: &dyn TargetGateway,
        id: &TargetId,
        values: &ValueMap,
        documents: &[DocumentUpload],
        at: DateTime<Utc>,
    ) -> Result<(), ModificationError> {
        let mut record = gateway
            .load_member(id)?
            .ok_or(ModificationError::TargetNotFound)?;

        record.apply_values(values);
        for document in documents {
            record.attach_document(document);
        }
        record.updated_at = Some(at);

        gateway.save_member(record)?;
        Ok(())
    }

    fn create(
        &self,
        _gateway: &dyn TargetGateway,
        _owner: &MemberId,
        _values: &ValueMap,
        _documents: &[DocumentUpload],
        _at: DateTime<Utc>,
    ) -> Result<TargetId, ModificationError> {
        Err(ModificationError::CreationUnsupported(TargetKind::Member))
    }
}
