use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{label_part, DocumentSlot, KindAdapter, TargetGateway, TargetSnapshot};
use crate::workflows::benefits::modifications::domain::TargetId;
use crate::workflows::benefits::modifications::engine::ModificationError;
use crate::workflows::benefits::values::{DocumentUpload, FieldValue, ValueMap};
use crate::workflows::benefits::{MemberId, RepositoryError};

/// Fields a modification proposal may change on an existing spouse record.
/// The birth date is captured at creation and not editable afterwards.
pub const MODIFIABLE_FIELDS: &[&str] = &[
    "last_name",
    "first_name",
    "national_id",
    "sex",
    "phone",
    "email",
    "city",
];

pub const DOCUMENT_SLOTS: &[&str] = &[
    "portrait_photo",
    "id_card_image",
    "marriage_certificate_photo",
];

/// A spouse record attached to a member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpouseRecord {
    pub id: Option<TargetId>,
    pub owner: MemberId,
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub national_id: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub sex: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub city: Option<String>,
    pub portrait_photo: Option<DocumentSlot>,
    pub id_card_image: Option<DocumentSlot>,
    pub marriage_certificate_photo: Option<DocumentSlot>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl SpouseRecord {
    pub fn display_label(&self) -> String {
        format!(
            "Spouse: {} {}",
            self.last_name.as_deref().unwrap_or_default(),
            self.first_name.as_deref().unwrap_or_default()
        )
    }

    pub fn current_values(&self) -> ValueMap {
        let mut values = ValueMap::new();
        put(&mut values, "last_name", &self.last_name);
        put(&mut values, "first_name", &self.first_name);
        put(&mut values, "national_id", &self.national_id);
        values.insert(
            "birth_date".to_string(),
            match self.birth_date {
                Some(date) => FieldValue::Text(date.format("%Y-%m-%d").to_string()),
                None => FieldValue::Null,
            },
        );
        put(&mut values, "sex", &self.sex);
        put(&mut values, "phone", &self.phone);
        put(&mut values, "email", &self.email);
        put(&mut values, "city", &self.city);
        values
    }

    pub fn apply_values(&mut self, values: &ValueMap) {
        if let Some(value) = values.get("last_name") {
            self.last_name = value.as_text();
        }
        if let Some(value) = values.get("first_name") {
            self.first_name = value.as_text();
        }
        if let Some(value) = values.get("national_id") {
            self.national_id = value.as_text();
        }
        if let Some(value) = values.get("sex") {
            self.sex = value.as_text();
        }
        if let Some(value) = values.get("phone") {
            self.phone = value.as_text();
        }
        if let Some(value) = values.get("email") {
            self.email = value.as_text();
        }
        if let Some(value) = values.get("city") {
            self.city = value.as_text();
        }
    }

    pub fn attach_document(&mut self, upload: &DocumentUpload) -> bool {
        let slot = match upload.field.as_str() {
            "portrait_photo" => &mut self.portrait_photo,
            "id_card_image" => &mut self.id_card_image,
            "marriage_certificate_photo" => &mut self.marriage_certificate_photo,
            _ => return false,
        };
        *slot = Some(DocumentSlot::from_upload(upload));
        true
    }

    /// Build a new spouse for `owner` from proposed values. An unparseable
    /// birth date is dropped rather than failing the whole creation.
    pub fn from_values(owner: MemberId, values: &ValueMap) -> Self {
        let mut record = Self {
            id: None,
            owner,
            last_name: None,
            first_name: None,
            national_id: None,
            birth_date: parse_birth_date(values),
            sex: None,
            phone: None,
            email: None,
            city: None,
            portrait_photo: None,
            id_card_image: None,
            marriage_certificate_photo: None,
            updated_at: None,
        };
        record.apply_values(values);
        record
    }
}

fn put(values: &mut ValueMap, key: &str, field: &Option<String>) {
    let value = match field {
        Some(text) => FieldValue::Text(text.clone()),
        None => FieldValue::Null,
    };
    values.insert(key.to_string(), value);
}

fn parse_birth_date(values: &ValueMap) -> Option<NaiveDate> {
    values
        .get("birth_date")
        .and_then(|value| value.as_text())
        .and_then(|raw| NaiveDate::parse_from_str(&raw, "%Y-%m-%d").ok())
}

pub(super) struct SpouseAdapter;

impl KindAdapter for SpouseAdapter {
    fn supports_creation(&self) -> bool {
        true
    }

    fn creation_label(&self, values: &ValueMap) -> String {
        format!(
            "New spouse: {} {}",
            label_part(values, "last_name"),
            label_part(values, "first_name")
        )
    }

    fn snapshot(
        &self,
        gateway: &dyn TargetGateway,
        id: &TargetId,
    ) -> Result<Option<TargetSnapshot>, RepositoryError> {
        Ok(gateway.load_spouse(id)?.map(|record| TargetSnapshot {
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
            .load_spouse(id)?
            .ok_or(ModificationError::TargetNotFound)?;

        record.apply_values(values);
        for document in documents {
            record.attach_document(document);
        }
        record.updated_at = Some(at);

        gateway.save_spouse(record)?;
        Ok(())
    }

    fn create(
        &self,
        gateway: &dyn TargetGateway,
        owner: &MemberId,
        values: &ValueMap,
        documents: &[DocumentUpload],
        at: DateTime<Utc>,
    ) -> Result<TargetId, ModificationError> {
        let mut record = SpouseRecord::from_values(owner.clone(), values);
        for document in documents {
            record.attach_document(document);
        }
        record.updated_at = Some(at);

        Ok(gateway.save_spouse(record)?)
    }
}
