//! Opaque field-value maps and document payloads shared by the intake and
//! modification workflows.
//!
//! Submitted form answers and proposed record changes travel as ordered
//! string-keyed maps over a small closed value union. The union is
//! serialized untagged so stored payloads read as plain JSON, and a `null`
//! entry stays distinguishable from an absent key after a round trip.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Closed value union for submitted field values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Flag(bool),
    Number(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl FieldValue {
    /// Textual rendering used when a value lands in a string-typed record
    /// field. `Null` clears the field; byte payloads never coerce.
    pub fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::Null => None,
            FieldValue::Flag(value) => Some(value.to_string()),
            FieldValue::Number(value) => {
                if value.fract() == 0.0 && value.abs() < 1e15 {
                    Some(format!("{}", *value as i64))
                } else {
                    Some(value.to_string())
                }
            }
            FieldValue::Text(value) => Some(value.clone()),
            FieldValue::Bytes(_) => None,
        }
    }
}

/// Ordered field-key to value mapping.
pub type ValueMap = BTreeMap<String, FieldValue>;

/// One uploaded document: an opaque (field key, filename, content type,
/// bytes) tuple. Size and content validation belong to the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentUpload {
    pub field: String,
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl DocumentUpload {
    pub fn new(
        field: impl Into<String>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            field: field.into(),
            filename: filename.into(),
            content_type: content_type.into(),
            data,
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    fn parsed_type(&self) -> Option<mime::Mime> {
        self.content_type.parse().ok()
    }

    pub fn is_image(&self) -> bool {
        self.parsed_type()
            .map(|media| media.type_() == mime::IMAGE)
            .unwrap_or(false)
    }

    pub fn is_pdf(&self) -> bool {
        self.parsed_type()
            .map(|media| media == mime::APPLICATION_PDF)
            .unwrap_or(false)
    }
}

pub fn encode_values(map: &ValueMap) -> Result<String, serde_json::Error> {
    serde_json::to_string(map)
}

pub fn decode_values(raw: &str) -> Result<ValueMap, serde_json::Error> {
    serde_json::from_str(raw)
}

/// Best-effort decode used on the review path: absent or malformed input
/// reads as an empty map instead of failing the comparison.
pub fn decode_values_lossy(raw: Option<&str>) -> ValueMap {
    raw.and_then(|payload| serde_json::from_str(payload).ok())
        .unwrap_or_default()
}

pub fn encode_documents(documents: &[DocumentUpload]) -> Result<String, serde_json::Error> {
    serde_json::to_string(documents)
}

pub fn decode_documents(raw: Option<&str>) -> Result<Vec<DocumentUpload>, serde_json::Error> {
    match raw {
        Some(payload) => serde_json::from_str(payload),
        None => Ok(Vec::new()),
    }
}
