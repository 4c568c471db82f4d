//! Field-level comparison of proposed against current record values.
//!
//! Reviewers see one labeled change per differing key. The comparison is
//! pure and deliberately lenient about its serialized inputs: a malformed
//! stored map reads as empty rather than failing the review screen. The
//! approval path re-decodes strictly before any mutation happens.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::workflows::benefits::values::{decode_values_lossy, FieldValue, ValueMap};

/// One reviewable difference between the stored and the proposed values.
/// `previous`/`proposed` stay `None` when the key is absent from that side,
/// which is distinct from a stored `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    pub field: String,
    pub label: String,
    pub previous: Option<FieldValue>,
    pub proposed: Option<FieldValue>,
    pub document: bool,
}

/// Human label for a record field key, falling back to the raw key.
pub fn field_label(key: &str) -> &str {
    match key {
        "phone" => "Phone number",
        "email" => "Email",
        "address" => "Address",
        "city" => "City",
        "postal_code" => "Postal code",
        "marital_status" => "Marital status",
        "last_name" => "Last name",
        "first_name" => "First name",
        "national_id" => "National ID",
        "birth_date" => "Birth date",
        "sex" => "Sex",
        "schooling_level" => "Schooling level",
        "portrait_photo" => "Portrait photo",
        "id_card_image" => "ID card image",
        "bank_reference" => "Bank reference",
        "marriage_certificate_photo" => "Marriage certificate",
        "school_certificate_photo" => "School enrollment certificate",
        other => other,
    }
}

/// Whether a field key carries a document payload rather than a value.
pub fn is_document_field(key: &str) -> bool {
    key.contains("photo") || key.contains("image") || key == "bank_reference"
}

/// Compare two value maps, yielding one change per key present in either
/// map whose values differ, ordered by key.
pub fn compare(previous: &ValueMap, proposed: &ValueMap) -> Vec<FieldChange> {
    let keys: BTreeSet<&String> = previous.keys().chain(proposed.keys()).collect();

    keys.into_iter()
        .filter_map(|key| {
            let before = previous.get(key);
            let after = proposed.get(key);
            if before == after {
                return None;
            }
            Some(FieldChange {
                field: key.clone(),
                label: field_label(key).to_string(),
                previous: before.cloned(),
                proposed: after.cloned(),
                document: is_document_field(key),
            })
        })
        .collect()
}

/// Compare straight from stored payloads; absent or malformed input is
/// treated as an empty map.
pub fn compare_serialized(previous: Option<&str>, proposed: Option<&str>) -> Vec<FieldChange> {
    compare(
        &decode_values_lossy(previous),
        &decode_values_lossy(proposed),
    )
}
