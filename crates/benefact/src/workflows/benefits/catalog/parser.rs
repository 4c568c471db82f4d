//! CSV catalog import.
//!
//! Accepts the flat export format used by the back office:
//! `label,description,open,starts_on,ends_on,quota`. Dates are ISO
//! (`YYYY-MM-DD`), the open flag accepts yes/no/true/false/1/0, and an
//! empty quota means unlimited.

use std::io::Read;

use chrono::NaiveDate;
use serde::Deserialize;

use super::domain::OfferingDraft;
use crate::workflows::benefits::RepositoryError;

#[derive(Debug)]
pub enum CatalogImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidRow { line: usize, reason: String },
    Repository(RepositoryError),
}

impl std::fmt::Display for CatalogImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogImportError::Io(err) => write!(f, "failed to read catalog export: {}", err),
            CatalogImportError::Csv(err) => write!(f, "invalid catalog CSV data: {}", err),
            CatalogImportError::InvalidRow { line, reason } => {
                write!(f, "invalid catalog row at line {}: {}", line, reason)
            }
            CatalogImportError::Repository(err) => {
                write!(f, "could not store imported offering: {}", err)
            }
        }
    }
}

impl std::error::Error for CatalogImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogImportError::Io(err) => Some(err),
            CatalogImportError::Csv(err) => Some(err),
            CatalogImportError::InvalidRow { .. } => None,
            CatalogImportError::Repository(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for CatalogImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for CatalogImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<RepositoryError> for CatalogImportError {
    fn from(err: RepositoryError) -> Self {
        Self::Repository(err)
    }
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    label: String,
    #[serde(default)]
    description: Option<String>,
    open: String,
    #[serde(default)]
    starts_on: Option<String>,
    #[serde(default)]
    ends_on: Option<String>,
    #[serde(default)]
    quota: Option<String>,
}

pub fn parse_catalog<R: Read>(reader: R) -> Result<Vec<OfferingDraft>, CatalogImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut drafts = Vec::new();
    for (index, row) in csv_reader.deserialize::<CatalogRow>().enumerate() {
        // Line 1 is the header row.
        let line = index + 2;
        let row = row?;
        drafts.push(draft_from_row(row, line)?);
    }

    Ok(drafts)
}

fn draft_from_row(row: CatalogRow, line: usize) -> Result<OfferingDraft, CatalogImportError> {
    if row.label.is_empty() {
        return Err(CatalogImportError::InvalidRow {
            line,
            reason: "label must not be empty".to_string(),
        });
    }

    let open = parse_open_flag(&row.open).ok_or_else(|| CatalogImportError::InvalidRow {
        line,
        reason: format!("unrecognized open flag '{}'", row.open),
    })?;

    let window_start = parse_optional_date(row.starts_on.as_deref(), "starts_on", line)?;
    let window_end = parse_optional_date(row.ends_on.as_deref(), "ends_on", line)?;

    let quota = match row.quota.as_deref().filter(|raw| !raw.is_empty()) {
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| CatalogImportError::InvalidRow {
                line,
                reason: format!("quota '{}' is not a non-negative integer", raw),
            })?,
        None => 0,
    };

    Ok(OfferingDraft {
        label: row.label,
        description: row.description.filter(|text| !text.is_empty()),
        open,
        window_start,
        window_end,
        quota,
    })
}

fn parse_open_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "yes" | "true" | "1" | "open" => Some(true),
        "no" | "false" | "0" | "closed" => Some(false),
        _ => None,
    }
}

fn parse_optional_date(
    raw: Option<&str>,
    column: &str,
    line: usize,
) -> Result<Option<NaiveDate>, CatalogImportError> {
    match raw.filter(|value| !value.is_empty()) {
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| CatalogImportError::InvalidRow {
                line,
                reason: format!("{} '{}' is not a YYYY-MM-DD date", column, value),
            }),
        None => Ok(None),
    }
}
