//! Record validation: raw JSON document in, typed launch out.
//!
//! A failure here condemns one record, never the page it came on.

use serde::Deserialize;
use serde_json::Value;

use crate::model::LaunchRecord;

/// Placeholder used when a rejected document carries no usable `id`.
const UNKNOWN_ID: &str = "N/A";

/// A single document that could not become a [`LaunchRecord`].
#[derive(Debug, thiserror::Error)]
#[error("launch {id} failed validation: {reason}")]
pub struct ValidationError {
    /// The document's `id`, or `N/A` when absent.
    pub id: String,

    /// Which field was missing or had the wrong shape.
    pub reason: String,
}

/// Validate one raw document.
///
/// Missing required fields, wrong types, a malformed `links` block and an
/// unparseable `date_utc` all fail. Optional fields fall back to their defaults.
pub fn validate(document: &Value) -> Result<LaunchRecord, ValidationError> {
    LaunchRecord::deserialize(document).map_err(|e| ValidationError {
        id: document_id(document),
        reason: e.to_string(),
    })
}

fn document_id(document: &Value) -> String {
    match document.get("id") {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Null) | None => UNKNOWN_ID.to_string(),
        Some(other) => other.to_string(),
    }
}
