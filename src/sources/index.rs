//! Index listing decoding (`GET pokemon?limit=N`).

use serde_json::Value;

use crate::error::{CatalogError, Result};
use crate::state::IndexEntry;

/// What: Decode the paginated list response into index entries.
///
/// Inputs:
/// - `raw`: Response body with a `results` array of `{ name, url }` objects.
///
/// Output:
/// - Entries in service order. Elements without a name are skipped.
///
/// # Errors
/// - `MalformedResponse` when `results` is missing or not an array.
pub fn parse_index(raw: &Value) -> Result<Vec<IndexEntry>> {
    let results = raw
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| CatalogError::MalformedResponse("index has no results array".into()))?;
    let mut entries = Vec::with_capacity(results.len());
    for item in results {
        let Some(name) = item.get("name").and_then(Value::as_str) else {
            tracing::debug!(item = %item, "skipping index item without name");
            continue;
        };
        let reference = item
            .get("url")
            .and_then(Value::as_str)
            .unwrap_or_default();
        entries.push(IndexEntry::new(name, reference));
    }
    Ok(entries)
}
