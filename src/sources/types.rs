//! Type vocabulary decoding (`GET type`).

use serde_json::Value;

use crate::error::{CatalogError, Result};

/// What: Decode the type listing into plain names.
///
/// Inputs:
/// - `raw`: Response body with a `results` array of `{ name, url }` objects.
///
/// Output:
/// - Type names in service order.
///
/// # Errors
/// - `MalformedResponse` when `results` is missing.
pub fn parse_type_list(raw: &Value) -> Result<Vec<String>> {
    let results = raw
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| CatalogError::MalformedResponse("type list has no results array".into()))?;
    Ok(results
        .iter()
        .filter_map(|t| t.get("name").and_then(Value::as_str).map(ToOwned::to_owned))
        .collect())
}
