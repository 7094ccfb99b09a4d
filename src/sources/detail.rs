//! Detail record decoding (`GET pokemon/{name}`).
//!
//! Required fields are `id`, `name`, `height`, `weight` and a one- or
//! two-element `types` list. Sprites, abilities and the species link are
//! optional and degrade to empty values.

use serde_json::Value;

use crate::error::{CatalogError, Result};
use crate::state::DetailRecord;
use crate::util::{nested_names, str_at, u32_of};

/// What: Extract the species reference used to fetch localized text.
///
/// Inputs:
/// - `raw`: Detail JSON.
///
/// Output:
/// - `Some(url)` when `species.url` is present and non-empty.
#[must_use]
pub fn species_reference(raw: &Value) -> Option<String> {
    str_at(raw, &["species", "url"])
        .filter(|s| !s.trim().is_empty())
        .map(ToOwned::to_owned)
}

/// What: Read the type list in slot order.
///
/// Inputs:
/// - `raw`: Detail JSON with `types: [{ slot, type: { name } }]`.
///
/// Output:
/// - Type names ordered by `slot` when present, array order otherwise.
///
/// # Errors
/// - `MalformedResponse` when the list is empty or longer than two.
fn parse_types(raw: &Value) -> Result<Vec<String>> {
    let mut slotted: Vec<(u64, String)> = raw
        .get("types")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .enumerate()
                .filter_map(|(pos, t)| {
                    let name = str_at(t, &["type", "name"])?;
                    let slot = t
                        .get("slot")
                        .and_then(Value::as_u64)
                        .unwrap_or(pos as u64 + 1);
                    Some((slot, name.to_string()))
                })
                .collect()
        })
        .unwrap_or_default();
    slotted.sort_by_key(|(slot, _)| *slot);
    if slotted.is_empty() || slotted.len() > 2 {
        return Err(CatalogError::MalformedResponse(format!(
            "expected 1 or 2 types, found {}",
            slotted.len()
        )));
    }
    Ok(slotted.into_iter().map(|(_, name)| name).collect())
}

/// What: Build a [`DetailRecord`] from detail JSON and a resolved description.
///
/// Inputs:
/// - `raw`: Detail JSON.
/// - `description`: Localized description (or the sentinel).
///
/// Output:
/// - Record with the display name uppercased.
///
/// # Errors
/// - `MalformedResponse` naming the first missing required field.
pub fn parse_detail(raw: &Value, description: String) -> Result<DetailRecord> {
    let missing = |field: &str| CatalogError::MalformedResponse(format!("detail has no {field}"));
    let id = u32_of(raw, "id").ok_or_else(|| missing("id"))?;
    let name = raw
        .get("name")
        .and_then(Value::as_str)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| missing("name"))?;
    let height_decimeters = u32_of(raw, "height").ok_or_else(|| missing("height"))?;
    let weight_hectograms = u32_of(raw, "weight").ok_or_else(|| missing("weight"))?;
    let types = parse_types(raw)?;
    Ok(DetailRecord {
        id,
        name: name.to_uppercase(),
        image_url: str_at(raw, &["sprites", "front_default"])
            .unwrap_or_default()
            .to_string(),
        types,
        height_decimeters,
        weight_hectograms,
        abilities: nested_names(raw, "abilities", &["ability", "name"]),
        description,
    })
}
