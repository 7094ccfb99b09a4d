//! Localized flavor text selection from species records.

use serde_json::Value;

use crate::util::{clean_flavor_text, str_at};

/// Description used when neither language has a flavor text entry.
pub const NO_DESCRIPTION: &str = "No description available.";

/// What: Pick the description text with a two-tier language fallback.
///
/// Inputs:
/// - `species`: Species JSON with a `flavor_text_entries` array.
/// - `preferred`: First-choice language code (e.g. `de`).
/// - `fallback`: Second-choice language code (e.g. `en`).
///
/// Output:
/// - The first entry in `preferred`, else the first in `fallback`, cleaned to a
///   single line; [`NO_DESCRIPTION`] when neither exists or the array is absent.
#[must_use]
pub fn select_flavor_text(species: &Value, preferred: &str, fallback: &str) -> String {
    let Some(entries) = species.get("flavor_text_entries").and_then(Value::as_array) else {
        return NO_DESCRIPTION.to_string();
    };
    let first_in = |lang: &str| {
        entries.iter().find_map(|e| {
            (str_at(e, &["language", "name"]) == Some(lang))
                .then(|| str_at(e, &["flavor_text"]))
                .flatten()
        })
    };
    first_in(preferred)
        .or_else(|| first_in(fallback))
        .map_or_else(|| NO_DESCRIPTION.to_string(), clean_flavor_text)
}
