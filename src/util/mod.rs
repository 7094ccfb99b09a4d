//! Small helpers for name canonicalization, URL encoding, JSON extraction and
//! text cleanup.
//!
//! These are kept dependency-free; they sit on the hot path of every detail
//! resolution and every suggestion lookup.

use serde_json::Value;
use std::fmt::Write;

/// What: Turn user or index input into the lowercase lookup key.
///
/// Inputs:
/// - `raw`: Name as typed by the user or as listed in the index.
///
/// Output:
/// - Trimmed, lowercased copy of `raw`.
#[must_use]
pub fn canonical_name(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// What: Percent-encode a path segment according to RFC 3986.
///
/// Inputs:
/// - `input`: String to encode.
///
/// Output:
/// - Percent-encoded string where everything outside the unreserved set is escaped.
///
/// Details:
/// - Unreserved characters (`A-Z`, `a-z`, `0-9`, `-`, `.`, `_`, `~`) are left as-is.
/// - Space is encoded as `%20` (not `+`).
/// - Non-ASCII input is escaped byte by byte.
#[must_use]
pub fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for &b in input.as_bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(b as char);
            }
            b' ' => out.push_str("%20"),
            _ => {
                out.push('%');
                let _ = write!(out, "{b:02X}");
            }
        }
    }
    out
}

/// What: Follow a path of object keys and return the string at the end.
///
/// Inputs:
/// - `v`: JSON value to walk.
/// - `path`: Keys to follow in order (e.g. `["species", "url"]`).
///
/// Output:
/// - `Some(&str)` when every key exists and the leaf is a string; `None` otherwise.
#[must_use]
pub fn str_at<'a>(v: &'a Value, path: &[&str]) -> Option<&'a str> {
    let mut cur = v;
    for key in path {
        cur = cur.get(*key)?;
    }
    cur.as_str()
}

/// What: Extract an unsigned integer by key, accepting numeric strings too.
///
/// Inputs:
/// - `v`: JSON object.
/// - `key`: Field name.
///
/// Output:
/// - `Some(u32)` when the field is a non-negative integer (or a string holding one) that fits.
#[must_use]
pub fn u32_of(v: &Value, key: &str) -> Option<u32> {
    let n = v.get(key)?;
    if let Some(u) = n.as_u64() {
        return u32::try_from(u).ok();
    }
    n.as_str().and_then(|s| s.trim().parse::<u32>().ok())
}

/// What: Collect `item[outer][inner]` strings from every element of an array field.
///
/// Inputs:
/// - `v`: JSON object holding the array.
/// - `array_key`: Name of the array field (e.g. `abilities`).
/// - `path`: Keys to follow inside each element (e.g. `["ability", "name"]`).
///
/// Output:
/// - Strings in array order; elements missing the path are skipped. A missing
///   array yields an empty vector.
#[must_use]
pub fn nested_names(v: &Value, array_key: &str, path: &[&str]) -> Vec<String> {
    v.get(array_key)
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|e| str_at(e, path).map(ToOwned::to_owned))
                .collect()
        })
        .unwrap_or_default()
}

/// What: Flatten flavor text into a single display line.
///
/// Inputs:
/// - `raw`: Text as delivered by the species endpoint.
///
/// Output:
/// - Text with form feeds, newlines and carriage returns replaced by spaces.
#[must_use]
pub fn clean_flavor_text(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            '\u{000C}' | '\n' | '\r' => ' ',
            other => other,
        })
        .collect()
}

/// What: Parse a user-entered numeric threshold.
///
/// Inputs:
/// - `raw`: Text from a form field.
///
/// Output:
/// - `Some(value)` for a finite decimal number; `None` for blank, malformed or
///   non-finite input. A `,` decimal separator is accepted.
#[must_use]
pub fn parse_threshold(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}
