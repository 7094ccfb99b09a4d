//! Declarative filtering of a working set into a derived view.

use std::sync::Arc;

use crate::logic::sort::sort_records;
use crate::state::{DetailRecord, FilterSpec};

/// What: Check an optional inclusive range.
///
/// Details:
/// - Non-finite bounds count as unset.
fn within(value: f64, min: Option<f64>, max: Option<f64>) -> bool {
    let min = min.filter(|m| m.is_finite());
    let max = max.filter(|m| m.is_finite());
    min.is_none_or(|m| value >= m) && max.is_none_or(|m| value <= m)
}

/// What: Evaluate every predicate of `spec` against one record.
fn keep(record: &DetailRecord, spec: &FilterSpec) -> bool {
    let type_ok = spec
        .type_filter
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .is_none_or(|t| record.has_type(t));
    type_ok
        && within(record.height_meters(), spec.min_height, spec.max_height)
        && within(record.weight_kilograms(), spec.min_weight, spec.max_weight)
}

/// What: Derive a filtered, sorted view from a working set.
///
/// Inputs:
/// - `records`: Working set (a resolved page or a search result).
/// - `spec`: Filter and sort request.
///
/// Output:
/// - New vector of shared records; `records` itself is never modified.
///
/// Details:
/// - All predicates are combined with AND.
/// - Heights and weights are compared in meters/kilograms (stored tenths / 10).
/// - An empty result is a normal outcome.
#[must_use]
pub fn apply(records: &[Arc<DetailRecord>], spec: &FilterSpec) -> Vec<Arc<DetailRecord>> {
    let mut view: Vec<Arc<DetailRecord>> = records
        .iter()
        .filter(|r| keep(r, spec))
        .cloned()
        .collect();
    sort_records(&mut view, spec.sort_key);
    tracing::debug!(input = records.len(), output = view.len(), "filter applied");
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SortKey;

    fn record(
        id: u32,
        name: &str,
        types: &[&str],
        height_dm: u32,
        weight_hg: u32,
    ) -> Arc<DetailRecord> {
        Arc::new(DetailRecord {
            id,
            name: name.to_string(),
            image_url: String::new(),
            types: types.iter().map(ToString::to_string).collect(),
            height_decimeters: height_dm,
            weight_hectograms: weight_hg,
            abilities: Vec::new(),
            description: String::new(),
        })
    }

    #[test]
    /// What: Height bounds combine conjunctively
    ///
    /// - Input: Heights 5 m, 10 m, 15 m; min 8, max 12
    /// - Output: Only the 10 m record
    fn height_bounds_are_conjunctive() {
        let records = vec![
            record(1, "A", &["normal"], 50, 10),
            record(2, "B", &["normal"], 100, 10),
            record(3, "C", &["normal"], 150, 10),
        ];
        let spec = FilterSpec {
            min_height: Some(8.0),
            max_height: Some(12.0),
            ..FilterSpec::default()
        };
        let view = apply(&records, &spec);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id, 2);
        assert_eq!(records.len(), 3);
    }

    #[test]
    /// What: Type, weight and sort compose
    ///
    /// - Input: Mixed types and weights; type fire, weight <= 50 kg, id descending
    /// - Output: Fire records under the limit, highest id first
    fn type_weight_and_sort_compose() {
        let records = vec![
            record(4, "CHARMANDER", &["fire"], 6, 85),
            record(6, "CHARIZARD", &["fire", "flying"], 17, 905),
            record(37, "VULPIX", &["fire"], 6, 99),
            record(7, "SQUIRTLE", &["water"], 5, 90),
        ];
        let spec = FilterSpec {
            type_filter: Some("Fire".into()),
            max_weight: Some(50.0),
            sort_key: SortKey::IdDesc,
            ..FilterSpec::default()
        };
        let ids: Vec<u32> = apply(&records, &spec).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![37, 4]);
    }

    #[test]
    fn secondary_type_matches() {
        let records = vec![record(6, "CHARIZARD", &["fire", "flying"], 17, 905)];
        let spec = FilterSpec {
            type_filter: Some("flying".into()),
            ..FilterSpec::default()
        };
        assert_eq!(apply(&records, &spec).len(), 1);
    }

    #[test]
    /// What: Degenerate specs never fail
    ///
    /// - Input: NaN threshold, blank type, impossible range
    /// - Output: NaN and blank ignored; impossible range gives an empty view
    fn degenerate_specs_degrade_gracefully() {
        let records = vec![
            record(1, "A", &["normal"], 10, 10),
            record(2, "B", &["normal"], 20, 20),
        ];
        let ignored = FilterSpec {
            type_filter: Some("  ".into()),
            min_height: Some(f64::NAN),
            ..FilterSpec::default()
        };
        assert_eq!(apply(&records, &ignored).len(), 2);

        let impossible = FilterSpec {
            min_weight: Some(5.0),
            max_weight: Some(1.0),
            ..FilterSpec::default()
        };
        assert!(apply(&records, &impossible).is_empty());
    }

    #[test]
    fn identity_spec_preserves_order_and_sharing() {
        let records = vec![record(3, "C", &["a"], 1, 1), record(1, "A", &["a"], 1, 1)];
        let view = apply(&records, &FilterSpec::default());
        assert!(Arc::ptr_eq(&view[0], &records[0]));
        assert!(Arc::ptr_eq(&view[1], &records[1]));
    }
}
