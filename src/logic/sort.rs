//! Stable ordering of resolved records.

use std::sync::Arc;

use crate::state::{DetailRecord, SortKey};

/// What: Order `records` in place by `key`.
///
/// Inputs:
/// - `records`: View to reorder.
/// - `key`: Requested ordering.
///
/// Output:
/// - Reorders `records`; `SortKey::None` leaves it untouched.
///
/// Details:
/// - Name ordering is case-sensitive byte order on the display name.
/// - The sort is stable, so equal keys keep their input order.
pub fn sort_records(records: &mut [Arc<DetailRecord>], key: SortKey) {
    match key {
        SortKey::NameAsc => records.sort_by(|a, b| a.name.cmp(&b.name)),
        SortKey::NameDesc => records.sort_by(|a, b| b.name.cmp(&a.name)),
        SortKey::IdAsc => records.sort_by_key(|r| r.id),
        SortKey::IdDesc => records.sort_by(|a, b| b.id.cmp(&a.id)),
        SortKey::None => {}
    }
}
