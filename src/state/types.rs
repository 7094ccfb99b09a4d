//! Core value types shared by the engine and its callers.

use std::ops::Range;

use crate::error::{CatalogError, Result};
use crate::util::{canonical_name, parse_threshold};

/// Lightweight catalog entry as listed by the index endpoint.
///
/// Only the name and the detail reference are known until the entry is
/// resolved through the detail cache.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct IndexEntry {
    /// Name as listed by the remote index (already lowercase for PokeAPI).
    pub name: String,
    /// URL of the detail record.
    #[serde(rename = "url")]
    pub reference: String,
}

impl IndexEntry {
    /// Build an entry from a name and a detail reference.
    #[must_use]
    pub fn new(name: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reference: reference.into(),
        }
    }

    /// Lookup key used by the detail cache.
    #[must_use]
    pub fn canonical_name(&self) -> String {
        canonical_name(&self.name)
    }

    /// Catalog number taken from the last path segment of the reference.
    #[must_use]
    pub fn catalog_id(&self) -> Option<u32> {
        self.reference
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .and_then(|segment| segment.parse().ok())
    }
}

/// Fully resolved creature record.
///
/// Immutable once built. The detail cache owns the canonical instance and
/// hands out `Arc<DetailRecord>`; views never hold diverging copies.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct DetailRecord {
    /// National catalog number.
    pub id: u32,
    /// Display name, uppercased.
    pub name: String,
    /// Front sprite URL; empty when the service has none.
    pub image_url: String,
    /// One or two type names in slot order.
    pub types: Vec<String>,
    /// Height in tenths of a meter.
    pub height_decimeters: u32,
    /// Weight in tenths of a kilogram.
    pub weight_hectograms: u32,
    /// Ability names in listing order.
    pub abilities: Vec<String>,
    /// Localized description or the "no description" sentinel.
    pub description: String,
}

impl DetailRecord {
    /// Height converted to meters.
    #[must_use]
    pub fn height_meters(&self) -> f64 {
        f64::from(self.height_decimeters) / 10.0
    }

    /// Weight converted to kilograms.
    #[must_use]
    pub fn weight_kilograms(&self) -> f64 {
        f64::from(self.weight_hectograms) / 10.0
    }

    /// Lowercase key this record is cached under.
    #[must_use]
    pub fn canonical_name(&self) -> String {
        canonical_name(&self.name)
    }

    /// Whether the record carries a secondary type.
    #[must_use]
    pub fn is_dual_type(&self) -> bool {
        self.types.len() == 2
    }

    /// ASCII-case-insensitive membership test on the type list.
    #[must_use]
    pub fn has_type(&self, type_name: &str) -> bool {
        self.types.iter().any(|t| t.eq_ignore_ascii_case(type_name))
    }
}

/// Ordering applied after filtering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum SortKey {
    /// Display name, ascending.
    NameAsc,
    /// Display name, descending.
    NameDesc,
    /// Catalog number, ascending.
    IdAsc,
    /// Catalog number, descending.
    IdDesc,
    /// Keep the input order.
    #[default]
    None,
}

/// Declarative filter and sort request.
///
/// All bounds are optional and combined with AND. Height bounds are in
/// meters and weight bounds in kilograms.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterSpec {
    /// Keep only records carrying this type.
    pub type_filter: Option<String>,
    /// Inclusive lower height bound in meters.
    pub min_height: Option<f64>,
    /// Inclusive upper height bound in meters.
    pub max_height: Option<f64>,
    /// Inclusive lower weight bound in kilograms.
    pub min_weight: Option<f64>,
    /// Inclusive upper weight bound in kilograms.
    pub max_weight: Option<f64>,
    /// Order of the derived view.
    pub sort_key: SortKey,
}

impl FilterSpec {
    /// Whether the spec leaves its input untouched.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }
}

/// Raw filter form values as a presentation layer collects them.
///
/// Converting to a [`FilterSpec`] drops blank and malformed thresholds
/// instead of failing.
#[derive(Clone, Debug, Default)]
pub struct FilterInput {
    /// Selected type; blank means "all types".
    pub type_name: String,
    /// Minimum height text in meters.
    pub min_height: String,
    /// Maximum height text in meters.
    pub max_height: String,
    /// Minimum weight text in kilograms.
    pub min_weight: String,
    /// Maximum weight text in kilograms.
    pub max_weight: String,
    /// Requested ordering.
    pub sort_key: SortKey,
}

impl FilterInput {
    /// What: Convert form text into a filter specification.
    ///
    /// Output:
    /// - `FilterSpec` where every unparsable threshold is `None`.
    #[must_use]
    pub fn to_spec(&self) -> FilterSpec {
        let type_name = self.type_name.trim();
        FilterSpec {
            type_filter: (!type_name.is_empty()).then(|| type_name.to_lowercase()),
            min_height: parse_threshold(&self.min_height),
            max_height: parse_threshold(&self.max_height),
            min_weight: parse_threshold(&self.min_weight),
            max_weight: parse_threshold(&self.max_weight),
            sort_key: self.sort_key,
        }
    }
}

/// A 1-based page number plus a page size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PageWindow {
    /// 1-based page number.
    page_number: usize,
    /// Entries per page.
    page_size: usize,
}

impl PageWindow {
    /// What: Build a page window.
    ///
    /// Inputs:
    /// - `page_number`: 1-based page number.
    /// - `page_size`: Entries per page.
    ///
    /// Output:
    /// - `Ok(PageWindow)`; `Err(CatalogError::InvalidPage)` when either value is zero.
    ///
    /// # Errors
    /// - Returns `InvalidPage` for page 0 or page size 0.
    pub fn new(page_number: usize, page_size: usize) -> Result<Self> {
        if page_number == 0 {
            return Err(CatalogError::InvalidPage("page numbers start at 1".into()));
        }
        if page_size == 0 {
            return Err(CatalogError::InvalidPage("page size must be positive".into()));
        }
        Ok(Self {
            page_number,
            page_size,
        })
    }

    /// 1-based page number.
    #[must_use]
    pub const fn page_number(&self) -> usize {
        self.page_number
    }

    /// Entries per page.
    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Index offset of the first entry on this page; saturates at `usize::MAX`.
    #[must_use]
    pub const fn offset(&self) -> usize {
        (self.page_number - 1).saturating_mul(self.page_size)
    }

    /// Number of pages needed for `total_entries`; 0 for an empty index.
    #[must_use]
    pub const fn total_pages(page_size: usize, total_entries: usize) -> usize {
        if page_size == 0 {
            return 0;
        }
        total_entries.div_ceil(page_size)
    }

    /// What: Resolve the index range covered by this window.
    ///
    /// Inputs:
    /// - `total_entries`: Size of the loaded index.
    ///
    /// Output:
    /// - Half-open range of index positions; `PageOutOfRange` when the page
    ///   lies past the last page (always the case for an empty index).
    ///
    /// # Errors
    /// - Returns `PageOutOfRange` for pages above `total_pages`.
    pub fn range(&self, total_entries: usize) -> Result<Range<usize>> {
        let total_pages = Self::total_pages(self.page_size, total_entries);
        if self.page_number > total_pages {
            return Err(CatalogError::PageOutOfRange {
                page: self.page_number,
                total_pages,
            });
        }
        let start = self.offset();
        let end = start.saturating_add(self.page_size).min(total_entries);
        Ok(start..end)
    }

    /// What: Describe this window for labels and navigation controls.
    ///
    /// Inputs:
    /// - `total_entries`: Size of the loaded index.
    ///
    /// Output:
    /// - `PageInfo`; first/last entry numbers are 1-based and 0 for an empty index.
    #[must_use]
    pub fn info(&self, total_entries: usize) -> PageInfo {
        let total_pages = Self::total_pages(self.page_size, total_entries);
        let (first_entry, last_entry) = if total_entries == 0 {
            (0, 0)
        } else {
            (
                self.offset().saturating_add(1).min(total_entries),
                self.page_number.saturating_mul(self.page_size).min(total_entries),
            )
        };
        PageInfo {
            page_number: self.page_number,
            page_size: self.page_size,
            total_pages,
            total_entries,
            first_entry,
            last_entry,
            has_previous: self.page_number > 1 && total_pages > 0,
            has_next: self.page_number < total_pages,
        }
    }
}

/// Navigation facts about a page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageInfo {
    /// 1-based page number.
    pub page_number: usize,
    /// Entries per page.
    pub page_size: usize,
    /// Pages available in the index.
    pub total_pages: usize,
    /// Entries in the index.
    pub total_entries: usize,
    /// 1-based number of the first entry on the page.
    pub first_entry: usize,
    /// 1-based number of the last entry on the page.
    pub last_entry: usize,
    /// Whether a previous page exists.
    pub has_previous: bool,
    /// Whether a next page exists.
    pub has_next: bool,
}

/// Completion counter emitted while a page resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadProgress {
    /// Resolutions finished so far, successful or not.
    pub completed: usize,
    /// Resolutions in the page.
    pub total: usize,
}

impl LoadProgress {
    /// Completed share in `0.0..=1.0`; an empty page counts as done.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    /// Whether every resolution has finished.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.completed >= self.total
    }
}
