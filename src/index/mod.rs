//! Catalog index: the ordered list of lightweight entries.
//!
//! Loaded once per session and read-only afterwards. It is the source of
//! truth for the entry count, pagination math and search suggestions.

use std::collections::HashMap;
use std::ops::Range;

use tokio::sync::OnceCell;

use crate::error::{CatalogError, Result};
use crate::sources::CatalogClient;
use crate::state::{IndexEntry, PageInfo, PageWindow};
use crate::util::canonical_name;

/// Loaded index plus a lookup table by canonical name.
#[derive(Debug, Default)]
struct LoadedIndex {
    /// Entries in service order.
    entries: Vec<IndexEntry>,
    /// Canonical name to position in `entries`.
    name_to_idx: HashMap<String, usize>,
    /// Catalog number to position in `entries`.
    id_to_idx: HashMap<u32, usize>,
}

impl LoadedIndex {
    /// What: Build the lookup table for `entries`.
    ///
    /// Details:
    /// - Keeps the first position when the service lists a name twice.
    fn new(entries: Vec<IndexEntry>) -> Self {
        let mut name_to_idx = HashMap::with_capacity(entries.len());
        let mut id_to_idx = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            name_to_idx.entry(entry.canonical_name()).or_insert(i);
            if let Some(id) = entry.catalog_id() {
                id_to_idx.entry(id).or_insert(i);
            }
        }
        Self {
            entries,
            name_to_idx,
            id_to_idx,
        }
    }
}

/// Session-wide holder of the catalog index.
#[derive(Debug, Default)]
pub struct IndexStore {
    /// Set exactly once by the first successful `load`.
    loaded: OnceCell<LoadedIndex>,
}

impl IndexStore {
    /// Create an empty, unloaded store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// What: Fetch the index, once per session.
    ///
    /// Inputs:
    /// - `client`: Remote catalog.
    /// - `limit`: Maximum number of entries requested.
    ///
    /// Output:
    /// - The loaded entries. Later calls return them without any request.
    ///
    /// # Errors
    /// - Propagates the fetch failure. The store stays unloaded so the
    ///   caller may retry.
    ///
    /// Details:
    /// - Concurrent callers share one request.
    pub async fn load(&self, client: &dyn CatalogClient, limit: usize) -> Result<&[IndexEntry]> {
        let loaded = self
            .loaded
            .get_or_try_init(|| async {
                let entries = client.fetch_index(limit).await?;
                tracing::info!(count = entries.len(), "catalog index loaded");
                Ok::<_, CatalogError>(LoadedIndex::new(entries))
            })
            .await?;
        Ok(&loaded.entries)
    }

    /// Whether `load` has succeeded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded.initialized()
    }

    /// All entries; empty before loading.
    #[must_use]
    pub fn entries(&self) -> &[IndexEntry] {
        self.loaded.get().map_or(&[], |l| l.entries.as_slice())
    }

    /// Number of entries; 0 before loading.
    #[must_use]
    pub fn count(&self) -> usize {
        self.entries().len()
    }

    /// What: Copy out up to `limit` entries starting at `offset`.
    ///
    /// Output:
    /// - Entries in index order; empty when `offset` is past the end.
    #[must_use]
    pub fn slice(&self, offset: usize, limit: usize) -> Vec<IndexEntry> {
        self.entries()
            .iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect()
    }

    /// What: Case-insensitive substring search over entry names.
    ///
    /// Inputs:
    /// - `substring`: Typed text; blank input yields nothing.
    /// - `limit`: Maximum results.
    ///
    /// Output:
    /// - Matching entries in index order, at most `limit`.
    #[must_use]
    pub fn find_by_prefix(&self, substring: &str, limit: usize) -> Vec<IndexEntry> {
        let needle = canonical_name(substring);
        if needle.is_empty() {
            return Vec::new();
        }
        self.entries()
            .iter()
            .filter(|e| e.name.to_lowercase().contains(&needle))
            .take(limit)
            .cloned()
            .collect()
    }

    /// Entry with the given name, compared case-insensitively.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&IndexEntry> {
        let loaded = self.loaded.get()?;
        loaded
            .name_to_idx
            .get(&canonical_name(name))
            .and_then(|&i| loaded.entries.get(i))
    }

    /// What: Map search text to its index entry.
    ///
    /// Inputs:
    /// - `query`: Entry name or catalog number, any case and padding.
    ///
    /// Output:
    /// - The entry whose name matches, else the entry whose catalog number
    ///   matches a numeric query; `None` when neither is listed.
    #[must_use]
    pub fn lookup(&self, query: &str) -> Option<&IndexEntry> {
        if let Some(entry) = self.get(query) {
            return Some(entry);
        }
        let id: u32 = query.trim().parse().ok()?;
        let loaded = self.loaded.get()?;
        loaded
            .id_to_idx
            .get(&id)
            .and_then(|&i| loaded.entries.get(i))
    }

    /// Pages available at `page_size`; 0 for an empty or unloaded index.
    #[must_use]
    pub fn total_pages(&self, page_size: usize) -> usize {
        PageWindow::total_pages(page_size, self.count())
    }

    /// What: Index positions covered by `window`.
    ///
    /// # Errors
    /// - `NotInitialized` before loading; `PageOutOfRange` past the last page.
    pub fn page_range(&self, window: PageWindow) -> Result<Range<usize>> {
        if !self.is_loaded() {
            return Err(CatalogError::NotInitialized);
        }
        window.range(self.count())
    }

    /// Navigation facts for `window` against the loaded index.
    #[must_use]
    pub fn page_info(&self, window: PageWindow) -> PageInfo {
        window.info(self.count())
    }
}
