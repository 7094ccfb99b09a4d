//! Single-slot search: one lookup at a time, straight through the cache.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;

use crate::cache::DetailCache;
use crate::error::{CatalogError, Result};
use crate::state::DetailRecord;
use crate::util::canonical_name;

/// Claim on the single search slot; releases the busy flag when dropped.
pub struct SearchPermit<'a> {
    /// Resolver whose slot is held.
    resolver: &'a SearchResolver,
}

impl SearchPermit<'_> {
    /// What: Run the lookup this permit was taken for.
    ///
    /// Inputs:
    /// - `raw`: Text as typed; trimmed and lowercased before lookup.
    /// - `cancel`: Token that aborts the search when a newer request supersedes it.
    ///
    /// # Errors
    /// - `NotFound` for blank input or an unknown entry.
    /// - `Cancelled` when `cancel` fires first.
    /// - `Network`/`MalformedResponse` as reported by the cache.
    pub async fn search(&self, raw: &str, cancel: &CancellationToken) -> Result<Arc<DetailRecord>> {
        let query = canonical_name(raw);
        if query.is_empty() {
            return Err(CatalogError::NotFound(raw.trim().to_string()));
        }
        tracing::debug!(query = %query, "searching");
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(CatalogError::Cancelled),
            outcome = self.resolver.cache.resolve(&query) => outcome,
        }
    }
}

impl Drop for SearchPermit<'_> {
    fn drop(&mut self) {
        self.resolver.busy.store(false, Ordering::Release);
    }
}

/// Resolves one free-text name or id to a record.
pub struct SearchResolver {
    /// Shared detail cache.
    cache: Arc<DetailCache>,
    /// Set while a search is outstanding.
    busy: AtomicBool,
}

impl SearchResolver {
    /// Create a resolver over the shared cache.
    #[must_use]
    pub const fn new(cache: Arc<DetailCache>) -> Self {
        Self {
            cache,
            busy: AtomicBool::new(false),
        }
    }

    /// What: Claim the search slot.
    ///
    /// Output:
    /// - A permit that keeps the slot until dropped.
    ///
    /// # Errors
    /// - `Busy` while another permit is alive; the caller is not queued.
    pub fn try_begin(&self) -> Result<SearchPermit<'_>> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("search rejected: another search is outstanding");
            return Err(CatalogError::Busy);
        }
        Ok(SearchPermit { resolver: self })
    }

    /// What: Look up one record by name or catalog number.
    ///
    /// Inputs:
    /// - `raw`: Text as typed; trimmed and lowercased before lookup.
    /// - `cancel`: Token that aborts the search when a newer request supersedes it.
    ///
    /// Output:
    /// - The resolved record (from cache when already known).
    ///
    /// # Errors
    /// - `NotFound` for blank input or an unknown entry.
    /// - `Busy` while another search is outstanding; the call is not queued.
    /// - `Cancelled` when `cancel` fires first.
    /// - `Network`/`MalformedResponse` as reported by the cache.
    pub async fn search(&self, raw: &str, cancel: &CancellationToken) -> Result<Arc<DetailRecord>> {
        if canonical_name(raw).is_empty() {
            return Err(CatalogError::NotFound(raw.trim().to_string()));
        }
        let permit = self.try_begin()?;
        permit.search(raw, cancel).await
    }

    /// Whether a search is currently outstanding.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}
