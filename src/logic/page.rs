//! Page materialization: index slice → bounded concurrent resolutions.

use std::pin::pin;
use std::sync::Arc;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::cache::DetailCache;
use crate::error::{CatalogError, Result};
use crate::index::IndexStore;
use crate::state::{DetailRecord, LoadProgress, PageInfo, PageWindow};

/// Result of loading one page.
#[derive(Clone, Debug)]
pub struct PageLoad {
    /// Window that was loaded.
    pub window: PageWindow,
    /// Navigation facts for the window.
    pub info: PageInfo,
    /// Resolved records in index order; failed entries are absent.
    pub records: Vec<Arc<DetailRecord>>,
    /// Names of the entries that could not be resolved, in index order.
    pub failed: Vec<String>,
}

/// Turns page windows into resolved pages through the shared detail cache.
pub struct PageResolver {
    /// Shared detail cache.
    cache: Arc<DetailCache>,
    /// Maximum simultaneous resolutions per page.
    concurrency_limit: usize,
}

impl PageResolver {
    /// Create a resolver; a zero limit is treated as 1.
    #[must_use]
    pub fn new(cache: Arc<DetailCache>, concurrency_limit: usize) -> Self {
        Self {
            cache,
            concurrency_limit: concurrency_limit.max(1),
        }
    }

    /// What: Resolve every entry of a page.
    ///
    /// Inputs:
    /// - `index`: Loaded index.
    /// - `window`: Page to load.
    /// - `cancel`: Token that aborts the load when a newer request supersedes it.
    /// - `on_progress`: Called after every finished resolution, success or failure.
    ///
    /// Output:
    /// - `PageLoad` with records in index order. Entries that failed to
    ///   resolve are dropped and listed in `failed`; they never fail the page.
    ///
    /// # Errors
    /// - `NotInitialized` or `PageOutOfRange` for an unusable window.
    /// - `Cancelled` when `cancel` fires before every entry finished.
    ///
    /// Details:
    /// - At most `concurrency_limit` resolutions run at once.
    /// - Progress counts increase by one per call and end at the slice size.
    pub async fn load_page<F>(
        &self,
        index: &IndexStore,
        window: PageWindow,
        cancel: &CancellationToken,
        mut on_progress: F,
    ) -> Result<PageLoad>
    where
        F: FnMut(LoadProgress),
    {
        let range = index.page_range(window)?;
        let slice = &index.entries()[range];
        let total = slice.len();
        tracing::debug!(
            page = window.page_number(),
            entries = total,
            concurrency = self.concurrency_limit,
            "loading page"
        );
        let cache = &self.cache;
        let mut pending = pin!(
            futures::stream::iter(slice.iter().enumerate())
                .map(|(pos, entry)| async move { (pos, cache.resolve(&entry.name).await) })
                .buffer_unordered(self.concurrency_limit)
        );
        let mut resolved: Vec<Option<Arc<DetailRecord>>> = vec![None; total];
        let mut completed = 0;
        loop {
            let next = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    tracing::debug!(
                        page = window.page_number(),
                        completed,
                        total,
                        "page load superseded"
                    );
                    return Err(CatalogError::Cancelled);
                }
                next = pending.next() => next,
            };
            let Some((pos, outcome)) = next else {
                break;
            };
            match outcome {
                Ok(record) => resolved[pos] = Some(record),
                Err(e) => {
                    tracing::warn!(name = %slice[pos].name, error = %e, "dropping entry from page");
                }
            }
            completed += 1;
            on_progress(LoadProgress { completed, total });
        }
        let failed: Vec<String> = slice
            .iter()
            .zip(&resolved)
            .filter(|(_, r)| r.is_none())
            .map(|(e, _)| e.name.clone())
            .collect();
        let records: Vec<Arc<DetailRecord>> = resolved.into_iter().flatten().collect();
        tracing::info!(
            page = window.page_number(),
            loaded = records.len(),
            failed = failed.len(),
            "page loaded"
        );
        Ok(PageLoad {
            window,
            info: index.page_info(window),
            records,
            failed,
        })
    }
}
