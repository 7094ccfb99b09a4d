//! Session facade used by the presentation layer.
//!
//! [`CatalogEngine`] owns the index, the detail cache and the session state
//! (current working set, active filter, outstanding request). A presentation
//! layer calls these operations and renders what they return; it never
//! fetches or caches on its own.
//!
//! Every page load or search starts a new generation and cancels the token
//! of the request it supersedes, so a stale response can never overwrite
//! the output of a newer one.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};

use lru::LruCache;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::cache::{DescriptionLanguages, DetailCache};
use crate::config::EngineConfig;
use crate::error::{CatalogError, Result};
use crate::index::IndexStore;
use crate::logic::{PageResolver, SearchResolver, apply_filter};
use crate::sources::{CatalogClient, HttpCatalogClient};
use crate::state::{DetailRecord, FilterSpec, IndexEntry, LoadProgress, PageInfo, PageWindow};
use crate::util::canonical_name;

/// Progress notification forwarded while a page resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Page being loaded.
    pub page_number: usize,
    /// Completion counter.
    pub progress: LoadProgress,
}

/// What the working set currently holds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViewMode {
    /// A resolved page.
    #[default]
    Paged,
    /// A single search result.
    Search,
}

/// Outcome of [`CatalogEngine::initialize`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InitSummary {
    /// Entries in the index.
    pub total_entries: usize,
    /// Pages at the configured page size.
    pub total_pages: usize,
    /// Type vocabulary for filter choices; empty when it could not be fetched.
    pub types: Vec<String>,
}

/// Outcome of [`CatalogEngine::load_page`].
#[derive(Clone, Debug)]
pub struct PageView {
    /// Navigation facts for the page.
    pub info: PageInfo,
    /// Page records after the active filter and sort.
    pub records: Vec<Arc<DetailRecord>>,
    /// Records resolved for the page before filtering.
    pub resolved: usize,
    /// Entries dropped because they could not be resolved.
    pub failed: Vec<String>,
}

/// Mutable per-session state.
#[derive(Default)]
struct Session {
    /// Bumped by every page load or search.
    generation: u64,
    /// Token of the outstanding page load or search.
    active: Option<CancellationToken>,
    /// Content of the working set.
    mode: ViewMode,
    /// Last successfully loaded page.
    window: Option<PageWindow>,
    /// Records the active filter is applied to.
    working_set: Vec<Arc<DetailRecord>>,
    /// Last filter applied.
    filter: FilterSpec,
}

/// What: Lock a mutex, recovering from poisoning.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    match m.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Fetch/cache/pagination/filter engine for one browsing session.
pub struct CatalogEngine {
    /// Validated configuration.
    config: EngineConfig,
    /// Remote catalog.
    client: Arc<dyn CatalogClient>,
    /// Catalog index.
    index: IndexStore,
    /// Shared detail cache.
    cache: Arc<DetailCache>,
    /// Page materialization.
    pages: PageResolver,
    /// Single-slot search.
    search: SearchResolver,
    /// Type vocabulary from the last successful initialize.
    types: Mutex<Vec<String>>,
    /// Session state.
    session: Mutex<Session>,
    /// Recent successful searches, most recent first.
    recent: Mutex<LruCache<String, ()>>,
    /// Optional progress listener.
    progress_tx: Option<mpsc::UnboundedSender<ProgressEvent>>,
}

impl CatalogEngine {
    /// What: Build an engine talking to PokeAPI over HTTP.
    ///
    /// # Errors
    /// - `Config` when the configuration does not validate.
    /// - `Network` when the HTTP client cannot be created.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let client = HttpCatalogClient::new(&config)?;
        Self::with_client(config, Arc::new(client))
    }

    /// What: Build an engine over any [`CatalogClient`].
    ///
    /// # Errors
    /// - `Config` when the configuration does not validate.
    pub fn with_client(config: EngineConfig, client: Arc<dyn CatalogClient>) -> Result<Self> {
        config.validate()?;
        let cache = Arc::new(DetailCache::new(
            Arc::clone(&client),
            DescriptionLanguages::new(
                config.preferred_language.clone(),
                config.fallback_language.clone(),
            ),
        ));
        let recent_capacity =
            NonZeroUsize::new(config.recent_capacity).unwrap_or(NonZeroUsize::MIN);
        Ok(Self {
            pages: PageResolver::new(Arc::clone(&cache), config.concurrency_limit),
            search: SearchResolver::new(Arc::clone(&cache)),
            cache,
            client,
            index: IndexStore::new(),
            types: Mutex::new(Vec::new()),
            session: Mutex::new(Session::default()),
            recent: Mutex::new(LruCache::new(recent_capacity)),
            progress_tx: None,
            config,
        })
    }

    /// Forward page progress to `tx`.
    #[must_use]
    pub fn with_progress(mut self, tx: mpsc::UnboundedSender<ProgressEvent>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    /// What: Load the index and the type vocabulary.
    ///
    /// Output:
    /// - Entry and page counts plus the type list.
    ///
    /// # Errors
    /// - Propagates the index failure; the engine stays uninitialized and
    ///   the call may be retried.
    ///
    /// Details:
    /// - Both requests run concurrently. A failing type request is logged
    ///   and yields an empty vocabulary.
    /// - The index is fetched once per session; later calls reuse it.
    pub async fn initialize(&self) -> Result<InitSummary> {
        let (index, types) = tokio::join!(
            self.index.load(self.client.as_ref(), self.config.index_limit),
            self.client.fetch_types()
        );
        let total_entries = match index {
            Ok(entries) => entries.len(),
            Err(e) => {
                tracing::error!(error = %e, "catalog index failed to load");
                return Err(e);
            }
        };
        let types = match types {
            Ok(types) => {
                lock(&self.types).clone_from(&types);
                types
            }
            Err(e) => {
                tracing::warn!(error = %e, "type vocabulary unavailable");
                lock(&self.types).clone()
            }
        };
        let total_pages = self.index.total_pages(self.config.page_size);
        tracing::info!(total_entries, total_pages, types = types.len(), "engine initialized");
        Ok(InitSummary {
            total_entries,
            total_pages,
            types,
        })
    }

    /// What: Start a new request generation.
    ///
    /// Output:
    /// - Generation number and the token for the new request.
    ///
    /// Details:
    /// - Cancels the token of whatever request was outstanding.
    fn begin(&self) -> (u64, CancellationToken) {
        let mut session = lock(&self.session);
        if let Some(previous) = session.active.take() {
            previous.cancel();
        }
        session.generation += 1;
        let token = CancellationToken::new();
        session.active = Some(token.clone());
        (session.generation, token)
    }

    /// Drop the active token if it still belongs to `generation`.
    fn release(&self, generation: u64) {
        let mut session = lock(&self.session);
        if session.generation == generation {
            session.active = None;
        }
    }

    /// What: Load a page and make it the working set.
    ///
    /// Inputs:
    /// - `page_number`: 1-based page at the configured page size.
    ///
    /// Output:
    /// - `PageView` with the filtered page records and the entries that failed.
    ///
    /// # Errors
    /// - `NotInitialized` before a successful `initialize`.
    /// - `InvalidPage`/`PageOutOfRange` for a page outside `1..=total_pages`;
    ///   such a request does not disturb an outstanding one.
    /// - `Cancelled` when a newer page load or search superseded this one.
    pub async fn load_page(&self, page_number: usize) -> Result<PageView> {
        if !self.index.is_loaded() {
            return Err(CatalogError::NotInitialized);
        }
        let window = PageWindow::new(page_number, self.config.page_size)?;
        self.index.page_range(window)?;
        let (generation, token) = self.begin();
        let tx = self.progress_tx.clone();
        let outcome = self
            .pages
            .load_page(&self.index, window, &token, |progress| {
                if let Some(tx) = &tx {
                    let _ = tx.send(ProgressEvent {
                        page_number,
                        progress,
                    });
                }
            })
            .await;
        let load = match outcome {
            Ok(load) => load,
            Err(e) => {
                self.release(generation);
                return Err(e);
            }
        };
        let mut session = lock(&self.session);
        if session.generation != generation || token.is_cancelled() {
            tracing::debug!(page = page_number, "discarding superseded page");
            return Err(CatalogError::Cancelled);
        }
        session.active = None;
        session.mode = ViewMode::Paged;
        session.window = Some(window);
        session.working_set = load.records;
        let records = apply_filter(&session.working_set, &session.filter);
        Ok(PageView {
            info: load.info,
            records,
            resolved: session.working_set.len(),
            failed: load.failed,
        })
    }

    /// What: Apply a filter to the working set and remember it.
    ///
    /// Output:
    /// - Derived view; the working set is unchanged and nothing is fetched.
    pub fn apply_filter(&self, spec: FilterSpec) -> Vec<Arc<DetailRecord>> {
        let mut session = lock(&self.session);
        session.filter = spec;
        apply_filter(&session.working_set, &session.filter)
    }

    /// Working set under the active filter.
    #[must_use]
    pub fn current_view(&self) -> Vec<Arc<DetailRecord>> {
        let session = lock(&self.session);
        apply_filter(&session.working_set, &session.filter)
    }

    /// Filter applied by the last `apply_filter`.
    #[must_use]
    pub fn active_filter(&self) -> FilterSpec {
        lock(&self.session).filter.clone()
    }

    /// What: Look up one record by name and make it the working set.
    ///
    /// Inputs:
    /// - `text`: Free-text name or catalog number.
    ///
    /// # Errors
    /// - `NotInitialized` before a successful `initialize`.
    /// - `NotFound` for blank input or an unknown entry.
    /// - `Busy` while another search is outstanding.
    /// - `Cancelled` when a page load superseded this search.
    /// - `Network`/`MalformedResponse` from the remote catalog.
    ///
    /// Details:
    /// - A name or catalog number listed in the index resolves through that
    ///   entry's name, so the cached record for it is reused.
    /// - Supersedes an outstanding page load. A `Busy` rejection supersedes nothing.
    /// - A failed search leaves the working set as it was.
    pub async fn search(&self, text: &str) -> Result<Arc<DetailRecord>> {
        if !self.index.is_loaded() {
            return Err(CatalogError::NotInitialized);
        }
        let query = canonical_name(text);
        if query.is_empty() {
            return Err(CatalogError::NotFound(text.trim().to_string()));
        }
        let key = self.index.lookup(&query).map_or(query, IndexEntry::canonical_name);
        let permit = self.search.try_begin()?;
        let (generation, token) = self.begin();
        let record = match permit.search(&key, &token).await {
            Ok(record) => record,
            Err(e) => {
                self.release(generation);
                return Err(e);
            }
        };
        {
            let mut session = lock(&self.session);
            if session.generation != generation || token.is_cancelled() {
                return Err(CatalogError::Cancelled);
            }
            session.active = None;
            session.mode = ViewMode::Search;
            session.working_set = vec![Arc::clone(&record)];
        }
        lock(&self.recent).put(key, ());
        Ok(record)
    }

    /// What: Suggest index entries for partially typed text.
    ///
    /// Output:
    /// - Up to `suggestion_limit` entries containing `prefix`, in index order.
    #[must_use]
    pub fn suggestions(&self, prefix: &str) -> Vec<IndexEntry> {
        self.index.find_by_prefix(prefix, self.config.suggestion_limit)
    }

    /// What: Clear the active filter and go back to page 1.
    ///
    /// # Errors
    /// - As for [`CatalogEngine::load_page`].
    pub async fn reset(&self) -> Result<PageView> {
        lock(&self.session).filter = FilterSpec::default();
        self.load_page(1).await
    }

    /// Navigation facts for the current page; `None` before the first page
    /// or while a search result is shown.
    #[must_use]
    pub fn page_info(&self) -> Option<PageInfo> {
        let session = lock(&self.session);
        match session.mode {
            ViewMode::Paged => session.window.map(|w| self.index.page_info(w)),
            ViewMode::Search => None,
        }
    }

    /// What the working set currently holds.
    #[must_use]
    pub fn view_mode(&self) -> ViewMode {
        lock(&self.session).mode
    }

    /// Type vocabulary from the last successful fetch.
    #[must_use]
    pub fn types(&self) -> Vec<String> {
        lock(&self.types).clone()
    }

    /// Recent successful searches, most recent first.
    #[must_use]
    pub fn recent_searches(&self) -> Vec<String> {
        lock(&self.recent).iter().map(|(k, ())| k.clone()).collect()
    }

    /// Whether the index has been loaded.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.index.is_loaded()
    }

    /// Pages available at the configured page size.
    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.index.total_pages(self.config.page_size)
    }

    /// Shared detail cache.
    #[must_use]
    pub const fn cache(&self) -> &Arc<DetailCache> {
        &self.cache
    }

    /// Engine configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }
}
