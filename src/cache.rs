//! In-memory detail cache with per-key single flight.
//!
//! Each canonical name maps to either a resolved record or the one resolution
//! currently running for it. Callers that arrive while a resolution runs join
//! it instead of issuing their own request. Failed resolutions leave no trace,
//! so the next call for the same key simply tries again.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};

use crate::error::{CatalogError, Result};
use crate::sources::detail::{parse_detail, species_reference};
use crate::sources::{CatalogClient, NO_DESCRIPTION};
use crate::state::DetailRecord;
use crate::util::canonical_name;

/// Outcome shared by every caller joined on one resolution.
type Flight = Shared<BoxFuture<'static, Result<Arc<DetailRecord>>>>;

/// Cache entry state for one canonical name.
enum Slot {
    /// Resolved record, served without I/O.
    Ready(Arc<DetailRecord>),
    /// Resolution in progress.
    InFlight {
        /// Distinguishes this flight from later ones for the same key.
        id: u64,
        /// Joinable outcome.
        flight: Flight,
    },
}

/// Slot table shared with the spawned resolution tasks.
type SlotMap = Arc<Mutex<HashMap<String, Slot>>>;

/// Language pair used when picking descriptions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DescriptionLanguages {
    /// First-choice language code.
    pub preferred: String,
    /// Second-choice language code.
    pub fallback: String,
}

impl DescriptionLanguages {
    /// Build a language pair.
    #[must_use]
    pub fn new(preferred: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self {
            preferred: preferred.into(),
            fallback: fallback.into(),
        }
    }
}

/// What: Lock the slot table, recovering from a poisoned mutex.
fn lock_slots(slots: &Mutex<HashMap<String, Slot>>) -> MutexGuard<'_, HashMap<String, Slot>> {
    match slots.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// What: Record the outcome of flight `id` for `key`.
///
/// Details:
/// - Does nothing when the slot no longer belongs to this flight.
/// - Success stores the record; failure clears the slot so a later call retries.
fn settle(
    slots: &Mutex<HashMap<String, Slot>>,
    key: &str,
    id: u64,
    outcome: &Result<Arc<DetailRecord>>,
) {
    let mut map = lock_slots(slots);
    let owns_slot =
        matches!(map.get(key), Some(Slot::InFlight { id: current, .. }) if *current == id);
    if !owns_slot {
        return;
    }
    match outcome {
        Ok(record) => {
            map.insert(key.to_string(), Slot::Ready(Arc::clone(record)));
        }
        Err(e) => {
            map.remove(key);
            tracing::debug!(name = %key, error = %e, "detail resolution failed; not cached");
        }
    }
}

/// What: Fetch and assemble one record.
///
/// Inputs:
/// - `client`: Remote catalog.
/// - `key`: Canonical name.
/// - `languages`: Description language pair.
///
/// Output:
/// - The assembled record.
///
/// Details:
/// - A detail without a species link gets the sentinel description; a
///   failing species request fails the whole resolution.
async fn fetch_record(
    client: &dyn CatalogClient,
    key: &str,
    languages: &DescriptionLanguages,
) -> Result<Arc<DetailRecord>> {
    let raw = client.fetch_detail(key).await?;
    let description = match species_reference(&raw) {
        Some(reference) => {
            client
                .fetch_localized_text(&reference, &languages.preferred, &languages.fallback)
                .await?
        }
        None => NO_DESCRIPTION.to_string(),
    };
    parse_detail(&raw, description).map(Arc::new)
}

/// Memo store of resolved detail records keyed by canonical name.
///
/// Constructed by the engine and shared as `Arc<DetailCache>`; there is no
/// process-wide instance. Records are never evicted.
pub struct DetailCache {
    /// Remote catalog used on misses.
    client: Arc<dyn CatalogClient>,
    /// Description language pair.
    languages: DescriptionLanguages,
    /// Resolved and in-flight entries.
    slots: SlotMap,
    /// Source of flight ids.
    next_flight: AtomicU64,
}

impl DetailCache {
    /// Create an empty cache over `client`.
    #[must_use]
    pub fn new(client: Arc<dyn CatalogClient>, languages: DescriptionLanguages) -> Self {
        Self {
            client,
            languages,
            slots: Arc::new(Mutex::new(HashMap::new())),
            next_flight: AtomicU64::new(0),
        }
    }

    /// What: Resolve a record by name, fetching it at most once.
    ///
    /// Inputs:
    /// - `name`: Any spelling of the entry name; it is canonicalized first.
    ///
    /// Output:
    /// - Shared record. Every concurrent caller for the same key gets the same `Arc`.
    ///
    /// # Errors
    /// - `NotFound` for a blank name or an unknown entry; `Network` and
    ///   `MalformedResponse` as reported by the remote catalog.
    ///
    /// Details:
    /// - Must run inside a tokio runtime: the resolution is a spawned task,
    ///   so dropping this future does not abort it for other joiners and its
    ///   result still lands in the cache.
    pub async fn resolve(&self, name: &str) -> Result<Arc<DetailRecord>> {
        let key = canonical_name(name);
        if key.is_empty() {
            return Err(CatalogError::NotFound(name.to_string()));
        }
        let flight = {
            let mut slots = lock_slots(&self.slots);
            match slots.get(&key) {
                Some(Slot::Ready(record)) => {
                    tracing::trace!(name = %key, "detail cache hit");
                    return Ok(Arc::clone(record));
                }
                Some(Slot::InFlight { flight, .. }) => {
                    tracing::debug!(name = %key, "joining in-flight detail resolution");
                    flight.clone()
                }
                None => {
                    let id = self.next_flight.fetch_add(1, Ordering::Relaxed);
                    let flight = self.start_flight(key.clone(), id);
                    slots.insert(
                        key.clone(),
                        Slot::InFlight {
                            id,
                            flight: flight.clone(),
                        },
                    );
                    flight
                }
            }
        };
        flight.await
    }

    /// What: Spawn the resolution task for `key` and wrap it as a joinable flight.
    ///
    /// Details:
    /// - Called with the slot table locked; the task settles the slot itself
    ///   once it can take the lock.
    fn start_flight(&self, key: String, id: u64) -> Flight {
        tracing::debug!(name = %key, "resolving detail record");
        let client = Arc::clone(&self.client);
        let languages = self.languages.clone();
        let slots = Arc::clone(&self.slots);
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            let outcome = fetch_record(client.as_ref(), &task_key, &languages).await;
            settle(&slots, &task_key, id, &outcome);
            outcome
        });
        let slots = Arc::clone(&self.slots);
        async move {
            match handle.await {
                Ok(outcome) => outcome,
                Err(join_err) => {
                    let outcome = Err(CatalogError::Network(format!(
                        "resolution task for {key} failed: {join_err}"
                    )));
                    settle(&slots, &key, id, &outcome);
                    outcome
                }
            }
        }
        .boxed()
        .shared()
    }

    /// Cached record for `name`, without any I/O.
    #[must_use]
    pub fn peek(&self, name: &str) -> Option<Arc<DetailRecord>> {
        match lock_slots(&self.slots).get(&canonical_name(name)) {
            Some(Slot::Ready(record)) => Some(Arc::clone(record)),
            _ => None,
        }
    }

    /// Whether a resolution for `name` is currently running.
    #[must_use]
    pub fn is_in_flight(&self, name: &str) -> bool {
        matches!(
            lock_slots(&self.slots).get(&canonical_name(name)),
            Some(Slot::InFlight { .. })
        )
    }

    /// Number of resolved records.
    #[must_use]
    pub fn len(&self) -> usize {
        lock_slots(&self.slots)
            .values()
            .filter(|s| matches!(s, Slot::Ready(_)))
            .count()
    }

    /// Whether no record has been resolved yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Description language pair in use.
    #[must_use]
    pub const fn languages(&self) -> &DescriptionLanguages {
        &self.languages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FakeCatalog, species_json};
    use std::time::Duration;

    fn cache_over(fake: &Arc<FakeCatalog>) -> DetailCache {
        DetailCache::new(
            Arc::clone(fake) as Arc<dyn CatalogClient>,
            DescriptionLanguages::new("de", "en"),
        )
    }

    #[tokio::test]
    /// What: Sequential resolutions hit the network once
    ///
    /// - Input: Two `resolve` calls for the same name in different spellings
    /// - Output: One detail request; both callers get the same `Arc`
    async fn sequential_resolve_fetches_once() {
        let fake = Arc::new(FakeCatalog::with_creatures(3));
        let cache = cache_over(&fake);
        let first = cache.resolve("mon002").await.unwrap();
        let second = cache.resolve("  MON002 ").await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(fake.detail_calls("mon002"), 1);
        assert_eq!(first.name, "MON002");
        assert_eq!(first.description, "mon002 flavor");
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    /// What: Concurrent resolutions for one key share a single flight
    ///
    /// - Input: Eight simultaneous `resolve` calls for a slow entry
    /// - Output: Exactly one detail request; all callers get the same `Arc`
    async fn concurrent_resolve_is_single_flight() {
        let fake = Arc::new(FakeCatalog::with_creatures(2).with_delay("mon001", 30));
        let cache = cache_over(&fake);
        let results =
            futures::future::join_all((0..8).map(|_| cache.resolve("mon001"))).await;
        let records: Vec<_> = results.into_iter().map(Result::unwrap).collect();
        assert_eq!(fake.detail_calls("mon001"), 1);
        assert!(records.iter().all(|r| Arc::ptr_eq(r, &records[0])));
        assert!(!cache.is_in_flight("mon001"));
    }

    #[tokio::test]
    async fn distinct_keys_resolve_independently() {
        let fake = Arc::new(FakeCatalog::with_creatures(2));
        let cache = cache_over(&fake);
        let (a, b) = tokio::join!(cache.resolve("mon001"), cache.resolve("mon002"));
        assert_eq!(a.unwrap().id, 1);
        assert_eq!(b.unwrap().id, 2);
        assert_eq!(fake.total_detail_calls(), 2);
    }

    #[tokio::test]
    /// What: Failures are not cached and a later call retries
    ///
    /// - Input: Entry failing once, then healed
    /// - Output: First call errs, second succeeds, two requests in total
    async fn failure_is_not_cached() {
        let fake = Arc::new(FakeCatalog::with_creatures(1).failing("mon001"));
        let cache = cache_over(&fake);
        let err = cache.resolve("mon001").await.unwrap_err();
        assert!(matches!(err, CatalogError::Network(_)));
        assert!(cache.peek("mon001").is_none());
        assert!(!cache.is_in_flight("mon001"));

        fake.set_failing("mon001", false);
        assert!(cache.resolve("mon001").await.is_ok());
        assert_eq!(fake.detail_calls("mon001"), 2);
    }

    #[tokio::test]
    async fn unknown_and_blank_names_are_not_found() {
        let fake = Arc::new(FakeCatalog::with_creatures(1));
        let cache = cache_over(&fake);
        assert!(matches!(
            cache.resolve("missingno").await,
            Err(CatalogError::NotFound(_))
        ));
        assert!(matches!(cache.resolve("   ").await, Err(CatalogError::NotFound(_))));
        assert_eq!(fake.detail_calls(""), 0);
    }

    #[tokio::test]
    /// What: Description falls back to the sentinel when no language matches
    ///
    /// - Input: Species with only a French entry; languages de/en
    /// - Output: Record description is `NO_DESCRIPTION`
    async fn description_sentinel_when_no_language_matches() {
        let fake = Arc::new(FakeCatalog::with_creatures(1).with_species(
            "https://pokeapi.co/api/v2/pokemon-species/1/",
            species_json(&[("fr", "Graine")]),
        ));
        let cache = cache_over(&fake);
        let record = cache.resolve("mon001").await.unwrap();
        assert_eq!(record.description, NO_DESCRIPTION);
    }

    #[tokio::test]
    /// What: A dropped caller does not abort the resolution
    ///
    /// - Input: `resolve` abandoned by a timeout before the slow fetch completes
    /// - Output: The record still lands in the cache; no second request is made
    async fn abandoned_caller_still_populates_cache() {
        let fake = Arc::new(FakeCatalog::with_creatures(1).with_delay("mon001", 40));
        let cache = cache_over(&fake);
        let abandoned =
            tokio::time::timeout(Duration::from_millis(5), cache.resolve("mon001")).await;
        assert!(abandoned.is_err());
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(cache.peek("mon001").is_some());
        assert!(cache.resolve("mon001").await.is_ok());
        assert_eq!(fake.detail_calls("mon001"), 1);
    }
}
