//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dexcat::{CatalogClient, CatalogError, EngineConfig, IndexEntry, Result};
use serde_json::{Value, json};

/// Catalog of numbered creatures served from memory.
///
/// Creature `n` is named `mon{n:03}`, measures `n` decimeters and
/// `10 * n` hectograms, and is `water` when `n` is divisible by 3 and
/// `grass` otherwise.
pub struct ScriptedCatalog {
    count: u32,
    failing: Mutex<HashSet<String>>,
    delays: Mutex<HashMap<String, u64>>,
    detail_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    fail_index: AtomicBool,
    fail_types: AtomicBool,
}

impl ScriptedCatalog {
    pub fn new(count: u32) -> Self {
        Self {
            count,
            failing: Mutex::new(HashSet::new()),
            delays: Mutex::new(HashMap::new()),
            detail_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            fail_index: AtomicBool::new(false),
            fail_types: AtomicBool::new(false),
        }
    }

    pub fn fail(&self, name: &str) {
        self.failing.lock().unwrap().insert(name.to_string());
    }

    pub fn delay(&self, name: &str, millis: u64) {
        self.delays.lock().unwrap().insert(name.to_string(), millis);
    }

    pub fn fail_index(&self, fail: bool) {
        self.fail_index.store(fail, Ordering::SeqCst);
    }

    pub fn fail_types(&self, fail: bool) {
        self.fail_types.store(fail, Ordering::SeqCst);
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    /// Highest number of detail requests that were running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn id_of(&self, name: &str) -> Option<u32> {
        let id = name
            .strip_prefix("mon")
            .map_or_else(|| name.parse().ok(), |n| n.parse().ok())?;
        (1..=self.count).contains(&id).then_some(id)
    }
}

#[async_trait]
impl CatalogClient for ScriptedCatalog {
    async fn fetch_index(&self, limit: usize) -> Result<Vec<IndexEntry>> {
        if self.fail_index.load(Ordering::SeqCst) {
            return Err(CatalogError::Network("connection refused".into()));
        }
        Ok((1..=self.count)
            .take(limit)
            .map(|id| {
                IndexEntry::new(
                    format!("mon{id:03}"),
                    format!("https://pokeapi.co/api/v2/pokemon/{id}/"),
                )
            })
            .collect())
    }

    async fn fetch_detail(&self, canonical_name: &str) -> Result<Value> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        let delay = self
            .delays
            .lock()
            .unwrap()
            .get(canonical_name)
            .copied()
            .unwrap_or(1);
        tokio::time::sleep(Duration::from_millis(delay)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if self.failing.lock().unwrap().contains(canonical_name) {
            return Err(CatalogError::Network(format!("{canonical_name} timed out")));
        }
        let id = self
            .id_of(canonical_name)
            .ok_or_else(|| CatalogError::NotFound(canonical_name.to_string()))?;
        let kind = if id % 3 == 0 { "water" } else { "grass" };
        Ok(json!({
            "id": id,
            "name": format!("mon{id:03}"),
            "height": id,
            "weight": id * 10,
            "sprites": { "front_default": format!("https://img/{id}.png") },
            "types": [ { "slot": 1, "type": { "name": kind } } ],
            "abilities": [ { "ability": { "name": "torrent" } } ],
            "species": { "url": format!("https://pokeapi.co/api/v2/pokemon-species/{id}/") }
        }))
    }

    async fn fetch_species(&self, reference: &str) -> Result<Value> {
        Ok(json!({
            "flavor_text_entries": [
                { "flavor_text": "Ein\nTest.", "language": { "name": "de" } },
                { "flavor_text": format!("Species at {reference}"), "language": { "name": "en" } }
            ]
        }))
    }

    async fn fetch_types(&self) -> Result<Vec<String>> {
        if self.fail_types.load(Ordering::SeqCst) {
            return Err(CatalogError::Network("type list unavailable".into()));
        }
        Ok(vec!["grass".into(), "water".into()])
    }
}

/// Default configuration with the given page size.
pub fn config(page_size: usize) -> EngineConfig {
    EngineConfig {
        page_size,
        ..EngineConfig::default()
    }
}
