//! Test utilities shared by the unit tests.
//!
//! [`FakeCatalog`] implements [`CatalogClient`] from in-memory fixtures and
//! counts every request so tests can assert on network traffic.

#![cfg(test)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::error::{CatalogError, Result};
use crate::sources::CatalogClient;
use crate::state::IndexEntry;

/// What: Build detail JSON shaped like the PokeAPI response.
///
/// Inputs:
/// - `id`, `name`: Identity fields.
/// - `types`: Type names in slot order.
/// - `height`, `weight`: Measurements in tenths.
pub fn detail_json(id: u32, name: &str, types: &[&str], height: u32, weight: u32) -> Value {
    let types: Vec<Value> = types
        .iter()
        .enumerate()
        .map(|(i, t)| json!({ "slot": i + 1, "type": { "name": t } }))
        .collect();
    json!({
        "id": id,
        "name": name,
        "height": height,
        "weight": weight,
        "sprites": { "front_default": format!("https://img/{id}.png") },
        "types": types,
        "abilities": [ { "ability": { "name": "overgrow" } } ],
        "species": { "url": format!("https://pokeapi.co/api/v2/pokemon-species/{id}/") }
    })
}

/// What: Build species JSON with the given `(language, text)` flavor entries.
pub fn species_json(entries: &[(&str, &str)]) -> Value {
    let entries: Vec<Value> = entries
        .iter()
        .map(|(lang, text)| json!({ "flavor_text": text, "language": { "name": lang } }))
        .collect();
    json!({ "flavor_text_entries": entries })
}

/// In-memory catalog with request counters, injected failures and delays.
#[derive(Default)]
pub struct FakeCatalog {
    /// Index served by `fetch_index`.
    entries: Vec<IndexEntry>,
    /// Detail JSON by canonical name.
    details: HashMap<String, Value>,
    /// Species JSON by reference.
    species: HashMap<String, Value>,
    /// Names whose detail request fails with `Network`.
    failing: Mutex<HashSet<String>>,
    /// Per-name detail latency in milliseconds.
    delays: HashMap<String, u64>,
    /// Detail request count by name.
    detail_calls: Mutex<HashMap<String, usize>>,
    /// Index request count.
    index_calls: AtomicUsize,
    /// Makes `fetch_index` fail.
    fail_index: AtomicBool,
}

impl FakeCatalog {
    /// What: Catalog of `count` creatures named `mon001`, `mon002`, ...
    ///
    /// Details:
    /// - Creature `n` has id `n`, height `n` decimeters, weight `10 * n`
    ///   hectograms, type `grass` (plus `poison` for even ids).
    pub fn with_creatures(count: u32) -> Self {
        let mut fake = Self::default();
        for id in 1..=count {
            let name = format!("mon{id:03}");
            let types: &[&str] = if id % 2 == 0 {
                &["grass", "poison"]
            } else {
                &["grass"]
            };
            fake = fake.with_detail(detail_json(id, &name, types, id, id * 10));
        }
        fake
    }

    /// Add one creature (index entry, detail and an English species text).
    pub fn with_detail(mut self, detail: Value) -> Self {
        let name = detail["name"].as_str().unwrap_or_default().to_string();
        let id = detail["id"].as_u64().unwrap_or_default();
        let species_ref = format!("https://pokeapi.co/api/v2/pokemon-species/{id}/");
        self.entries.push(IndexEntry::new(
            &name,
            format!("https://pokeapi.co/api/v2/pokemon/{id}/"),
        ));
        let flavor = format!("{name} flavor");
        self.species
            .insert(species_ref, species_json(&[("en", flavor.as_str())]));
        self.details.insert(name, detail);
        self
    }

    /// Replace the species record behind a reference.
    pub fn with_species(mut self, reference: &str, species: Value) -> Self {
        self.species.insert(reference.to_string(), species);
        self
    }

    /// Delay detail responses for `name`.
    pub fn with_delay(mut self, name: &str, millis: u64) -> Self {
        self.delays.insert(name.to_string(), millis);
        self
    }

    /// Make detail requests for `name` fail until cleared with [`FakeCatalog::set_failing`].
    pub fn failing(self, name: &str) -> Self {
        self.set_failing(name, true);
        self
    }

    /// Toggle the injected failure for `name`.
    pub fn set_failing(&self, name: &str, fail: bool) {
        let mut set = self.failing.lock().unwrap();
        if fail {
            set.insert(name.to_string());
        } else {
            set.remove(name);
        }
    }

    /// Make `fetch_index` fail with a network error.
    pub fn fail_index(&self, fail: bool) {
        self.fail_index.store(fail, Ordering::SeqCst);
    }

    /// Number of detail requests issued for `name`.
    pub fn detail_calls(&self, name: &str) -> usize {
        self.detail_calls
            .lock()
            .unwrap()
            .get(name)
            .copied()
            .unwrap_or(0)
    }

    /// Number of detail requests issued overall.
    pub fn total_detail_calls(&self) -> usize {
        self.detail_calls.lock().unwrap().values().sum()
    }

    /// Number of index requests issued.
    pub fn index_calls(&self) -> usize {
        self.index_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogClient for FakeCatalog {
    async fn fetch_index(&self, limit: usize) -> Result<Vec<IndexEntry>> {
        self.index_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if self.fail_index.load(Ordering::SeqCst) {
            return Err(CatalogError::Network("index unavailable".into()));
        }
        Ok(self.entries.iter().take(limit).cloned().collect())
    }

    async fn fetch_detail(&self, canonical_name: &str) -> Result<Value> {
        *self
            .detail_calls
            .lock()
            .unwrap()
            .entry(canonical_name.to_string())
            .or_default() += 1;
        let delay = self.delays.get(canonical_name).copied().unwrap_or(1);
        tokio::time::sleep(Duration::from_millis(delay)).await;
        if self.failing.lock().unwrap().contains(canonical_name) {
            return Err(CatalogError::Network(format!("{canonical_name} timed out")));
        }
        self.details
            .get(canonical_name)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(canonical_name.to_string()))
    }

    async fn fetch_species(&self, reference: &str) -> Result<Value> {
        self.species
            .get(reference)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(reference.to_string()))
    }

    async fn fetch_types(&self) -> Result<Vec<String>> {
        Ok(vec!["grass".into(), "poison".into(), "fire".into()])
    }
}
