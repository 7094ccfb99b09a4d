//! Remote catalog access.
//!
//! [`CatalogClient`] is the only seam through which the engine touches the
//! network. [`HttpCatalogClient`] talks to PokeAPI; tests substitute fakes.
//! The JSON shape handling lives in the `detail`, `index`, `species` and
//! `types` submodules so it can be exercised without a server.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::state::IndexEntry;

pub mod detail;
mod http;
pub mod index;
pub mod species;
pub mod types;

pub use http::HttpCatalogClient;
pub use species::NO_DESCRIPTION;

/// Typed read-only access to the remote catalog.
///
/// Implementations perform I/O only: no caching, no retries.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// What: Fetch the full ordered list of index entries.
    ///
    /// Inputs:
    /// - `limit`: Maximum number of entries requested from the service.
    ///
    /// # Errors
    /// - `Network` on transport failure, `MalformedResponse` on an unexpected shape.
    async fn fetch_index(&self, limit: usize) -> Result<Vec<IndexEntry>>;

    /// What: Fetch the raw detail JSON for one entry.
    ///
    /// Inputs:
    /// - `canonical_name`: Lowercase entry name.
    ///
    /// # Errors
    /// - `NotFound` when the service has no such entry, `Network` otherwise.
    async fn fetch_detail(&self, canonical_name: &str) -> Result<Value>;

    /// What: Fetch the raw species JSON holding localized flavor text.
    ///
    /// Inputs:
    /// - `reference`: Species URL taken from the detail record, or a bare species id/name.
    ///
    /// # Errors
    /// - `Network`, `NotFound` or `MalformedResponse` as for the other requests.
    async fn fetch_species(&self, reference: &str) -> Result<Value>;

    /// What: Fetch the type vocabulary offered as filter choices.
    ///
    /// # Errors
    /// - `Network` on transport failure, `MalformedResponse` on an unexpected shape.
    async fn fetch_types(&self) -> Result<Vec<String>>;

    /// What: Fetch the description for a species in the best available language.
    ///
    /// Inputs:
    /// - `reference`: Species reference (see [`CatalogClient::fetch_species`]).
    /// - `preferred`: First-choice language code.
    /// - `fallback`: Second-choice language code.
    ///
    /// Output:
    /// - First flavor text in `preferred`, else in `fallback`, else [`NO_DESCRIPTION`].
    ///
    /// # Errors
    /// - Propagates the species request failure.
    async fn fetch_localized_text(
        &self,
        reference: &str,
        preferred: &str,
        fallback: &str,
    ) -> Result<String> {
        let raw = self.fetch_species(reference).await?;
        Ok(species::select_flavor_text(&raw, preferred, fallback))
    }
}
