//! Library entry for dexcat: a fetch/cache/paginate/filter engine over the
//! PokeAPI creature catalog.
//!
//! A presentation layer drives a [`CatalogEngine`] and renders what it
//! returns; all fetching, caching and view derivation happens here.

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod logging;
pub mod logic;
pub mod sources;
pub mod state;
pub mod util;

#[cfg(test)]
mod test_utils;

pub use crate::cache::{DescriptionLanguages, DetailCache};
pub use crate::config::EngineConfig;
pub use crate::engine::{CatalogEngine, InitSummary, PageView, ProgressEvent, ViewMode};
pub use crate::error::{CatalogError, Result};
pub use crate::sources::{CatalogClient, HttpCatalogClient};
pub use crate::state::{
    DetailRecord, FilterInput, FilterSpec, IndexEntry, LoadProgress, PageInfo, PageWindow, SortKey,
};
