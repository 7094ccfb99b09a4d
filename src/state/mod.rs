//! Data model shared across the engine.
//!
//! Everything here is plain data: no I/O, no presentation state.

pub mod types;

pub use types::{
    DetailRecord, FilterInput, FilterSpec, IndexEntry, LoadProgress, PageInfo, PageWindow,
    SortKey,
};
