//! Engine logic over the cache: page materialization, filtering, sorting and search.

pub mod filter;
pub mod page;
pub mod search;
pub mod sort;

pub use filter::apply as apply_filter;
pub use page::{PageLoad, PageResolver};
pub use search::{SearchPermit, SearchResolver};
pub use sort::sort_records;
