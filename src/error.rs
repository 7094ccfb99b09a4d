//! Error taxonomy shared by every engine component.

use thiserror::Error;

/// Errors surfaced by the catalog engine.
///
/// The enum is `Clone` because a single in-flight detail resolution hands the
/// same outcome to every caller that joined it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Transport failure, timeout, or a non-2xx status other than 404.
    #[error("network error: {0}")]
    Network(String),

    /// The request was valid but no entry matches.
    #[error("'{0}' not found")]
    NotFound(String),

    /// A search was issued while another one is still outstanding.
    #[error("a search is already in progress")]
    Busy,

    /// The response JSON does not have the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The operation was superseded by a newer request.
    #[error("operation was superseded by a newer request")]
    Cancelled,

    /// An operation needing the index ran before `initialize` succeeded.
    #[error("catalog index has not been loaded")]
    NotInitialized,

    /// A page window was built with a zero page number or size.
    #[error("invalid page window: {0}")]
    InvalidPage(String),

    /// The requested page lies past the last page.
    #[error("page {page} is out of range (total pages: {total_pages})")]
    PageOutOfRange {
        /// Requested 1-based page number.
        page: usize,
        /// Number of pages available for the current index and page size.
        total_pages: usize,
    },

    /// Configuration could not be read or failed validation.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl CatalogError {
    /// What: Tell whether a later call for the same input may succeed.
    ///
    /// Output:
    /// - `true` for network failures and cancellations, `false` otherwise.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Cancelled)
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, CatalogError>;
