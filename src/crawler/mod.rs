use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

/// 英為財情 (fr.investing.com)
pub mod investing;

/// Why a single fetch of the index value failed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network fault, timeout or non-success status.
    #[error("HTTP failure: {0}")]
    HttpFailure(String),
    /// The page was fetched but the value element is absent or empty.
    #[error("marker {0} not found in the page")]
    MarkerNotFound(String),
    /// The value element was found but its text is not a number.
    #[error("cannot parse '{0}' as an index value")]
    ParseFailure(String),
}

#[async_trait]
pub trait IndexValue {
    /// Fetches the currently displayed index value. One attempt, no retry.
    async fn fetch_index_value(&self) -> Result<Decimal, FetchError>;
}
