//! Series fetcher trait and structured provider errors.
//!
//! The SeriesFetcher trait abstracts over market-data sources so the run loop
//! can be driven by Yahoo Finance in production and by in-memory fixtures in
//! tests.

use crate::domain::{DateRange, PriceSeries, Symbol};
use thiserror::Error;

/// Transport or provider-level failure.
///
/// These mean the provider itself is unusable, not that a symbol is invalid,
/// so every variant aborts the run.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network unreachable: {0}")]
    Unreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("provider refused requests (HTTP 403)")]
    Blocked,

    #[error("HTTP {status} fetching {symbol}")]
    Http { status: u16, symbol: String },

    #[error("provider rejected the request: {0}")]
    Rejected(String),

        #[error("response format changed: {0}")]
    ResponseFormat(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("HTTP client error: {0}")]
    Client(String),
}

/// Per-symbol result of a fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// A non-empty series.
    Series(PriceSeries),
    /// The provider has nothing for this symbol in the range.
    NoData { reason: String },
}

impl FetchOutcome {
    /// Wrap a series, downgrading an empty one to `NoData`.
    pub fn from_series(series: PriceSeries) -> Self {
        if series.is_empty() {
            FetchOutcome::NoData {
                reason: "empty series".into(),
            }
        } else {
            FetchOutcome::Series(series)
        }
    }

    pub fn no_data(reason: impl Into<String>) -> Self {
        FetchOutcome::NoData {
            reason: reason.into(),
        }
    }
}

/// Source of adjusted-close series.
///
/// Implementations are called once per symbol, strictly sequentially, and
/// must not retry: a failure is terminal for that symbol in that run.
pub trait SeriesFetcher: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch the adjusted-close series for `symbol` over the closed `range`.
    fn fetch(&self, symbol: &Symbol, range: &DateRange) -> Result<FetchOutcome, ProviderError>;
}
