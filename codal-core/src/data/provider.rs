//! Report provider trait, structured errors and the tagged fetch outcome.
//!
//! The `ReportProvider` trait abstracts over data sources (the Codal HTTP
//! API, an always-offline stub) so the fetcher can be exercised without a
//! network and tests can force transport failures.

use polars::prelude::PolarsError;
use thiserror::Error;

use super::records::{CompanyRecord, RawRecord};

/// Structured error types for data operations.
///
/// Provider errors never escape the fetcher; they are carried as the
/// `reason` of a `FetchOutcome::Fallback` and logged.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("provider returned HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("offline mode: network access disabled")]
    Offline,

    #[error("invalid provider url: {0}")]
    InvalidUrl(String),

    #[error("table error: {0}")]
    Table(String),

    #[error("data error: {0}")]
    Other(String),
}

impl From<PolarsError> for DataError {
    fn from(e: PolarsError) -> Self {
        DataError::Table(e.to_string())
    }
}

/// Where a fetched payload came from.
///
/// Downstream stages treat both variants identically; the tag exists so
/// callers and tests can tell real data from synthetic substitutes.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
    /// The provider answered with a success payload.
    Fetched(T),
    /// The provider failed; `data` is synthetic and `reason` says why.
    Fallback { data: T, reason: String },
}

impl<T> FetchOutcome<T> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, FetchOutcome::Fallback { .. })
    }

    pub fn data(&self) -> &T {
        match self {
            FetchOutcome::Fetched(data) | FetchOutcome::Fallback { data, .. } => data,
        }
    }

    pub fn into_data(self) -> T {
        match self {
            FetchOutcome::Fetched(data) | FetchOutcome::Fallback { data, .. } => data,
        }
    }

    /// Failure reason for a fallback, `None` for fetched data.
    pub fn reason(&self) -> Option<&str> {
        match self {
            FetchOutcome::Fetched(_) => None,
            FetchOutcome::Fallback { reason, .. } => Some(reason),
        }
    }
}

/// Trait for report providers.
///
/// Implementations fetch from one source and report failures as `DataError`.
/// The fallback policy sits above this trait; providers don't know about
/// synthetic data.
pub trait ReportProvider {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch the list of listed companies.
    fn fetch_companies(&self) -> Result<Vec<CompanyRecord>, DataError>;

    /// Fetch report records for one symbol covering the last `days_back` days.
    fn fetch_reports(&self, symbol: &str, days_back: u32) -> Result<Vec<RawRecord>, DataError>;
}

impl<P: ReportProvider + ?Sized> ReportProvider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch_companies(&self) -> Result<Vec<CompanyRecord>, DataError> {
        (**self).fetch_companies()
    }

    fn fetch_reports(&self, symbol: &str, days_back: u32) -> Result<Vec<RawRecord>, DataError> {
        (**self).fetch_reports(symbol, days_back)
    }
}

/// Provider used in offline mode: every request fails with `DataError::Offline`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineProvider;

impl ReportProvider for OfflineProvider {
    fn name(&self) -> &str {
        "offline"
    }

    fn fetch_companies(&self) -> Result<Vec<CompanyRecord>, DataError> {
        Err(DataError::Offline)
    }

    fn fetch_reports(&self, _symbol: &str, _days_back: u32) -> Result<Vec<RawRecord>, DataError> {
        Err(DataError::Offline)
    }
}
