//! Data provider trait and structured error types.
//!
//! The MarketDataProvider trait abstracts over the upstream source so the
//! batch orchestrator can be driven by the Yahoo client or by a stub in tests.

use crate::domain::{Bar, DividendEvent, SplitEvent, TickerInfo};
use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

/// Date format accepted for range endpoints.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Transport and parse failures.
///
/// Absence of data is not an error: see [`FetchOutcome::NoData`].
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid date '{input}': expected YYYY-MM-DD")]
    InvalidDate { input: String },

    #[error("invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("ticker symbol must not be empty")]
    EmptyTicker,

    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("HTTP {status} for {ticker}")]
    HttpStatus { ticker: String, status: u16 },

    #[error("malformed response for {ticker}: {reason}")]
    MalformedResponse { ticker: String, reason: String },

    #[error("invalid endpoint URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
}

/// Successful outcome of a bar fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
    /// The source returned rows.
    Data(T),
    /// The source reported an empty result set for the ticker/range.
    NoData,
}

impl<T> FetchOutcome<T> {
    pub fn into_data(self) -> Option<T> {
        match self {
            FetchOutcome::Data(data) => Some(data),
            FetchOutcome::NoData => None,
        }
    }
}

/// Inclusive calendar date range for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, FetchError> {
        if start > end {
            return Err(FetchError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parse `YYYY-MM-DD` endpoints.
    pub fn parse(start: &str, end: &str) -> Result<Self, FetchError> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    /// Unix-timestamp window covering both endpoint days in full (UTC).
    pub fn unix_window(&self) -> (i64, i64) {
        let start = self.start.and_time(NaiveTime::MIN).and_utc().timestamp();
        // end of day: the next midnight minus one second
        let end = self.end.and_time(NaiveTime::MIN).and_utc().timestamp() + 86_399;
        (start, end)
    }
}

/// Parse a single `YYYY-MM-DD` date.
pub fn parse_date(input: &str) -> Result<NaiveDate, FetchError> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).map_err(|_| FetchError::InvalidDate {
        input: input.to_string(),
    })
}

/// Trait for market data sources.
///
/// Implementations own their transport; callers never see HTTP details.
pub trait MarketDataProvider {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily bars, optionally enriched with a dividend column.
    fn fetch_bars(
        &self,
        ticker: &str,
        range: &DateRange,
        include_dividends: bool,
    ) -> Result<FetchOutcome<Vec<Bar>>, FetchError>;

    /// Fetch dividend events, ascending by date. Empty when there are none.
    fn fetch_dividends(
        &self,
        ticker: &str,
        range: &DateRange,
    ) -> Result<Vec<DividendEvent>, FetchError>;

    /// Fetch split events, ascending by date. Empty when there are none.
    fn fetch_splits(&self, ticker: &str, range: &DateRange) -> Result<Vec<SplitEvent>, FetchError>;

    /// Look up descriptive metadata. `None` when unavailable for any reason.
    fn fetch_info(&self, ticker: &str) -> Option<TickerInfo>;
}
