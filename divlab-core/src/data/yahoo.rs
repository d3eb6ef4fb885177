//! Yahoo Finance client.
//!
//! Fetches daily OHLCV bars, dividend events and split events from Yahoo's v8
//! chart API, and descriptive metadata from the v10 quote-summary API.
//!
//! Yahoo Finance has no official API and is subject to unannounced format
//! changes. Parsing is permissive: rows missing a required price
//! are dropped, unknown fields are ignored, and an empty result set is reported
//! as [`FetchOutcome::NoData`] rather than as an error.

use super::config::ClientConfig;
use super::provider::{DateRange, FetchError, FetchOutcome, MarketDataProvider};
use crate::analysis::enrich::attach_dividends;
use crate::domain::{Bar, DividendEvent, SplitEvent, TickerInfo};
use chrono::{DateTime, NaiveDate};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
    events: Option<ChartEvents>,
}

#[derive(Debug, Default, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

/// `events` section: each map is keyed by the event's Unix timestamp.
#[derive(Debug, Default, Deserialize)]
struct ChartEvents {
    dividends: Option<HashMap<String, DividendPayload>>,
    splits: Option<HashMap<String, SplitPayload>>,
}

#[derive(Debug, Deserialize)]
struct DividendPayload {
    amount: Option<f64>,
    date: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct SplitPayload {
    numerator: Option<f64>,
    denominator: Option<f64>,
    date: Option<i64>,
}

/// Yahoo Finance v10 quote-summary response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResponse {
    quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    result: Option<Vec<SummaryModules>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryModules {
    price: Option<PriceModule>,
    summary_detail: Option<SummaryDetailModule>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceModule {
    long_name: Option<String>,
    currency: Option<String>,
    exchange_name: Option<String>,
    market_cap: Option<RawNumber>,
}

#[derive(Debug, Default, Deserialize)]
struct SummaryDetailModule {
    sector: Option<String>,
    industry: Option<String>,
}

/// Yahoo's `{"raw": 123, "fmt": "123"}` number wrapper.
#[derive(Debug, Default, Deserialize)]
struct RawNumber {
    raw: Option<f64>,
}

/// Event selector for the chart endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EventFilter {
    /// Full price history.
    History,
    /// Dividend events only.
    Dividends,
    /// Split events only.
    Splits,
}

impl EventFilter {
    fn as_param(self) -> &'static str {
        match self {
            EventFilter::History => "history",
            EventFilter::Dividends => "div",
            EventFilter::Splits => "split",
        }
    }

    fn include_adjusted_close(self) -> bool {
        self == EventFilter::History
    }
}

/// Yahoo Finance client holding one reusable HTTP session.
pub struct YahooClient {
    http: reqwest::blocking::Client,
    config: ClientConfig,
}

impl YahooClient {
    pub fn new(config: ClientConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json,text/html;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()
            .map_err(|e| FetchError::ClientBuild(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// Build the chart API URL for a ticker, date range and event selector.
    fn chart_url(
        &self,
        ticker: &str,
        range: &DateRange,
        events: EventFilter,
    ) -> Result<Url, FetchError> {
        let (period1, period2) = range.unix_window();
        endpoint_url(
            &self.config.chart_url,
            ticker,
            &[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", events.as_param().to_string()),
                ("includeAdjustedClose", events.include_adjusted_close().to_string()),
            ],
        )
    }

    fn summary_url(&self, ticker: &str) -> Result<Url, FetchError> {
        endpoint_url(
            &self.config.summary_url,
            ticker,
            &[(
                "modules",
                "price,summaryDetail,defaultKeyStatistics".to_string(),
            )],
        )
    }

    /// GET a URL and decode its JSON body, mapping transport and status failures.
    fn get_json<T: DeserializeOwned>(&self, ticker: &str, url: Url) -> Result<T, FetchError> {
        debug!(%ticker, %url, "requesting");
        let resp = self
            .http
            .get(url)
            .send()
            .map_err(|e| FetchError::NetworkUnreachable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                ticker: ticker.to_string(),
                status: status.as_u16(),
            });
        }

        resp.json::<T>().map_err(|e| FetchError::MalformedResponse {
            ticker: ticker.to_string(),
            reason: e.to_string(),
        })
    }

    /// Fetch the first chart result, or `None` when the result set is empty.
    fn fetch_chart(
        &self,
        ticker: &str,
        range: &DateRange,
        events: EventFilter,
    ) -> Result<Option<ChartData>, FetchError> {
        let ticker = validate_ticker(ticker)?;
        let url = self.chart_url(ticker, range, events)?;
        let resp: ChartResponse = self.get_json(ticker, url)?;

        if let Some(err) = &resp.chart.error {
            debug!(
                %ticker,
                code = err.code.as_deref().unwrap_or(""),
                description = err.description.as_deref().unwrap_or(""),
                "chart API reported an error"
            );
        }

        Ok(resp.chart.result.and_then(|r| r.into_iter().next()))
    }
}

impl MarketDataProvider for YahooClient {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch_bars(
        &self,
        ticker: &str,
        range: &DateRange,
        include_dividends: bool,
    ) -> Result<FetchOutcome<Vec<Bar>>, FetchError> {
        let Some(chart) = self.fetch_chart(ticker, range, EventFilter::History)? else {
            debug!(%ticker, "no chart result");
            return Ok(FetchOutcome::NoData);
        };

        let mut bars = parse_bars(chart);
        if bars.is_empty() {
            return Ok(FetchOutcome::NoData);
        }

        if include_dividends {
            let dividends = self.fetch_dividends(ticker, range).unwrap_or_else(|e| {
                warn!(%ticker, error = %e, "dividend query failed; dividend column defaults to 0");
                Vec::new()
            });
            attach_dividends(&mut bars, &dividends);
        }

        Ok(FetchOutcome::Data(bars))
    }

    fn fetch_dividends(
        &self,
        ticker: &str,
        range: &DateRange,
    ) -> Result<Vec<DividendEvent>, FetchError> {
        let chart = self.fetch_chart(ticker, range, EventFilter::Dividends)?;
        let dividends = chart.map(parse_dividends).unwrap_or_default();
        if dividends.is_empty() {
            debug!(%ticker, "no dividend events");
        }
        Ok(dividends)
    }

    fn fetch_splits(&self, ticker: &str, range: &DateRange) -> Result<Vec<SplitEvent>, FetchError> {
        let chart = self.fetch_chart(ticker, range, EventFilter::Splits)?;
        Ok(chart.map(parse_splits).unwrap_or_default())
    }

    fn fetch_info(&self, ticker: &str) -> Option<TickerInfo> {
        let lookup = validate_ticker(ticker).and_then(|t| {
            let url = self.summary_url(t)?;
            self.get_json::<QuoteSummaryResponse>(t, url)
        });

        match lookup {
            Ok(resp) => {
                let info = resp
                    .quote_summary
                    .result
                    .and_then(|r| r.into_iter().next())
                    .map(|modules| to_ticker_info(ticker, modules));
                if info.is_none() {
                    warn!(%ticker, "quote summary returned no result");
                }
                info
            }
            Err(e) => {
                warn!(%ticker, error = %e, "ticker info unavailable");
                None
            }
        }
    }
}

fn validate_ticker(ticker: &str) -> Result<&str, FetchError> {
    let ticker = ticker.trim();
    if ticker.is_empty() {
        return Err(FetchError::EmptyTicker);
    }
    Ok(ticker)
}

/// Append the ticker as one escaped path segment and add the query pairs.
fn endpoint_url(base: &str, ticker: &str, query: &[(&str, String)]) -> Result<Url, FetchError> {
    let invalid = |reason: String| FetchError::InvalidUrl {
        url: base.to_string(),
        reason,
    };
    let mut url = Url::parse(base).map_err(|e| invalid(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| invalid("base URL cannot carry a path".to_string()))?
        .pop_if_empty()
        .push(ticker);
    url.query_pairs_mut().extend_pairs(query);
    Ok(url)
}

fn timestamp_to_date(ts: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive())
}

/// Parse the parallel timestamp/quote arrays into bars.
///
/// Rows missing any of open/high/low/close are dropped. The result is sorted
/// ascending by date with duplicate dates removed (first row wins).
fn parse_bars(chart: ChartData) -> Vec<Bar> {
    let Some(timestamps) = chart.timestamp else {
        return Vec::new();
    };
    let indicators = chart.indicators.unwrap_or_default();
    let quote = indicators.quote.into_iter().next().unwrap_or_default();
    let adj_closes = indicators
        .adjclose
        .and_then(|v| v.into_iter().next())
        .map(|a| a.adjclose);

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let at = |series: &[Option<f64>]| series.get(i).copied().flatten();
        let (Some(open), Some(high), Some(low), Some(close)) = (
            at(&quote.open),
            at(&quote.high),
            at(&quote.low),
            at(&quote.close),
        ) else {
            continue;
        };
        let Some(date) = timestamp_to_date(ts) else {
            continue;
        };

        bars.push(Bar {
            date,
            open,
            high,
            low,
            close,
            adj_close: adj_closes.as_deref().and_then(at),
            volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
            dividend: None,
        });
    }

    bars.sort_by_key(|b| b.date);
    bars.dedup_by_key(|b| b.date);
    bars
}

/// Resolve an event's date from its map key, falling back to the payload's own field.
fn event_date(key: &str, payload_ts: Option<i64>) -> Option<NaiveDate> {
    key.parse::<i64>()
        .ok()
        .or(payload_ts)
        .and_then(timestamp_to_date)
}

fn parse_dividends(chart: ChartData) -> Vec<DividendEvent> {
    let Some(dividends) = chart.events.and_then(|e| e.dividends) else {
        return Vec::new();
    };

    let mut events: Vec<DividendEvent> = dividends
        .into_iter()
        .filter_map(|(key, payload)| {
            let amount = payload.amount.filter(|a| a.is_finite() && *a > 0.0)?;
            let date = event_date(&key, payload.date)?;
            Some(DividendEvent { date, amount })
        })
        .collect();
    events.sort_by_key(|e| e.date);
    events
}

fn parse_splits(chart: ChartData) -> Vec<SplitEvent> {
    let Some(splits) = chart.events.and_then(|e| e.splits) else {
        return Vec::new();
    };

    let mut events: Vec<SplitEvent> = splits
        .into_iter()
        .filter_map(|(key, payload)| {
            let date = event_date(&key, payload.date)?;
            SplitEvent::from_ratio(date, payload.numerator?, payload.denominator?)
        })
        .collect();
    events.sort_by_key(|e| e.date);
    events
}

fn to_ticker_info(ticker: &str, modules: SummaryModules) -> TickerInfo {
    let price = modules.price.unwrap_or_default();
    let detail = modules.summary_detail.unwrap_or_default();
    TickerInfo {
        symbol: ticker.to_string(),
        long_name: price.long_name,
        currency: price.currency,
        exchange: price.exchange_name,
        market_cap: price.market_cap.and_then(|m| m.raw),
        sector: detail.sector,
        industry: detail.industry,
    }
}
