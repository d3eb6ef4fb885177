//! Summary statistics over a dividend calendar.

use super::calendar::DividendCalendarRow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mean/max/min of one calendar metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub mean: f64,
    pub max: f64,
    pub min: f64,
}

impl MetricSummary {
    /// `None` when there are no values.
    fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        Some(Self {
            mean: mean(values),
            max,
            min,
        })
    }
}

/// Per-ticker dividend breakdown, rounded to 4 decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerDividendStats {
    pub count: usize,
    pub total_dividend: f64,
    pub avg_dividend: f64,
    pub avg_daily_yield: Option<f64>,
}

/// Calendar-wide dividend statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividendStats {
    pub total_payments: usize,
    pub total_dividend_amount: f64,
    pub avg_dividend_amount: f64,
    pub median_dividend_amount: f64,
    pub daily_yield: Option<MetricSummary>,
    pub price_drop: Option<MetricSummary>,
    pub by_ticker: BTreeMap<String, TickerDividendStats>,
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

/// Summarize a calendar. Returns `None` for an empty calendar.
pub fn summarize(calendar: &[DividendCalendarRow]) -> Option<DividendStats> {
    if calendar.is_empty() {
        return None;
    }

    let dividends: Vec<f64> = calendar.iter().map(|r| r.dividend).collect();
    let yields: Vec<f64> = calendar.iter().filter_map(|r| r.daily_yield).collect();
    let drops: Vec<f64> = calendar.iter().filter_map(|r| r.price_drop_pct).collect();

    let mut grouped: BTreeMap<&str, Vec<&DividendCalendarRow>> = BTreeMap::new();
    for row in calendar {
        grouped.entry(row.ticker.as_str()).or_default().push(row);
    }

    let by_ticker = grouped
        .into_iter()
        .map(|(ticker, rows)| {
            let amounts: Vec<f64> = rows.iter().map(|r| r.dividend).collect();
            let ticker_yields: Vec<f64> = rows.iter().filter_map(|r| r.daily_yield).collect();
            let stats = TickerDividendStats {
                count: rows.len(),
                total_dividend: round4(amounts.iter().sum()),
                avg_dividend: round4(mean(&amounts)),
                avg_daily_yield: (!ticker_yields.is_empty()).then(|| round4(mean(&ticker_yields))),
            };
            (ticker.to_string(), stats)
        })
        .collect();

    Some(DividendStats {
        total_payments: calendar.len(),
        total_dividend_amount: dividends.iter().sum(),
        avg_dividend_amount: mean(&dividends),
        median_dividend_amount: median(&dividends),
        daily_yield: MetricSummary::from_values(&yields),
        price_drop: MetricSummary::from_values(&drops),
        by_ticker,
    })
}
