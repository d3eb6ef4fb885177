//! Bar — one trading day of market data for a single ticker.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily OHLCV bar.
///
/// `adj_close` is present only when the source returned an adjusted-close
/// series. `dividend` is the enrichment column: `None` when dividend
/// enrichment was not requested, `Some(0.0)` on days without a payout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: Option<f64>,
    pub volume: u64,
    pub dividend: Option<f64>,
}

impl Bar {
    /// Dividend paid on this bar's date, zero when the bar was never enriched.
    pub fn dividend_or_zero(&self) -> f64 {
        self.dividend.unwrap_or(0.0)
    }
}

/// A bar tagged with its ticker — the row type of a combined multi-ticker table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerBar {
    pub ticker: String,
    pub bar: Bar,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar() -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 103.0,
            adj_close: Some(102.5),
            volume: 50_000,
            dividend: None,
        }
    }

    #[test]
    fn dividend_column_defaults_to_zero() {
        let mut bar = sample_bar();
        assert_eq!(bar.dividend_or_zero(), 0.0);

        bar.dividend = Some(0.25);
        assert_eq!(bar.dividend_or_zero(), 0.25);
    }

    #[test]
    fn serializes_missing_columns_as_null() {
        let json = serde_json::to_value(sample_bar()).unwrap();
        assert_eq!(json["date"], "2024-01-02");
        assert_eq!(json["adj_close"], 102.5);
        assert!(json["dividend"].is_null());
    }
}
