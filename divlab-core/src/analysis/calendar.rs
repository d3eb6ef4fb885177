//! Dividend-impact calendar: one row per (date, ticker) with a positive dividend.

use crate::domain::TickerBar;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A dividend day with its price-impact metrics.
///
/// Percentages are `None` when their denominator (open or close) is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividendCalendarRow {
    pub date: NaiveDate,
    pub ticker: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: Option<f64>,
    pub volume: u64,
    pub dividend: f64,
    /// dividend / close * 100
    pub daily_yield: Option<f64>,
    /// (open - close) / open * 100
    pub price_drop_pct: Option<f64>,
    /// open - close
    pub ex_dividend_impact: f64,
    /// (high - low) / open * 100
    pub day_range_pct: Option<f64>,
    /// open - dividend
    pub theoretical_ex_price: f64,
    /// close - theoretical_ex_price
    pub actual_vs_theoretical: f64,
}

fn pct(numerator: f64, denominator: f64) -> Option<f64> {
    (denominator != 0.0).then(|| numerator / denominator * 100.0)
}

/// Build the dividend calendar from a combined multi-ticker table.
///
/// Rows without a positive dividend (including bars that were never enriched)
/// are skipped. Output is sorted by (date, ticker).
pub fn dividend_calendar(rows: &[TickerBar]) -> Vec<DividendCalendarRow> {
    let mut calendar: Vec<DividendCalendarRow> = rows
        .iter()
        .filter_map(|row| {
            let bar = &row.bar;
            let dividend = bar.dividend_or_zero();
            if dividend <= 0.0 {
                return None;
            }
            let theoretical_ex_price = bar.open - dividend;
            Some(DividendCalendarRow {
                date: bar.date,
                ticker: row.ticker.clone(),
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                adj_close: bar.adj_close,
                volume: bar.volume,
                dividend,
                daily_yield: pct(dividend, bar.close),
                price_drop_pct: pct(bar.open - bar.close, bar.open),
                ex_dividend_impact: bar.open - bar.close,
                day_range_pct: pct(bar.high - bar.low, bar.open),
                theoretical_ex_price,
                actual_vs_theoretical: bar.close - theoretical_ex_price,
            })
        })
        .collect();

    calendar.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.ticker.cmp(&b.ticker)));
    calendar
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Bar;

    fn row(ticker: &str, day: u32, open: f64, close: f64, dividend: Option<f64>) -> TickerBar {
        TickerBar {
            ticker: ticker.into(),
            bar: Bar {
                date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                adj_close: None,
                volume: 10,
                dividend,
            },
        }
    }

    #[test]
    fn worked_example_metrics() {
        let rows = vec![row("AAA", 1, 100.0, 98.0, Some(2.0))];
        let cal = dividend_calendar(&rows);
        assert_eq!(cal.len(), 1);
        let r = &cal[0];
        assert!((r.daily_yield.unwrap() - 2.040816).abs() < 1e-4);
        assert!((r.price_drop_pct.unwrap() - 2.0).abs() < 1e-12);
        assert_eq!(r.ex_dividend_impact, 2.0);
        assert!((r.day_range_pct.unwrap() - 4.0).abs() < 1e-12);
        assert_eq!(r.theoretical_ex_price, 98.0);
        assert_eq!(r.actual_vs_theoretical, 0.0);
    }

    #[test]
    fn skips_zero_and_missing_dividends() {
        let rows = vec![
            row("AAA", 1, 100.0, 98.0, Some(0.0)),
            row("AAA", 2, 100.0, 98.0, None),
            row("AAA", 3, 100.0, 98.0, Some(0.3)),
        ];
        let cal = dividend_calendar(&rows);
        assert_eq!(cal.len(), 1);
        assert_eq!(cal[0].date, NaiveDate::from_ymd_opt(2024, 5, 3).unwrap());
    }

    #[test]
    fn sorted_by_date_then_ticker() {
        let rows = vec![
            row("ZZZ", 2, 50.0, 49.0, Some(0.1)),
            row("BBB", 1, 50.0, 49.0, Some(0.1)),
            row("AAA", 2, 50.0, 49.0, Some(0.1)),
        ];
        let cal = dividend_calendar(&rows);
        let keys: Vec<(u32, &str)> = cal
            .iter()
            .map(|r| (chrono::Datelike::day(&r.date), r.ticker.as_str()))
            .collect();
        assert_eq!(keys, vec![(1, "BBB"), (2, "AAA"), (2, "ZZZ")]);
    }

    #[test]
    fn zero_open_leaves_percentages_empty() {
        let rows = vec![row("AAA", 1, 0.0, 1.0, Some(0.1))];
        let cal = dividend_calendar(&rows);
        assert_eq!(cal[0].price_drop_pct, None);
        assert_eq!(cal[0].day_range_pct, None);
        assert!(cal[0].daily_yield.is_some());
    }

    #[test]
    fn empty_input_empty_calendar() {
        assert!(dividend_calendar(&[]).is_empty());
    }
}
