//! Date-keyed pivot of a combined table with ticker-qualified columns.

use crate::domain::{Bar, TickerBar};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PivotField {
    Open,
    High,
    Low,
    Close,
    Volume,
    Dividend,
    AdjClose,
}

impl PivotField {
    pub fn label(self) -> &'static str {
        match self {
            PivotField::Open => "open",
            PivotField::High => "high",
            PivotField::Low => "low",
            PivotField::Close => "close",
            PivotField::Volume => "volume",
            PivotField::Dividend => "dividend",
            PivotField::AdjClose => "adj_close",
        }
    }

    fn value(self, bar: &Bar) -> Option<f64> {
        match self {
            PivotField::Open => Some(bar.open),
            PivotField::High => Some(bar.high),
            PivotField::Low => Some(bar.low),
            PivotField::Close => Some(bar.close),
            PivotField::Volume => Some(bar.volume as f64),
            PivotField::Dividend => bar.dividend,
            PivotField::AdjClose => bar.adj_close,
        }
    }
}

/// One row per date; one column per (field, ticker).
#[derive(Debug, Clone, Default)]
pub struct PivotTable {
    pub tickers: Vec<String>,
    pub fields: Vec<PivotField>,
    rows: BTreeMap<NaiveDate, BTreeMap<String, Bar>>,
}

impl PivotTable {
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.rows.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column order: field-major, tickers sorted within each field.
    pub fn columns(&self) -> Vec<(PivotField, &str)> {
        self.fields
            .iter()
            .flat_map(|&f| self.tickers.iter().map(move |t| (f, t.as_str())))
            .collect()
    }

    /// Column header such as `close_SPY`.
    pub fn column_name(field: PivotField, ticker: &str) -> String {
        format!("{}_{ticker}", field.label())
    }

    pub fn cell(&self, date: NaiveDate, field: PivotField, ticker: &str) -> Option<f64> {
        self.rows
            .get(&date)
            .and_then(|by_ticker| by_ticker.get(ticker))
            .and_then(|bar| field.value(bar))
    }
}

/// Pivot a combined table by date. The first row seen for a (date, ticker) wins.
///
/// Dividend and adjusted-close columns are included only when some input row
/// carries them.
pub fn pivot_by_date(rows: &[TickerBar]) -> PivotTable {
    let mut tickers = BTreeSet::new();
    let mut table: BTreeMap<NaiveDate, BTreeMap<String, Bar>> = BTreeMap::new();
    let mut has_dividend = false;
    let mut has_adj_close = false;

    for row in rows {
        has_dividend |= row.bar.dividend.is_some();
        has_adj_close |= row.bar.adj_close.is_some();
        tickers.insert(row.ticker.clone());
        table
            .entry(row.bar.date)
            .or_default()
            .entry(row.ticker.clone())
            .or_insert_with(|| row.bar.clone());
    }

    let mut fields = vec![
        PivotField::Open,
        PivotField::High,
        PivotField::Low,
        PivotField::Close,
        PivotField::Volume,
    ];
    if has_dividend {
        fields.push(PivotField::Dividend);
    }
    if has_adj_close {
        fields.push(PivotField::AdjClose);
    }

    PivotTable {
        tickers: tickers.into_iter().collect(),
        fields,
        rows: table,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tb(ticker: &str, day: u32, close: f64) -> TickerBar {
        TickerBar {
            ticker: ticker.into(),
            bar: Bar {
                date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                adj_close: None,
                volume: 100,
                dividend: Some(0.0),
            },
        }
    }

    #[test]
    fn pivots_tickers_into_columns() {
        let rows = vec![tb("BBB", 1, 20.0), tb("AAA", 1, 10.0), tb("AAA", 2, 11.0)];
        let pivot = pivot_by_date(&rows);
        let d1 = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();

        assert_eq!(pivot.len(), 2);
        assert_eq!(pivot.tickers, vec!["AAA", "BBB"]);
        assert!(pivot.fields.contains(&PivotField::Dividend));
        assert!(!pivot.fields.contains(&PivotField::AdjClose));
        assert_eq!(pivot.cell(d1, PivotField::Close, "BBB"), Some(20.0));
        assert_eq!(pivot.cell(d2, PivotField::Close, "BBB"), None);
        assert_eq!(pivot.cell(d2, PivotField::Close, "AAA"), Some(11.0));
    }

    #[test]
    fn first_row_wins_for_duplicate_keys() {
        let rows = vec![tb("AAA", 1, 10.0), tb("AAA", 1, 99.0)];
        let pivot = pivot_by_date(&rows);
        let d1 = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(pivot.cell(d1, PivotField::Close, "AAA"), Some(10.0));
    }

    #[test]
    fn column_names_are_ticker_qualified() {
        let pivot = pivot_by_date(&[tb("SPY", 1, 1.0)]);
        let names: Vec<String> = pivot
            .columns()
            .into_iter()
            .map(|(f, t)| PivotTable::column_name(f, t))
            .collect();
        assert_eq!(
            names,
            vec!["open_SPY", "high_SPY", "low_SPY", "close_SPY", "volume_SPY", "dividend_SPY"]
        );
    }
}
