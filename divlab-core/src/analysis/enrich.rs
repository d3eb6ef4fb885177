//! Dividend enrichment and multi-ticker combination.

use crate::domain::{Bar, DividendEvent, TickerBar};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

/// Left-join dividend events onto bars by date.
///
/// Every bar gets a dividend column: the event amount on matching dates, 0
/// elsewhere. Events on dates with no bar are ignored. If the source lists two
/// events on one date, the first is used.
pub fn attach_dividends(bars: &mut [Bar], dividends: &[DividendEvent]) {
    let mut by_date: HashMap<NaiveDate, f64> = HashMap::with_capacity(dividends.len());
    for event in dividends {
        by_date.entry(event.date).or_insert(event.amount);
    }

    for bar in bars.iter_mut() {
        bar.dividend = Some(by_date.get(&bar.date).copied().unwrap_or(0.0));
    }
}

/// Tag each ticker's bars and concatenate them into one combined table.
///
/// Rows keep their per-ticker date order; tickers appear in map order.
pub fn combine(results: &BTreeMap<String, Vec<Bar>>) -> Vec<TickerBar> {
    results
        .iter()
        .flat_map(|(ticker, bars)| {
            bars.iter().map(move |bar| TickerBar {
                ticker: ticker.clone(),
                bar: bar.clone(),
            })
        })
        .collect()
}
