//! Property tests for the reshaping invariants.
//!
//! Uses proptest to verify:
//! 1. Enrichment — event dates carry their amount, every other bar carries 0
//! 2. Calendar rows — positive dividend, exact ex-price identities, (date, ticker) order
//! 3. Idempotence — the calendar is a pure function of its input
//! 4. Empty laws — no dividends → empty calendar → no statistics

use chrono::NaiveDate;
use divlab_core::analysis::{attach_dividends, dividend_calendar, summarize};
use divlab_core::domain::{Bar, DividendEvent, TickerBar};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};

// ── Strategies (proptest) ────────────────────────────────────────────

fn day(offset: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(offset as u64)
}

fn arb_price() -> impl Strategy<Value = f64> {
    (1.0..500.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_bar(offset: u32) -> impl Strategy<Value = Bar> {
    (arb_price(), arb_price(), 0.0..5.0_f64, 0u64..1_000_000).prop_map(
        move |(open, close, spread, volume)| Bar {
            date: day(offset),
            open,
            high: open.max(close) + spread,
            low: (open.min(close) - spread).max(0.01),
            close,
            adj_close: None,
            volume,
            dividend: None,
        },
    )
}

/// Strictly ascending bars on distinct days.
fn arb_bars() -> impl Strategy<Value = Vec<Bar>> {
    prop::collection::btree_set(0u32..120, 0..40).prop_flat_map(|offsets| {
        offsets
            .into_iter()
            .map(arb_bar)
            .collect::<Vec<_>>()
    })
}

fn arb_dividends() -> impl Strategy<Value = Vec<DividendEvent>> {
    prop::collection::vec((0u32..150, 0.01..5.0_f64), 0..10).prop_map(|v| {
        v.into_iter()
            .map(|(offset, amount)| DividendEvent {
                date: day(offset),
                amount,
            })
            .collect()
    })
}

fn arb_combined() -> impl Strategy<Value = Vec<TickerBar>> {
    let ticker = prop::sample::select(vec!["AAA", "BBB", "CCC"]);
    let dividend = prop_oneof![
        Just(None),
        Just(Some(0.0)),
        (0.01..5.0_f64).prop_map(Some),
    ];
    prop::collection::vec((ticker, 0u32..60, arb_price(), arb_price(), dividend), 0..60).prop_map(
        |rows| {
            rows.into_iter()
                .map(|(ticker, offset, open, close, dividend)| TickerBar {
                    ticker: ticker.to_string(),
                    bar: Bar {
                        date: day(offset),
                        open,
                        high: open.max(close) + 1.0,
                        low: open.min(close) * 0.9,
                        close,
                        adj_close: Some(close),
                        volume: 100,
                        dividend,
                    },
                })
                .collect()
        },
    )
}

// ── 1. Enrichment ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn enrichment_matches_events_by_date(mut bars in arb_bars(), divs in arb_dividends()) {
        let mut first_amount: HashMap<NaiveDate, f64> = HashMap::new();
        for d in &divs {
            first_amount.entry(d.date).or_insert(d.amount);
        }

        attach_dividends(&mut bars, &divs);

        for bar in &bars {
            let expected = first_amount.get(&bar.date).copied().unwrap_or(0.0);
            prop_assert_eq!(bar.dividend, Some(expected));
        }
    }

    #[test]
    fn enrichment_preserves_order_and_uniqueness(mut bars in arb_bars(), divs in arb_dividends()) {
        let before: Vec<NaiveDate> = bars.iter().map(|b| b.date).collect();
        attach_dividends(&mut bars, &divs);
        let after: Vec<NaiveDate> = bars.iter().map(|b| b.date).collect();
        prop_assert_eq!(&before, &after);
        for w in after.windows(2) {
            prop_assert!(w[0] < w[1]);
        }
    }
}

// ── 2. Calendar invariants ───────────────────────────────────────────

proptest! {
    #[test]
    fn calendar_rows_satisfy_identities(rows in arb_combined()) {
        let calendar = dividend_calendar(&rows);

        let expected = rows
            .iter()
            .filter(|r| r.bar.dividend.map_or(false, |d| d > 0.0))
            .count();
        prop_assert_eq!(calendar.len(), expected);

        for row in &calendar {
            prop_assert!(row.dividend > 0.0);
            prop_assert_eq!(row.theoretical_ex_price, row.open - row.dividend);
            prop_assert_eq!(row.actual_vs_theoretical, row.close - row.theoretical_ex_price);
            prop_assert_eq!(row.ex_dividend_impact, row.open - row.close);
        }

        for w in calendar.windows(2) {
            prop_assert!((w[0].date, &w[0].ticker) <= (w[1].date, &w[1].ticker));
        }
    }

    // ── 3. Idempotence ───────────────────────────────────────────────

    #[test]
    fn calendar_is_pure(rows in arb_combined()) {
        prop_assert_eq!(dividend_calendar(&rows), dividend_calendar(&rows));
    }

    #[test]
    fn per_ticker_counts_sum_to_total(rows in arb_combined()) {
        let calendar = dividend_calendar(&rows);
        if let Some(stats) = summarize(&calendar) {
            let counted: usize = stats.by_ticker.values().map(|t| t.count).sum();
            prop_assert_eq!(counted, stats.total_payments);
            let tickers: BTreeSet<&str> = calendar.iter().map(|r| r.ticker.as_str()).collect();
            prop_assert_eq!(stats.by_ticker.len(), tickers.len());
        } else {
            prop_assert!(calendar.is_empty());
        }
    }
}

// ── 4. Empty laws ────────────────────────────────────────────────────

#[test]
fn empty_input_yields_empty_calendar_and_no_stats() {
    let calendar = dividend_calendar(&[]);
    assert!(calendar.is_empty());
    assert!(summarize(&calendar).is_none());
}

#[test]
fn unenriched_bars_never_reach_the_calendar() {
    let rows: Vec<TickerBar> = (0..5)
        .map(|i| TickerBar {
            ticker: "AAA".into(),
            bar: Bar {
                date: day(i),
                open: 10.0,
                high: 11.0,
                low: 9.0,
                close: 10.5,
                adj_close: None,
                volume: 1,
                dividend: None,
            },
        })
        .collect();
    assert!(dividend_calendar(&rows).is_empty());
}
