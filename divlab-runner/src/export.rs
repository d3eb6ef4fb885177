//! Artifact export — CSV tables and the JSON statistics file.
//!
//! Provides the persisted views of a run:
//! - **Per-ticker CSV**: one file of bars per successfully fetched ticker
//! - **Combined CSV**: date-keyed pivot with ticker-qualified columns
//! - **Calendar CSV**: the dividend-impact calendar
//! - **Statistics JSON**: calendar summary statistics
//!
//! Builders return the rendered text; `write_*` helpers put it on disk.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use divlab_core::analysis::{DividendCalendarRow, DividendStats, PivotTable};
use divlab_core::data::BarSink;
use divlab_core::domain::Bar;

pub const COMBINED_FILE: &str = "combined_historical_data.csv";
pub const CALENDAR_FILE: &str = "comprehensive_dividend_calendar.csv";
pub const STATS_FILE: &str = "dividend_statistics.json";

/// File name for a single ticker's bars.
///
/// `None` when the symbol is empty or contains a path separator, so a ticker
/// can never name a file outside the output directory.
pub fn ticker_file_name(ticker: &str) -> Option<String> {
    let escapes = ticker.is_empty() || ticker.contains(['/', '\\', '\0']);
    (!escapes).then(|| format!("{ticker}_historical_data.csv"))
}

fn opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Render one ticker's bars.
///
/// Columns: date, open, high, low, close, volume, then `adj_close` and
/// `dividend` only when at least one bar carries them.
pub fn export_bars_csv(bars: &[Bar]) -> Result<String> {
    let has_adj = bars.iter().any(|b| b.adj_close.is_some());
    let has_div = bars.iter().any(|b| b.dividend.is_some());

    let mut header = vec!["date", "open", "high", "low", "close", "volume"];
    if has_adj {
        header.push("adj_close");
    }
    if has_div {
        header.push("dividend");
    }

    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(&header)?;

    for b in bars {
        let mut record = vec![
            b.date.to_string(),
            b.open.to_string(),
            b.high.to_string(),
            b.low.to_string(),
            b.close.to_string(),
            b.volume.to_string(),
        ];
        if has_adj {
            record.push(opt(b.adj_close));
        }
        if has_div {
            record.push(opt(b.dividend));
        }
        wtr.write_record(&record)?;
    }

    finish(wtr)
}

/// Render the combined table: one row per date, one column per (field, ticker).
pub fn export_pivot_csv(pivot: &PivotTable) -> Result<String> {
    let columns = pivot.columns();

    let mut wtr = csv::Writer::from_writer(vec![]);
    let mut header = vec!["date".to_string()];
    header.extend(columns.iter().map(|&(f, t)| PivotTable::column_name(f, t)));
    wtr.write_record(&header)?;

    for date in pivot.dates() {
        let mut record = vec![date.to_string()];
        record.extend(columns.iter().map(|&(f, t)| opt(pivot.cell(date, f, t))));
        wtr.write_record(&record)?;
    }

    finish(wtr)
}

/// Render the dividend calendar.
///
/// The `adj_close` column is emitted only when some row carries it.
pub fn export_calendar_csv(calendar: &[DividendCalendarRow]) -> Result<String> {
    let has_adj = calendar.iter().any(|r| r.adj_close.is_some());

    let mut header = vec!["date", "ticker", "open", "high", "low", "close"];
    if has_adj {
        header.push("adj_close");
    }
    header.extend([
        "volume",
        "dividend",
        "daily_yield",
        "price_drop_pct",
        "ex_dividend_impact",
        "day_range_pct",
        "theoretical_ex_price",
        "actual_vs_theoretical",
    ]);

    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(&header)?;

    for r in calendar {
        let mut record = vec![
            r.date.to_string(),
            r.ticker.clone(),
            r.open.to_string(),
            r.high.to_string(),
            r.low.to_string(),
            r.close.to_string(),
        ];
        if has_adj {
            record.push(opt(r.adj_close));
        }
        record.extend([
            r.volume.to_string(),
            r.dividend.to_string(),
            opt(r.daily_yield),
            opt(r.price_drop_pct),
            r.ex_dividend_impact.to_string(),
            opt(r.day_range_pct),
            r.theoretical_ex_price.to_string(),
            r.actual_vs_theoretical.to_string(),
        ]);
        wtr.write_record(&record)?;
    }

    finish(wtr)
}

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize statistics to pretty JSON.
pub fn export_stats_json(stats: &DividendStats) -> Result<String> {
    serde_json::to_string_pretty(stats).context("failed to serialize dividend statistics")
}

// ─── File helpers ───────────────────────────────────────────────────

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

pub fn write_bars_csv(path: &Path, bars: &[Bar]) -> Result<()> {
    write_file(path, &export_bars_csv(bars)?)
}

pub fn write_pivot_csv(path: &Path, pivot: &PivotTable) -> Result<()> {
    write_file(path, &export_pivot_csv(pivot)?)
}

pub fn write_calendar_csv(path: &Path, calendar: &[DividendCalendarRow]) -> Result<()> {
    write_file(path, &export_calendar_csv(calendar)?)
}

pub fn write_stats_json(path: &Path, stats: &DividendStats) -> Result<()> {
    write_file(path, &export_stats_json(stats)?)
}

// ─── Per-ticker sink ────────────────────────────────────────────────

/// Batch sink writing `{TICKER}_historical_data.csv` into a directory.
#[derive(Debug)]
pub struct CsvBarSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl CsvBarSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    /// Paths written so far, in fetch order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl BarSink for CsvBarSink {
    fn persist(&mut self, ticker: &str, bars: &[Bar]) -> io::Result<()> {
        let name = ticker_file_name(ticker).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("ticker {ticker:?} cannot be used as a file name"),
            )
        })?;
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(name);
        write_bars_csv(&path, bars).map_err(io::Error::other)?;
        self.written.push(path);
        Ok(())
    }
}
