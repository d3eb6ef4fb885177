//! Fetch-and-analyze pipeline.
//!
//! Given a [`RunConfig`], fetches every ticker sequentially, combines the
//! results, derives the dividend calendar and its statistics, and writes the
//! configured artifacts.

use std::path::PathBuf;

use anyhow::{Context, Result};
use divlab_core::analysis::{
    combine, dividend_calendar, pivot_by_date, summarize, DividendCalendarRow, DividendStats,
};
use divlab_core::data::{fetch_batch, BarSink, BatchResult, MarketDataProvider};
use tracing::info;

use crate::config::{OutputMode, RunConfig};
use crate::export::{
    write_calendar_csv, write_pivot_csv, write_stats_json, CsvBarSink, CALENDAR_FILE,
    COMBINED_FILE, STATS_FILE,
};

/// Everything a run produced.
#[derive(Debug)]
pub struct RunReport {
    pub batch: BatchResult,
    pub calendar: Vec<DividendCalendarRow>,
    pub stats: Option<DividendStats>,
    /// Files written, in write order.
    pub artifacts: Vec<PathBuf>,
}

/// Run the full pipeline against a provider.
pub fn run_pipeline(config: &RunConfig, provider: &dyn MarketDataProvider) -> Result<RunReport> {
    config.validate().context("invalid run configuration")?;
    let request = config.batch_request()?;
    let throttle = config.throttle()?;

    let mut artifacts = Vec::new();
    let batch = match config.output {
        OutputMode::InMemory => fetch_batch(provider, &request, &throttle, None),
        OutputMode::Csv => {
            let mut sink = CsvBarSink::new(&config.output_dir);
            let batch = fetch_batch(
                provider,
                &request,
                &throttle,
                Some(&mut sink as &mut dyn BarSink),
            );
            artifacts.extend(sink.written().iter().cloned());
            batch
        }
    };

    let combined = combine(&batch.bars);
    let calendar = dividend_calendar(&combined);
    let stats = summarize(&calendar);
    info!(
        rows = combined.len(),
        dividend_days = calendar.len(),
        "analysis complete"
    );

    if config.write_reports && !combined.is_empty() {
        std::fs::create_dir_all(&config.output_dir).with_context(|| {
            format!("failed to create output dir {}", config.output_dir.display())
        })?;

        let path = config.output_dir.join(COMBINED_FILE);
        write_pivot_csv(&path, &pivot_by_date(&combined))?;
        artifacts.push(path);

        if !calendar.is_empty() {
            let path = config.output_dir.join(CALENDAR_FILE);
            write_calendar_csv(&path, &calendar)?;
            artifacts.push(path);
        }

        if let Some(stats) = &stats {
            let path = config.output_dir.join(STATS_FILE);
            write_stats_json(&path, stats)?;
            artifacts.push(path);
        }
    }

    Ok(RunReport {
        batch,
        calendar,
        stats,
        artifacts,
    })
}
