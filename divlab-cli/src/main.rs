//! divlab CLI — Yahoo Finance prices, dividends, splits and ticker metadata.
//!
//! Commands:
//! - `fetch` — batch-download bars, optionally enriched with dividends, and
//!   write the combined table, dividend calendar and statistics
//! - `dividends` / `splits` — list corporate-action events for one ticker
//! - `info` — print descriptive metadata for one ticker
//! - `run` — execute a fetch-and-analyze run from a TOML config file

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use divlab_core::data::{parse_date, ClientConfig, DateRange, MarketDataProvider, YahooClient};
use divlab_core::domain::NOT_AVAILABLE;
use divlab_runner::{run_pipeline, OutputMode, RunConfig, RunReport};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "divlab",
    about = "divlab CLI — Yahoo Finance market data and dividend analysis"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch daily bars for several tickers and analyze their dividends.
    Fetch {
        /// Tickers to fetch (e.g., SPY VTI SCHD).
        #[arg(required = true)]
        tickers: Vec<String>,

        /// Start date (YYYY-MM-DD). Defaults to one year ago.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        /// Attach a dividend column to every bar.
        #[arg(long, default_value_t = false)]
        dividends: bool,

        /// Also write one CSV per ticker.
        #[arg(long, default_value_t = false)]
        csv: bool,

        /// Skip the combined table, calendar and statistics files.
        #[arg(long, default_value_t = false)]
        no_reports: bool,

        /// Output directory for written files.
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Minimum pause between tickers, in seconds.
        #[arg(long, default_value_t = 1.0)]
        min_delay: f64,

        /// Maximum pause between tickers, in seconds.
        #[arg(long, default_value_t = 3.0)]
        max_delay: f64,
    },
    /// List dividend events for a ticker.
    Dividends {
        ticker: String,

        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        end: Option<String>,
    },
    /// List split events for a ticker.
    Splits {
        ticker: String,

        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        end: Option<String>,
    },
    /// Print descriptive metadata for a ticker.
    Info { ticker: String },
    /// Execute a fetch-and-analyze run from a TOML config file.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "divlab=info".into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch {
            tickers,
            start,
            end,
            dividends,
            csv,
            no_reports,
            output_dir,
            min_delay,
            max_delay,
        } => {
            let (start_date, end_date) = resolve_dates(start.as_deref(), end.as_deref())?;
            let config = RunConfig {
                tickers,
                start_date: start_date.to_string(),
                end_date: end_date.to_string(),
                include_dividends: dividends,
                output: if csv {
                    OutputMode::Csv
                } else {
                    OutputMode::InMemory
                },
                output_dir,
                write_reports: !no_reports,
                client: ClientConfig::default().with_delay_range(min_delay, max_delay),
            };
            run_config(&config)
        }
        Commands::Dividends { ticker, start, end } => run_dividends(&ticker, start, end),
        Commands::Splits { ticker, start, end } => run_splits(&ticker, start, end),
        Commands::Info { ticker } => run_info(&ticker),
        Commands::Run { config } => run_config(&RunConfig::from_file(&config)?),
    }
}

fn resolve_dates(start: Option<&str>, end: Option<&str>) -> Result<(NaiveDate, NaiveDate)> {
    let end_date = end
        .map(parse_date)
        .transpose()?
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let start_date = start
        .map(parse_date)
        .transpose()?
        .unwrap_or_else(|| end_date - chrono::Duration::days(365));

    Ok((start_date, end_date))
}

fn resolve_range(start: Option<String>, end: Option<String>) -> Result<DateRange> {
    let (start_date, end_date) = resolve_dates(start.as_deref(), end.as_deref())?;
    Ok(DateRange::new(start_date, end_date)?)
}

fn run_config(config: &RunConfig) -> Result<()> {
    let client = YahooClient::new(config.client.clone())?;
    let report = run_pipeline(config, &client)?;
    print_report(&report);

    if report.batch.bars.is_empty() {
        bail!("no data fetched for any of {} ticker(s)", config.tickers.len());
    }
    Ok(())
}

fn run_dividends(ticker: &str, start: Option<String>, end: Option<String>) -> Result<()> {
    let range = resolve_range(start, end)?;
    let client = YahooClient::new(ClientConfig::default())?;
    let events = client.fetch_dividends(ticker, &range)?;

    if events.is_empty() {
        println!("No dividends for {ticker} between {} and {}.", range.start, range.end);
        return Ok(());
    }

    println!("{:<12} {:>10}", "Date", "Amount");
    println!("{}", "-".repeat(23));
    for event in &events {
        println!("{:<12} {:>10.4}", event.date, event.amount);
    }
    let total: f64 = events.iter().map(|e| e.amount).sum();
    println!("{}", "-".repeat(23));
    println!("{:<12} {:>10.4}", "Total", total);
    Ok(())
}

fn run_splits(ticker: &str, start: Option<String>, end: Option<String>) -> Result<()> {
    let range = resolve_range(start, end)?;
    let client = YahooClient::new(ClientConfig::default())?;
    let events = client.fetch_splits(ticker, &range)?;

    if events.is_empty() {
        println!("No splits for {ticker} between {} and {}.", range.start, range.end);
        return Ok(());
    }

    println!("{:<12} {:<10} {:>8}", "Date", "Ratio", "Factor");
    println!("{}", "-".repeat(32));
    for split in &events {
        println!(
            "{:<12} {:<10} {:>8.4}",
            split.date, split.ratio_text, split.split_factor
        );
    }
    Ok(())
}

fn run_info(ticker: &str) -> Result<()> {
    let client = YahooClient::new(ClientConfig::default())?;
    match client.fetch_info(ticker) {
        Some(info) => {
            for (label, value) in info.display_fields() {
                println!("{label:<12} {value}");
            }
        }
        None => println!("No information available for {ticker} ({NOT_AVAILABLE})."),
    }
    Ok(())
}

fn print_report(report: &RunReport) {
    let batch = &report.batch;
    println!();
    println!("=== Fetch Summary ===");
    println!("Fetched:        {}", batch.succeeded());
    for (ticker, bars) in &batch.bars {
        println!("  {ticker:<8} {} bars", bars.len());
    }
    if !batch.no_data.is_empty() {
        println!("No data:        {}", batch.no_data.join(", "));
    }
    for (ticker, err) in &batch.errors {
        eprintln!("Error for {ticker}: {err}");
    }
    for (ticker, err) in &batch.sink_errors {
        eprintln!("Failed to save {ticker}: {err}");
    }

    if let Some(stats) = &report.stats {
        println!();
        println!("--- Dividends ---");
        println!("Payments:       {}", stats.total_payments);
        println!("Total amount:   {:.4}", stats.total_dividend_amount);
        println!("Average:        {:.4}", stats.avg_dividend_amount);
        println!("Median:         {:.4}", stats.median_dividend_amount);
        if let Some(y) = &stats.daily_yield {
            println!(
                "Daily yield %:  mean {:.4}  max {:.4}  min {:.4}",
                y.mean, y.max, y.min
            );
        }
        if let Some(d) = &stats.price_drop {
            println!(
                "Price drop %:   mean {:.4}  max {:.4}  min {:.4}",
                d.mean, d.max, d.min
            );
        }
        for (ticker, t) in &stats.by_ticker {
            println!(
                "  {ticker:<8} {} payments, total {:.4}, avg {:.4}",
                t.count, t.total_dividend, t.avg_dividend
            );
        }
    }

    if !report.artifacts.is_empty() {
        println!();
        for path in &report.artifacts {
            println!("Wrote: {}", path.display());
        }
    }
    println!();
}
