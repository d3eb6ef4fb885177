//! Serializable run configuration.
//!
//! A run is described by a TOML file:
//!
//! ```toml
//! tickers = ["SPY", "VTI"]
//! start_date = "2020-01-01"
//! end_date = "2024-12-31"
//! include_dividends = true
//! output = "csv"
//! output_dir = "out"
//!
//! [client]
//! min_delay_secs = 1.0
//! max_delay_secs = 2.0
//! ```

use divlab_core::data::{BatchRequest, ClientConfig, DateRange, FetchError, Throttle, ThrottleError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config must list at least one ticker")]
    NoTickers,

    #[error("config lists an empty ticker symbol")]
    BlankTicker,

    #[error("invalid date range: {0}")]
    Dates(#[from] FetchError),

    #[error("invalid delay range: {0}")]
    Delay(#[from] ThrottleError),
}

/// Where each ticker's bars go after a successful fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Keep results in memory only.
    #[default]
    InMemory,
    /// Also write `{TICKER}_historical_data.csv` per ticker into `output_dir`.
    Csv,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_true() -> bool {
    true
}

/// Everything needed to reproduce a fetch-and-analyze run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub tickers: Vec<String>,

    /// Inclusive start date, `YYYY-MM-DD`.
    pub start_date: String,

    /// Inclusive end date, `YYYY-MM-DD`.
    pub end_date: String,

    #[serde(default)]
    pub include_dividends: bool,

    #[serde(default)]
    pub output: OutputMode,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Write the combined table, dividend calendar and statistics artifacts.
    #[serde(default = "default_true")]
    pub write_reports: bool,

    #[serde(default)]
    pub client: ClientConfig,
}

impl RunConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tickers.is_empty() {
            return Err(ConfigError::NoTickers);
        }
        if self.tickers.iter().any(|t| t.trim().is_empty()) {
            return Err(ConfigError::BlankTicker);
        }
        self.date_range()?;
        self.throttle()?;
        Ok(())
    }

    pub fn date_range(&self) -> Result<DateRange, FetchError> {
        DateRange::parse(&self.start_date, &self.end_date)
    }

    pub fn throttle(&self) -> Result<Throttle, ThrottleError> {
        Throttle::from_config(&self.client)
    }

    pub fn batch_request(&self) -> Result<BatchRequest, ConfigError> {
        Ok(BatchRequest {
            tickers: self.tickers.iter().map(|t| t.trim().to_string()).collect(),
            range: self.date_range()?,
            include_dividends: self.include_dividends,
        })
    }
}
