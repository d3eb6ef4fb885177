//! Client configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
pub const DEFAULT_SUMMARY_URL: &str = "https://query1.finance.yahoo.com/v10/finance/quoteSummary";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/91.0.4472.124 Safari/537.36";

/// Settings for the Yahoo client and the batch throttle.
///
/// Every field has a default, so a partial TOML table is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the v8 chart endpoint; the ticker is appended as a path segment.
    pub chart_url: String,

    /// Base URL of the v10 quote-summary endpoint.
    pub summary_url: String,

    pub user_agent: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Lower bound of the pause between batch requests, in seconds.
    pub min_delay_secs: f64,

    /// Upper bound of the pause between batch requests, in seconds.
    pub max_delay_secs: f64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            chart_url: DEFAULT_CHART_URL.to_string(),
            summary_url: DEFAULT_SUMMARY_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            min_delay_secs: 1.0,
            max_delay_secs: 3.0,
        }
    }
}

impl ClientConfig {
    /// Point both endpoints at a different host (mock servers, proxies).
    pub fn with_base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.chart_url = format!("{base}/v8/finance/chart");
        self.summary_url = format!("{base}/v10/finance/quoteSummary");
        self
    }

    pub fn with_delay_range(mut self, min_secs: f64, max_secs: f64) -> Self {
        self.min_delay_secs = min_secs;
        self.max_delay_secs = max_secs;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
