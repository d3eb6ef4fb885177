//! Descriptive ticker metadata.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Placeholder shown for metadata fields the source did not provide.
pub const NOT_AVAILABLE: &str = "N/A";

/// Name, listing and classification fields for a ticker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickerInfo {
    pub symbol: String,
    pub long_name: Option<String>,
    pub currency: Option<String>,
    pub exchange: Option<String>,
    pub market_cap: Option<f64>,
    pub sector: Option<String>,
    pub industry: Option<String>,
}

impl TickerInfo {
    /// Label/value pairs for display, with missing fields rendered as `N/A`.
    pub fn display_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("symbol", self.symbol.clone()),
            ("long_name", or_na(&self.long_name)),
            ("currency", or_na(&self.currency)),
            ("exchange", or_na(&self.exchange)),
            ("market_cap", or_na(&self.market_cap)),
            ("sector", or_na(&self.sector)),
            ("industry", or_na(&self.industry)),
        ]
    }
}

fn or_na<T: Display>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
