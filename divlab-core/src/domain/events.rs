//! Corporate action events: cash dividends and stock splits.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A cash dividend, dated on its ex-dividend day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividendEvent {
    pub date: NaiveDate,
    pub amount: f64,
}

/// A stock split.
///
/// `ratio_text` is rendered as `"numerator:denominator"` (e.g. `"4:1"`) and
/// `split_factor` is `numerator / denominator`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitEvent {
    pub date: NaiveDate,
    pub numerator: f64,
    pub denominator: f64,
    pub ratio_text: String,
    pub split_factor: f64,
}

impl SplitEvent {
    /// Build a split from its numerator/denominator pair.
    ///
    /// Returns `None` unless both sides of the ratio are positive.
    pub fn from_ratio(date: NaiveDate, numerator: f64, denominator: f64) -> Option<Self> {
        if denominator <= 0.0 || numerator <= 0.0 {
            return None;
        }
        Some(Self {
            date,
            numerator,
            denominator,
            ratio_text: format!("{numerator}:{denominator}"),
            split_factor: numerator / denominator,
        })
    }
}
