//! Reshaping and analysis over fetched bars.
//!
//! Everything here is a pure function of its input: no I/O, no shared state.

pub mod calendar;
pub mod enrich;
pub mod pivot;
pub mod stats;

pub use calendar::{dividend_calendar, DividendCalendarRow};
pub use enrich::{attach_dividends, combine};
pub use pivot::{pivot_by_date, PivotField, PivotTable};
pub use stats::{summarize, DividendStats, MetricSummary, TickerDividendStats};
