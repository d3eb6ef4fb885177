//! Market data retrieval: provider trait, Yahoo client, batch orchestration.

pub mod batch;
pub mod config;
pub mod provider;
pub mod throttle;
pub mod yahoo;

pub use batch::{fetch_batch, fetch_batch_with, BarSink, BatchRequest, BatchResult};
pub use config::ClientConfig;
pub use provider::{parse_date, DateRange, FetchError, FetchOutcome, MarketDataProvider};
pub use throttle::{Throttle, ThrottleError};
pub use yahoo::YahooClient;
