//! Batch orchestrator — sequential multi-ticker fetch with a politeness throttle.

use super::provider::{DateRange, FetchError, FetchOutcome, MarketDataProvider};
use super::throttle::Throttle;
use crate::domain::Bar;
use rand::Rng;
use std::collections::BTreeMap;
use std::io;
use std::time::Duration;
use tracing::{info, warn};

/// Destination for each successful ticker's bars (e.g. one CSV file per ticker).
pub trait BarSink {
    fn persist(&mut self, ticker: &str, bars: &[Bar]) -> io::Result<()>;
}

/// Parameters shared by every ticker in a batch.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub tickers: Vec<String>,
    pub range: DateRange,
    pub include_dividends: bool,
}

/// Outcome of a batch fetch.
///
/// Tickers that failed or returned no data are absent from `bars`.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub bars: BTreeMap<String, Vec<Bar>>,
    pub no_data: Vec<String>,
    pub errors: Vec<(String, FetchError)>,
    pub sink_errors: Vec<(String, io::Error)>,
}

impl BatchResult {
    pub fn succeeded(&self) -> usize {
        self.bars.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.no_data.is_empty() && self.errors.is_empty() && self.sink_errors.is_empty()
    }
}

/// Fetch every ticker in order, sleeping a random throttle delay between requests.
pub fn fetch_batch(
    provider: &dyn MarketDataProvider,
    request: &BatchRequest,
    throttle: &Throttle,
    sink: Option<&mut dyn BarSink>,
) -> BatchResult {
    let mut rng = rand::thread_rng();
    fetch_batch_with(
        provider,
        request,
        throttle,
        &mut rng,
        &mut |delay: Duration| std::thread::sleep(delay),
        sink,
    )
}

/// [`fetch_batch`] with an injectable RNG and pause function.
pub fn fetch_batch_with<R: Rng + ?Sized>(
    provider: &dyn MarketDataProvider,
    request: &BatchRequest,
    throttle: &Throttle,
    rng: &mut R,
    pause: &mut dyn FnMut(Duration),
    mut sink: Option<&mut dyn BarSink>,
) -> BatchResult {
    let total = request.tickers.len();
    let mut result = BatchResult::default();

    for (i, ticker) in request.tickers.iter().enumerate() {
        info!(%ticker, "fetching {}/{total} from {}", i + 1, provider.name());

        match provider.fetch_bars(ticker, &request.range, request.include_dividends) {
            Ok(FetchOutcome::Data(bars)) => {
                if let Some(sink) = sink.as_deref_mut() {
                    if let Err(e) = sink.persist(ticker, &bars) {
                        warn!(%ticker, error = %e, "failed to persist bars");
                        result.sink_errors.push((ticker.clone(), e));
                    }
                }
                info!(%ticker, bars = bars.len(), "fetched");
                result.bars.insert(ticker.clone(), bars);
            }
            Ok(FetchOutcome::NoData) => {
                info!(%ticker, "no data for range");
                result.no_data.push(ticker.clone());
            }
            Err(e) => {
                warn!(%ticker, error = %e, "fetch failed");
                result.errors.push((ticker.clone(), e));
            }
        }

        if i + 1 < total && !throttle.is_disabled() {
            pause(throttle.next_delay(rng));
        }
    }

    info!(
        succeeded = result.succeeded(),
        failed = result.errors.len(),
        no_data = result.no_data.len(),
        total,
        "batch complete"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DividendEvent, SplitEvent, TickerInfo};
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct StubProvider;

    impl MarketDataProvider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        fn fetch_bars(
            &self,
            ticker: &str,
            range: &DateRange,
            _include_dividends: bool,
        ) -> Result<FetchOutcome<Vec<Bar>>, FetchError> {
            match ticker {
                "BAD" => Err(FetchError::NetworkUnreachable("connection refused".into())),
                "EMPTY" => Ok(FetchOutcome::NoData),
                _ => Ok(FetchOutcome::Data(vec![Bar {
                    date: range.start,
                    open: 1.0,
                    high: 1.0,
                    low: 1.0,
                    close: 1.0,
                    adj_close: None,
                    volume: 1,
                    dividend: None,
                }])),
            }
        }

        fn fetch_dividends(
            &self,
            _: &str,
            _: &DateRange,
        ) -> Result<Vec<DividendEvent>, FetchError> {
            Ok(Vec::new())
        }

        fn fetch_splits(&self, _: &str, _: &DateRange) -> Result<Vec<SplitEvent>, FetchError> {
            Ok(Vec::new())
        }

        fn fetch_info(&self, _: &str) -> Option<TickerInfo> {
            None
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        persisted: Vec<String>,
        fail_for: Option<&'static str>,
    }

    impl BarSink for RecordingSink {
        fn persist(&mut self, ticker: &str, _bars: &[Bar]) -> io::Result<()> {
            if self.fail_for == Some(ticker) {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
            }
            self.persisted.push(ticker.to_string());
            Ok(())
        }
    }

    fn request(tickers: &[&str]) -> BatchRequest {
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        BatchRequest {
            tickers: tickers.iter().map(|t| t.to_string()).collect(),
            range: DateRange::new(day, day).unwrap(),
            include_dividends: false,
        }
    }

    fn run(
        tickers: &[&str],
        throttle: Throttle,
        sink: Option<&mut dyn BarSink>,
    ) -> (BatchResult, Vec<Duration>) {
        let mut pauses = Vec::new();
        let mut rng = StdRng::seed_from_u64(3);
        let result = fetch_batch_with(
            &StubProvider,
            &request(tickers),
            &throttle,
            &mut rng,
            &mut |d: Duration| pauses.push(d),
            sink,
        );
        (result, pauses)
    }

    #[test]
    fn failed_ticker_is_absent_and_batch_continues() {
        let (result, _) = run(&["AAA", "BAD", "CCC"], Throttle::disabled(), None);
        let keys: Vec<&str> = result.bars.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["AAA", "CCC"]);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].0, "BAD");
        assert!(!result.all_succeeded());
    }

    #[test]
    fn no_data_ticker_is_absent_but_not_an_error() {
        let (result, _) = run(&["EMPTY", "AAA"], Throttle::disabled(), None);
        assert_eq!(result.succeeded(), 1);
        assert!(result.errors.is_empty());
        assert_eq!(result.no_data, vec!["EMPTY"]);
    }

    #[test]
    fn pauses_between_requests_but_not_after_last() {
        let throttle = Throttle::new(1.0, 2.0).unwrap();
        let (_, pauses) = run(&["AAA", "BAD", "CCC"], throttle, None);
        assert_eq!(pauses.len(), 2);
        for p in pauses {
            assert!(p >= Duration::from_secs(1) && p <= Duration::from_secs(2));
        }
    }

    #[test]
    fn single_ticker_never_pauses() {
        let (_, pauses) = run(&["AAA"], Throttle::new(1.0, 1.0).unwrap(), None);
        assert!(pauses.is_empty());
    }

    #[test]
    fn sink_receives_successful_tickers_only() {
        let mut sink = RecordingSink::default();
        let tickers = ["AAA", "BAD", "EMPTY", "DDD"];
        let (result, _) = run(&tickers, Throttle::disabled(), Some(&mut sink));
        assert_eq!(sink.persisted, vec!["AAA", "DDD"]);
        assert_eq!(result.succeeded(), 2);
    }

    #[test]
    fn sink_failure_keeps_in_memory_entry() {
        let mut sink = RecordingSink {
            fail_for: Some("AAA"),
            ..Default::default()
        };
        let (result, _) = run(&["AAA"], Throttle::disabled(), Some(&mut sink));
        assert!(result.bars.contains_key("AAA"));
        assert_eq!(result.sink_errors.len(), 1);
    }
}
