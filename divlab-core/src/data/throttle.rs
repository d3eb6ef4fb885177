//! Politeness throttle for sequential multi-ticker fetches.
//!
//! A uniformly random pause between requests keeps the request rate below the
//! upstream's rate-limit threshold. It is not a concurrency primitive: only
//! one request is ever in flight.

use super::config::ClientConfig;
use rand::Rng;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ThrottleError {
    #[error("delay bounds must be finite and non-negative (got {min}..{max})")]
    InvalidBound { min: f64, max: f64 },

    #[error("minimum delay {min}s exceeds maximum delay {max}s")]
    Reversed { min: f64, max: f64 },

    #[error("maximum delay {max}s does not fit in a Duration")]
    TooLarge { max: f64 },
}

/// Uniform `[min, max]` delay in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Throttle {
    min_secs: f64,
    max_secs: f64,
}

impl Throttle {
    pub fn new(min_secs: f64, max_secs: f64) -> Result<Self, ThrottleError> {
        let valid = |v: f64| v.is_finite() && v >= 0.0;
        if !valid(min_secs) || !valid(max_secs) {
            return Err(ThrottleError::InvalidBound {
                min: min_secs,
                max: max_secs,
            });
        }
        if min_secs > max_secs {
            return Err(ThrottleError::Reversed {
                min: min_secs,
                max: max_secs,
            });
        }
        if Duration::try_from_secs_f64(max_secs).is_err() {
            return Err(ThrottleError::TooLarge { max: max_secs });
        }
        Ok(Self { min_secs, max_secs })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ThrottleError> {
        Self::new(config.min_delay_secs, config.max_delay_secs)
    }

    /// No pause at all.
    pub fn disabled() -> Self {
        Self {
            min_secs: 0.0,
            max_secs: 0.0,
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.max_secs == 0.0
    }

    /// Draw the next pause.
    pub fn next_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.min_secs == self.max_secs {
            return Duration::from_secs_f64(self.min_secs);
        }
        Duration::from_secs_f64(rng.gen_range(self.min_secs..=self.max_secs))
    }
}
