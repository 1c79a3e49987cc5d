//! Randomized request pacing.
//!
//! Every request to the search provider is separated by a random pause drawn
//! uniformly from a configured range. The pause cannot be configured away:
//! `Pacing::new` rejects a zero lower bound.

use crate::error::{Result, ScrapeError};
use rand::{Rng, rng};
use std::fmt;
use std::time::Duration as StdDuration;
use tokio::time::sleep;
use tracing::debug;

/// A closed range of pause durations.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    min: StdDuration,
    max: StdDuration,
}

impl Pacing {
    /// Build a pacing range.
    ///
    /// # Errors
    ///
    /// [`ScrapeError::Config`] if `min` is zero or greater than `max`.
    pub fn new(min: StdDuration, max: StdDuration) -> Result<Self> {
        if min.is_zero() {
            return Err(ScrapeError::Config(
                "pacing delay must be greater than zero".to_string(),
            ));
        }
        if min > max {
            return Err(ScrapeError::Config(format!(
                "pacing range is inverted: {min:?} > {max:?}"
            )));
        }
        Ok(Self { min, max })
    }

    /// Build a pacing range from fractional seconds, as written in config files.
    pub fn from_secs_f64(min: f64, max: f64) -> Result<Self> {
        let to_duration = |secs: f64| {
            StdDuration::try_from_secs_f64(secs)
                .map_err(|e| ScrapeError::Config(format!("bad pacing value {secs}: {e}")))
        };
        Self::new(to_duration(min)?, to_duration(max)?)
    }

    /// Draw one pause length from the range.
    pub fn sample(&self) -> StdDuration {
        let min_us = (self.min.as_micros() as u64).max(1);
        let max_us = self.max.as_micros() as u64;
        StdDuration::from_micros(rng().random_range(min_us..=max_us.max(min_us)))
    }

    /// Sleep for one randomly drawn pause.
    pub async fn pause(&self) {
        let delay = self.sample();
        debug!(?delay, "Pacing pause");
        sleep(delay).await;
    }
}

impl fmt::Debug for Pacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pacing({:?}..={:?})", self.min, self.max)
    }
}
