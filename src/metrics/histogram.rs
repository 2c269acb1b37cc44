use std::time::Duration;

use hdrhistogram::Histogram;

use super::types::LatencySummary;

/// Task latencies in microseconds.
#[derive(Debug)]
pub struct LatencyHistogram {
    hist: Histogram<u64>,
    sum_us: u128,
}

impl LatencyHistogram {
    /// Create a new latency histogram.
    ///
    /// # Errors
    ///
    /// Returns an error if the histogram cannot be created.
    pub fn new() -> Result<Self, String> {
        let hist = Histogram::<u64>::new(3)
            .map_err(|err| format!("Failed to create histogram: {}", err))?;
        Ok(Self { hist, sum_us: 0 })
    }

    /// Record one latency.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be recorded.
    pub fn record(&mut self, latency: Duration) -> Result<(), String> {
        let value = u64::try_from(latency.as_micros()).unwrap_or(u64::MAX).max(1);
        self.sum_us = self.sum_us.saturating_add(u128::from(value));
        self.hist
            .record(value)
            .map_err(|err| format!("Failed to record latency: {}", err))
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.hist.len()
    }

    #[must_use]
    pub fn summary(&self) -> Option<LatencySummary> {
        let count = self.count();
        if count == 0 {
            return None;
        }
        let mean_us = self
            .sum_us
            .checked_div(u128::from(count))
            .and_then(|mean| u64::try_from(mean).ok())
            .unwrap_or(u64::MAX);
        Some(LatencySummary {
            min: Duration::from_micros(self.hist.min()),
            mean: Duration::from_micros(mean_us),
            p50: Duration::from_micros(self.hist.value_at_quantile(0.5)),
            p90: Duration::from_micros(self.hist.value_at_quantile(0.9)),
            p99: Duration::from_micros(self.hist.value_at_quantile(0.99)),
            max: Duration::from_micros(self.hist.max()),
        })
    }
}
