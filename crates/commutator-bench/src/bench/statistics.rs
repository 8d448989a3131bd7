//! Timing statistics with a warm-up window.

#![allow(clippy::cast_precision_loss)]

use std::time::Duration;

/// Summary of the retained timing samples, in seconds.
///
/// With no retained samples every field except `count` is NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (`n − 1`); zero for a single sample.
    pub stddev: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
}

impl Statistics {
    /// Column names, in [`Statistics::values`] order.
    pub const COLUMNS: [&'static str; 6] = ["count", "mean", "stddev", "min", "max", "median"];

    /// Summarise `samples` (seconds).
    pub fn from_seconds(samples: &[f64]) -> Self {
        let n = samples.len();
        if n == 0 {
            return Self {
                count: 0,
                mean: f64::NAN,
                stddev: f64::NAN,
                min: f64::NAN,
                max: f64::NAN,
                median: f64::NAN,
            };
        }

        let mean = samples.iter().sum::<f64>() / n as f64;
        let stddev = if n < 2 {
            0.0
        } else {
            let ss: f64 = samples.iter().map(|s| (s - mean) * (s - mean)).sum();
            (ss / (n - 1) as f64).sqrt()
        };

        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);
        let median = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        };

        Self {
            count: n,
            mean,
            stddev,
            min: sorted[0],
            max: sorted[n - 1],
            median,
        }
    }

    /// Values as reported, count first.
    pub fn values(&self) -> [f64; 6] {
        [
            self.count as f64,
            self.mean,
            self.stddev,
            self.min,
            self.max,
            self.median,
        ]
    }
}

/// Collects per-call timings, dropping the first `warmup_runs`.
#[derive(Debug, Clone)]
pub struct StatisticsAggregator {
    warmup_runs: usize,
    seen: usize,
    samples: Vec<f64>,
}

impl StatisticsAggregator {
    /// Aggregator expecting `overall_runs` samples of which the first
    /// `warmup_runs` are discarded.
    pub fn new(overall_runs: usize, warmup_runs: usize) -> Self {
        Self {
            warmup_runs,
            seen: 0,
            samples: Vec::with_capacity(overall_runs.saturating_sub(warmup_runs)),
        }
    }

    /// Record one sample.
    pub fn add(&mut self, elapsed: Duration) {
        self.seen += 1;
        if self.seen > self.warmup_runs {
            self.samples.push(elapsed.as_secs_f64());
        }
    }

    /// Samples recorded so far, discarded ones included.
    pub fn seen(&self) -> usize {
        self.seen
    }

    /// Retained samples in seconds.
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Summarise the retained samples.
    pub fn finish(self) -> Statistics {
        Statistics::from_seconds(&self.samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(x: u64) -> Duration {
        Duration::from_millis(x)
    }

    #[test]
    fn test_warmup_samples_are_discarded() {
        let mut agg = StatisticsAggregator::new(6, 2);
        for x in [100, 90, 1, 2, 3, 4] {
            agg.add(ms(x));
        }
        assert_eq!(agg.seen(), 6);
        let stats = agg.finish();

        assert_eq!(stats.count, 4);
        assert!((stats.mean - 0.0025).abs() < 1e-12);
        assert!((stats.min - 0.001).abs() < 1e-12);
        assert!((stats.max - 0.004).abs() < 1e-12);
        assert!((stats.median - 0.0025).abs() < 1e-12);
        // sample stddev of 1,2,3,4 ms
        let expected = (5.0f64 / 3.0).sqrt() * 1e-3;
        assert!((stats.stddev - expected).abs() < 1e-12);
    }

    #[test]
    fn test_single_sample_has_zero_stddev() {
        let stats = Statistics::from_seconds(&[0.5]);
        assert_eq!(stats.count, 1);
        assert_eq!(stats.stddev, 0.0);
        assert_eq!(stats.median, 0.5);
    }

    #[test]
    fn test_no_samples_is_nan() {
        let stats = StatisticsAggregator::new(3, 3).finish();
        assert_eq!(stats.count, 0);
        assert!(stats.mean.is_nan());
    }

    #[test]
    fn test_odd_median() {
        let stats = Statistics::from_seconds(&[3.0, 1.0, 2.0]);
        assert_eq!(stats.median, 2.0);
    }
}
