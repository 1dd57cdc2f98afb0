//! A bounded FIFO history of RTT samples whose capacity adapts at runtime.
//! 一个有界的 RTT 样本 FIFO 历史，其容量在运行时自适应调整。

use crate::config::HistoryConfig;
use std::collections::VecDeque;
use std::time::Duration;

/// Recent RTT samples, most recent last.
///
/// 最近的 RTT 样本，最新的在最后。
#[derive(Debug, Clone)]
pub struct RttHistory {
    samples: VecDeque<Duration>,
    capacity: usize,
    min_capacity: usize,
    max_capacity: usize,
}

impl RttHistory {
    pub fn new(config: &HistoryConfig) -> Self {
        Self {
            samples: VecDeque::with_capacity(config.max_capacity),
            capacity: config.initial_capacity,
            min_capacity: config.min_capacity,
            max_capacity: config.max_capacity,
        }
    }

    /// Appends a sample, evicting the oldest ones while over capacity.
    ///
    /// 追加一个样本，超出容量时淘汰最旧的样本。
    pub fn record(&mut self, rtt: Duration) {
        self.samples.push_back(rtt);
        self.evict();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterates from the oldest sample to the most recent one.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Duration> + ExactSizeIterator {
        self.samples.iter()
    }

    /// Widens the window by one sample, up to the maximum.
    pub(crate) fn grow(&mut self) {
        self.capacity = (self.capacity + 1).min(self.max_capacity);
    }

    /// Narrows the window by one sample, down to the minimum. Samples beyond
    /// the new capacity are dropped oldest first.
    pub(crate) fn shrink(&mut self) {
        self.capacity = self.capacity.saturating_sub(1).max(self.min_capacity);
        self.evict();
    }

    pub(crate) fn clear(&mut self, initial_capacity: usize) {
        self.samples.clear();
        self.capacity = initial_capacity.clamp(self.min_capacity, self.max_capacity);
    }

    fn evict(&mut self) {
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// Arithmetic mean of the stored samples, in seconds.
    ///
    /// 存储样本的算术平均值（秒）。
    pub fn mean(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        let sum: f64 = self.samples.iter().map(Duration::as_secs_f64).sum();
        Some(sum / self.samples.len() as f64)
    }

    /// Population standard deviation of the stored samples, in seconds.
    /// Needs at least two samples.
    pub fn std_dev(&self) -> Option<f64> {
        if self.samples.len() < 2 {
            return None;
        }
        let mean = self.mean()?;
        let variance = self
            .samples
            .iter()
            .map(|rtt| {
                let delta = rtt.as_secs_f64() - mean;
                delta * delta
            })
            .sum::<f64>()
            / self.samples.len() as f64;
        Some(variance.sqrt())
    }

    /// `mean + 2 * std_dev`, the bound above which a sample is an outlier.
    ///
    /// `mean + 2 * std_dev`，超过此界限的样本被视为异常值。
    pub fn dynamic_bound(&self) -> Option<f64> {
        Some(self.mean()? + 2.0 * self.std_dev()?)
    }

    /// Distance between `rtt` and the weighted mean of the history, in seconds.
    ///
    /// Weights ramp linearly from 1.0 on the oldest sample by `increment` per
    /// step, so the most recent sample weighs the most. The deviations are
    /// summed rather than the raw values so a flat history yields exactly 0.
    /// Needs at least two samples.
    ///
    /// `rtt` 与历史加权平均值之间的距离（秒）。
    pub fn weighted_deviation(&self, rtt: Duration, increment: f64) -> Option<f64> {
        if self.samples.len() < 2 {
            return None;
        }
        let current = rtt.as_secs_f64();
        let mut weight = 1.0;
        let mut weighted_sum = 0.0;
        let mut weight_total = 0.0;
        for sample in &self.samples {
            weighted_sum += weight * (current - sample.as_secs_f64());
            weight_total += weight;
            weight += increment;
        }
        Some((weighted_sum / weight_total).abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn history(initial: usize) -> RttHistory {
        RttHistory::new(&HistoryConfig {
            initial_capacity: initial,
            ..Default::default()
        })
    }

    fn assert_f64_eq(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "Floats not equal: {} vs {}", a, b);
    }

    #[test]
    fn test_fifo_eviction() {
        let mut history = history(10);
        for i in 1..=12 {
            history.record(ms(i));
        }
        assert_eq!(history.len(), 10);
        assert_eq!(history.iter().next(), Some(&ms(3)));
        assert_eq!(history.iter().last(), Some(&ms(12)));
    }

    #[test]
    fn test_capacity_bounds() {
        let mut history = history(10);
        history.shrink();
        assert_eq!(history.capacity(), 10);

        for _ in 0..100 {
            history.grow();
        }
        assert_eq!(history.capacity(), 50);
    }

    #[test]
    fn test_shrink_trims_oldest() {
        let mut history = history(12);
        for i in 1..=12 {
            history.record(ms(i));
        }
        history.shrink();
        assert_eq!(history.capacity(), 11);
        assert_eq!(history.len(), 11);
        assert_eq!(history.iter().next(), Some(&ms(2)));
    }

    #[test]
    fn test_not_available_below_two_samples() {
        let mut history = history(10);
        assert!(history.mean().is_none());
        assert!(history.weighted_deviation(ms(50), 0.1).is_none());

        history.record(ms(50));
        assert_f64_eq(history.mean().unwrap_or_default(), 0.05);
        assert!(history.std_dev().is_none());
        assert!(history.weighted_deviation(ms(50), 0.1).is_none());
    }

    #[test]
    fn test_flat_history_has_zero_deviation() {
        let mut history = history(30);
        for _ in 0..30 {
            history.record(ms(37));
        }
        assert_eq!(history.weighted_deviation(ms(37), 0.1), Some(0.0));
        assert_f64_eq(history.std_dev().unwrap_or(1.0), 0.0);
    }

    #[test]
    fn test_weighted_deviation_favors_recent_samples() {
        let mut history = history(10);
        history.record(ms(100));
        history.record(ms(200));

        // weights 1.0 (100ms) and 1.1 (200ms): mean = (0.1 + 0.22) / 2.1
        let mean = (0.1 + 0.22) / 2.1;
        let deviation = history.weighted_deviation(ms(200), 0.1).unwrap_or_default();
        assert_f64_eq(deviation, 0.2 - mean);
        // The mean leans towards the newer 200ms sample.
        assert!(mean > 0.15);
    }

    #[test]
    fn test_dynamic_bound() {
        let mut history = history(10);
        history.record(ms(40));
        history.record(ms(60));
        // mean 50ms, population std dev 10ms
        assert_f64_eq(history.dynamic_bound().unwrap_or_default(), 0.07);
    }
}
