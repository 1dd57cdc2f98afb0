//! RTT 振荡估算器
//! RTT oscillation estimator
//!
//! 职责：
//! - 维护最小 RTT (base RTT)
//! - 记录 RTT 样本
//! - 计算振荡频率并调整历史窗口大小

use super::history::RttHistory;
use crate::config::HistoryConfig;
use std::time::Duration;
use tracing::trace;

/// Quantifies how far the newest RTT strays from the recent weighted trend.
///
/// The "frequency" is not a rate in Hz: it is the absolute distance, in
/// seconds, between the latest sample and the weighted mean of the history.
///
/// 量化最新 RTT 偏离近期加权趋势的程度。
#[derive(Debug, Clone)]
pub struct OscillationEstimator {
    base_rtt: Option<Duration>,
    frequency: f64,
    history: RttHistory,
    weight_increment: f64,
}

impl OscillationEstimator {
    pub fn new(config: &HistoryConfig) -> Self {
        Self {
            base_rtt: None,
            frequency: 0.0,
            history: RttHistory::new(config),
            weight_increment: config.weight_increment,
        }
    }

    /// Feeds one RTT sample through the estimator.
    ///
    /// `congestion_threshold` decides whether the history window widens
    /// (oscillating path, favor smoothing) or narrows (quiet path, favor
    /// responsiveness).
    ///
    /// 将一个 RTT 样本送入估算器。
    pub fn update(&mut self, rtt: Duration, congestion_threshold: f64) -> f64 {
        self.base_rtt = Some(match self.base_rtt {
            Some(base) => base.min(rtt),
            None => rtt,
        });

        self.history.record(rtt);

        if let Some(deviation) = self.history.weighted_deviation(rtt, self.weight_increment) {
            self.frequency = deviation;
        }

        if self.frequency > congestion_threshold {
            self.history.grow();
        } else {
            self.history.shrink();
        }

        trace!(
            rtt_ms = rtt.as_secs_f64() * 1000.0,
            oscillation = self.frequency,
            threshold = congestion_threshold,
            capacity = self.history.capacity(),
            samples = self.history.len(),
            "Oscillation updated"
        );

        self.frequency
    }

    pub fn base_rtt(&self) -> Option<Duration> {
        self.base_rtt
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn history(&self) -> &RttHistory {
        &self.history
    }

    pub(crate) fn reset(&mut self, config: &HistoryConfig) {
        self.base_rtt = None;
        self.frequency = 0.0;
        self.history.clear(config.initial_capacity);
    }
}
