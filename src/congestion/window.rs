//! 窗口控制器 - 根据拥塞判定调整 cwnd 和 ssthresh
//! Window controller - adjusts cwnd and ssthresh from the congestion verdict
//!
//! 职责：
//! - 拥塞时按严重程度缩减窗口
//! - 非拥塞时按三段规则增长窗口
//! - 维护自适应拥塞阈值

use super::detector::CongestionVerdict;
use crate::config::Config;
use std::time::Duration;
use tracing::{debug, trace};

/// The window variables a transport connection owns and lets the engine
/// rewrite on every ack.
///
/// 传输连接拥有并允许引擎在每个 ACK 上改写的窗口变量。
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionState {
    /// Congestion window, in bytes.
    /// 拥塞窗口（字节）。
    pub cwnd: u32,
    /// Slow start threshold, in bytes.
    /// 慢启动阈值（字节）。
    pub ssthresh: u32,
    /// Most recent RTT sample.
    pub last_rtt: Option<Duration>,
    segment_size: u32,
}

impl ConnectionState {
    pub fn new(segment_size: u32, cwnd: u32, ssthresh: u32) -> Self {
        Self {
            cwnd,
            ssthresh,
            last_rtt: None,
            segment_size,
        }
    }

    /// The initial state described by `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.segment_size,
            config.segments(config.window.initial_cwnd_segments),
            config.window.initial_ssthresh,
        )
    }

    pub fn segment_size(&self) -> u32 {
        self.segment_size
    }

    /// Converts a segment count to bytes in this connection's segment size,
    /// saturating at `u32::MAX`.
    ///
    /// 以本连接的分段大小将分段数转换为字节。
    pub fn segments(&self, count: u32) -> u32 {
        count.saturating_mul(self.segment_size)
    }

    /// The absolute window floor for this connection.
    pub(crate) fn min_cwnd(&self, config: &Config) -> u32 {
        self.segments(config.window.min_cwnd_segments)
    }

    /// `(cwnd - ssthresh) / segment_size`, signed.
    pub fn diff_segments(&self) -> f64 {
        (self.cwnd as f64 - self.ssthresh as f64) / self.segment_size as f64
    }

    /// Raises both variables to at least `floor`.
    pub(crate) fn enforce_floor(&mut self, floor: u32) {
        self.cwnd = self.cwnd.max(floor);
        self.ssthresh = self.ssthresh.max(floor);
    }
}

/// Which growth rule applied on a non-congested ack.
///
/// 非拥塞 ACK 上应用的增长规则。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthBand {
    /// Well below ssthresh: fixed increase.
    Expand,
    /// Drifted far above ssthresh: one segment back.
    Correct,
    /// Close to ssthresh: halve the remaining distance.
    Converge,
}

/// The state machine that turns verdicts into window changes. Owns the
/// adaptive congestion threshold.
///
/// 将判定转换为窗口变化的状态机。拥有自适应拥塞阈值。
#[derive(Debug, Clone)]
pub struct WindowController {
    congestion_threshold: f64,
}

impl WindowController {
    pub fn new(config: &Config) -> Self {
        Self {
            congestion_threshold: config.detection.initial_congestion_threshold,
        }
    }

    pub fn congestion_threshold(&self) -> f64 {
        self.congestion_threshold
    }

    pub(crate) fn reset(&mut self, config: &Config) {
        self.congestion_threshold = config.detection.initial_congestion_threshold;
    }

    /// Shrinks the window in proportion to severity and makes the detector
    /// less eager for the next cycles.
    ///
    /// 按严重程度缩减窗口，并使检测器在接下来的周期内不那么敏感。
    pub fn reduce(
        &mut self,
        conn: &mut ConnectionState,
        verdict: &CongestionVerdict,
        config: &Config,
    ) {
        let factor = reduction_factor(verdict.severity, config);
        let floor = conn.segments(config.window.min_segments);
        let reduced = ((conn.cwnd as f64) * factor) as u32;
        let new_window = reduced.max(floor);

        conn.cwnd = new_window;
        conn.ssthresh = new_window;
        conn.enforce_floor(conn.min_cwnd(config));

        let raise = (1.0 + verdict.severity * config.detection.threshold_raise_gain)
            .min(config.detection.max_threshold_raise);
        self.scale_threshold(raise, config);

        debug!(
            severity = verdict.severity,
            factor,
            delay = verdict.signals.delay,
            oscillation = verdict.signals.oscillation,
            rtt = verdict.signals.rtt,
            new_cwnd = conn.cwnd,
            threshold = self.congestion_threshold,
            "Congestion detected: window reduced"
        );
    }

    /// Grows the window cautiously with the three-band rule, then nudges it
    /// further on a perfectly quiet path.
    ///
    /// 使用三段规则谨慎增长窗口，在完全安静的路径上进一步推动。
    pub fn grow(
        &mut self,
        conn: &mut ConnectionState,
        oscillation: f64,
        config: &Config,
    ) -> GrowthBand {
        let segment = conn.segment_size();
        let diff = conn.diff_segments();

        let band = if diff < config.window.low_band {
            conn.cwnd = conn
                .cwnd
                .saturating_add(conn.segments(config.window.growth_segments));
            GrowthBand::Expand
        } else if diff > config.window.high_band {
            conn.cwnd = conn.cwnd.saturating_sub(segment);
            GrowthBand::Correct
        } else {
            let half_distance = conn.ssthresh.saturating_sub(conn.cwnd) / 2;
            conn.cwnd = conn.cwnd.saturating_add(half_distance);
            GrowthBand::Converge
        };

        if oscillation <= config.detection.quiet_oscillation {
            conn.cwnd = conn
                .cwnd
                .saturating_add(conn.segments(config.window.quiet_boost_segments));
            self.scale_threshold(config.detection.quiet_threshold_decay, config);
            trace!(
                cwnd = conn.cwnd,
                threshold = self.congestion_threshold,
                "Quiet path: extra growth, threshold lowered"
            );
        }

        conn.enforce_floor(conn.min_cwnd(config));

        trace!(
            cwnd = conn.cwnd,
            ssthresh = conn.ssthresh,
            diff,
            oscillation,
            ?band,
            "No congestion: window updated"
        );
        band
    }

    fn scale_threshold(&mut self, factor: f64, config: &Config) {
        self.congestion_threshold = (self.congestion_threshold * factor).clamp(
            config.detection.min_congestion_threshold,
            config.detection.max_congestion_threshold,
        );
    }
}

/// Multiplicative reduction for a given severity. Non-increasing in severity
/// and never below the configured floor.
///
/// 给定严重程度的乘法缩减因子。
pub fn reduction_factor(severity: f64, config: &Config) -> f64 {
    (1.0 - severity * config.window.severity_gain).clamp(config.window.reduction_floor, 1.0)
}
