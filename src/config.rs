//! 定义了拥塞控制引擎的可配置参数。
//! Defines configurable parameters for the congestion control engine.

use crate::error::{Error, Result};

/// A structure containing all configurable parameters for one flow's
/// congestion controller.
///
/// 包含单个流拥塞控制器所有可配置参数的结构体。
#[derive(Debug, Clone)]
pub struct Config {
    /// Bytes per segment. Constant for the lifetime of a connection.
    /// 每个分段的字节数。在连接的生命周期内保持不变。
    pub segment_size: u32,

    /// Window growth and reduction parameters.
    /// 窗口增长和缩减参数。
    pub window: WindowConfig,

    /// Congestion detection parameters.
    /// 拥塞检测参数。
    pub detection: DetectionConfig,

    /// RTT history parameters.
    /// RTT 历史参数。
    pub history: HistoryConfig,

    /// Reaction to retransmission events.
    /// 重传事件的响应参数。
    pub retransmission: RetransmissionConfig,
}

/// Window growth and reduction parameters.
///
/// 窗口增长和缩减参数。
#[derive(Debug, Clone)]
pub struct WindowConfig {
    /// The initial congestion window, in segments.
    /// 初始拥塞窗口（以分段为单位）。
    pub initial_cwnd_segments: u32,
    /// The initial slow start threshold, in bytes.
    /// 初始慢启动阈值（以字节为单位）。
    pub initial_ssthresh: u32,
    /// Absolute floor for both cwnd and ssthresh, in segments.
    /// cwnd 和 ssthresh 的绝对下限（以分段为单位）。
    pub min_cwnd_segments: u32,
    /// Floor for the window after a congestion reduction, in segments.
    /// 拥塞缩减后窗口的下限（以分段为单位）。
    pub min_segments: u32,
    /// Below this `(cwnd - ssthresh) / segment_size` the window grows by
    /// `growth_segments`.
    pub low_band: f64,
    /// Above this `(cwnd - ssthresh) / segment_size` the window shrinks by one
    /// segment.
    pub high_band: f64,
    /// Segments added per ack while well below ssthresh.
    /// 低于 ssthresh 时每个 ACK 增加的分段数。
    pub growth_segments: u32,
    /// Extra segments added per ack on a path with no RTT oscillation.
    /// 在没有 RTT 振荡的路径上每个 ACK 额外增加的分段数。
    pub quiet_boost_segments: u32,
    /// The smallest multiplicative factor a single congestion reduction may
    /// apply.
    /// 单次拥塞缩减所能应用的最小乘法因子。
    pub reduction_floor: f64,
    /// How strongly severity deepens the reduction: `1 - severity * gain`.
    pub severity_gain: f64,
}

/// Congestion detection parameters.
///
/// 拥塞检测参数。
#[derive(Debug, Clone)]
pub struct DetectionConfig {
    /// Starting value of the adaptive oscillation threshold, in seconds.
    /// 自适应振荡阈值的初始值（秒）。
    pub initial_congestion_threshold: f64,
    /// The adaptive threshold never drops below this.
    pub min_congestion_threshold: f64,
    /// The adaptive threshold never rises above this.
    pub max_congestion_threshold: f64,
    /// A sample above `base_rtt * rtt_multiplier` signals congestion.
    /// 超过 `base_rtt * rtt_multiplier` 的样本表示拥塞。
    pub rtt_multiplier: f64,
    /// Threshold raise per unit of severity after a congestion episode.
    pub threshold_raise_gain: f64,
    /// Cap on the per-episode threshold multiplier.
    pub max_threshold_raise: f64,
    /// Oscillation at or below this value marks the path as quiet.
    /// 振荡值不超过此值时，路径被视为安静。
    pub quiet_oscillation: f64,
    /// Multiplier applied to the threshold on each quiet cycle.
    pub quiet_threshold_decay: f64,
}

/// RTT history parameters.
///
/// RTT 历史参数。
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    pub initial_capacity: usize,
    pub min_capacity: usize,
    pub max_capacity: usize,
    /// Weight step between adjacent samples in the weighted mean. The oldest
    /// sample weighs 1.0.
    /// 加权平均中相邻样本之间的权重步长。最旧的样本权重为 1.0。
    pub weight_increment: f64,
}

/// Reaction to retransmission events.
///
/// 重传事件的响应参数。
#[derive(Debug, Clone)]
pub struct RetransmissionConfig {
    /// ssthresh divisor when the retransmission looks congestive.
    /// 当重传看起来是拥塞性时 ssthresh 的除数。
    pub ssthresh_divisor: f64,
    /// cwnd divisor when the retransmission looks like an isolated loss.
    /// 当重传看起来是孤立丢包时 cwnd 的除数。
    pub gentle_divisor: f64,
    pub ssthresh_floor_segments: u32,
    pub gentle_floor_segments: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            segment_size: 1448,
            window: WindowConfig::default(),
            detection: DetectionConfig::default(),
            history: HistoryConfig::default(),
            retransmission: RetransmissionConfig::default(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            initial_cwnd_segments: 10,
            initial_ssthresh: u32::MAX,
            min_cwnd_segments: 2,
            min_segments: 10,
            low_band: 1.0,
            high_band: 3.0,
            growth_segments: 1,
            quiet_boost_segments: 1,
            reduction_floor: 0.5,
            severity_gain: 0.1,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            initial_congestion_threshold: 0.01, // 10ms
            min_congestion_threshold: 1e-6,
            max_congestion_threshold: 0.05,
            rtt_multiplier: 1.2,
            threshold_raise_gain: 0.1,
            max_threshold_raise: 2.0,
            quiet_oscillation: 0.0,
            quiet_threshold_decay: 0.98,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 30,
            min_capacity: 10,
            max_capacity: 50,
            weight_increment: 0.1,
        }
    }
}

impl Default for RetransmissionConfig {
    fn default() -> Self {
        Self {
            ssthresh_divisor: 2.0,
            gentle_divisor: 1.1, // ~9% decrease
            ssthresh_floor_segments: 2,
            gentle_floor_segments: 10,
        }
    }
}

impl Config {
    /// Checks every parameter against its accepted range.
    ///
    /// 检查每个参数是否在允许的范围内。
    pub fn validate(&self) -> Result<()> {
        if self.segment_size == 0 {
            return Err(Error::invalid("segment_size", "must be positive"));
        }
        self.window.validate()?;
        self.detection.validate()?;
        self.history.validate()?;
        self.retransmission.validate()
    }

    /// The absolute window floor in bytes.
    /// 以字节为单位的绝对窗口下限。
    pub fn min_cwnd(&self) -> u32 {
        self.segments(self.window.min_cwnd_segments)
    }

    /// Converts a segment count to bytes, saturating at `u32::MAX`.
    pub(crate) fn segments(&self, count: u32) -> u32 {
        count.saturating_mul(self.segment_size)
    }
}

impl WindowConfig {
    fn validate(&self) -> Result<()> {
        if self.min_cwnd_segments == 0 {
            return Err(Error::invalid("window.min_cwnd_segments", "must be positive"));
        }
        if self.initial_cwnd_segments < self.min_cwnd_segments {
            return Err(Error::invalid(
                "window.initial_cwnd_segments",
                "must not be below min_cwnd_segments",
            ));
        }
        if self.min_segments < self.min_cwnd_segments {
            return Err(Error::invalid(
                "window.min_segments",
                "must not be below min_cwnd_segments",
            ));
        }
        if !self.low_band.is_finite() || !self.high_band.is_finite() {
            return Err(Error::invalid("window.low_band", "bands must be finite"));
        }
        if self.low_band > self.high_band {
            return Err(Error::invalid("window.low_band", "must not exceed high_band"));
        }
        if !(self.reduction_floor > 0.0 && self.reduction_floor <= 1.0) {
            return Err(Error::invalid("window.reduction_floor", "must be in (0, 1]"));
        }
        if !(self.severity_gain >= 0.0 && self.severity_gain.is_finite()) {
            return Err(Error::invalid("window.severity_gain", "must be finite and >= 0"));
        }
        Ok(())
    }
}

impl DetectionConfig {
    fn validate(&self) -> Result<()> {
        if !(self.min_congestion_threshold > 0.0) {
            return Err(Error::invalid(
                "detection.min_congestion_threshold",
                "must be positive",
            ));
        }
        if !(self.max_congestion_threshold >= self.min_congestion_threshold)
            || !self.max_congestion_threshold.is_finite()
        {
            return Err(Error::invalid(
                "detection.max_congestion_threshold",
                "must be finite and >= min_congestion_threshold",
            ));
        }
        if !(self.initial_congestion_threshold >= self.min_congestion_threshold
            && self.initial_congestion_threshold <= self.max_congestion_threshold)
        {
            return Err(Error::invalid(
                "detection.initial_congestion_threshold",
                "must lie within the threshold bounds",
            ));
        }
        if !(self.rtt_multiplier >= 1.0 && self.rtt_multiplier.is_finite()) {
            return Err(Error::invalid("detection.rtt_multiplier", "must be finite and >= 1"));
        }
        if !(self.threshold_raise_gain >= 0.0 && self.threshold_raise_gain.is_finite()) {
            return Err(Error::invalid(
                "detection.threshold_raise_gain",
                "must be finite and >= 0",
            ));
        }
        if !(self.max_threshold_raise >= 1.0 && self.max_threshold_raise.is_finite()) {
            return Err(Error::invalid(
                "detection.max_threshold_raise",
                "must be finite and >= 1",
            ));
        }
        if !(self.quiet_oscillation >= 0.0) {
            return Err(Error::invalid("detection.quiet_oscillation", "must be >= 0"));
        }
        if !(self.quiet_threshold_decay > 0.0 && self.quiet_threshold_decay <= 1.0) {
            return Err(Error::invalid(
                "detection.quiet_threshold_decay",
                "must be in (0, 1]",
            ));
        }
        Ok(())
    }
}

impl HistoryConfig {
    fn validate(&self) -> Result<()> {
        if self.min_capacity < 2 {
            return Err(Error::invalid("history.min_capacity", "must be at least 2"));
        }
        if self.max_capacity < self.min_capacity {
            return Err(Error::invalid(
                "history.max_capacity",
                "must not be below min_capacity",
            ));
        }
        if self.initial_capacity < self.min_capacity || self.initial_capacity > self.max_capacity
        {
            return Err(Error::invalid(
                "history.initial_capacity",
                "must lie within the capacity bounds",
            ));
        }
        if !(self.weight_increment >= 0.0 && self.weight_increment.is_finite()) {
            return Err(Error::invalid(
                "history.weight_increment",
                "must be finite and >= 0",
            ));
        }
        Ok(())
    }
}

impl RetransmissionConfig {
    fn validate(&self) -> Result<()> {
        if !(self.ssthresh_divisor >= 1.0 && self.ssthresh_divisor.is_finite()) {
            return Err(Error::invalid(
                "retransmission.ssthresh_divisor",
                "must be finite and >= 1",
            ));
        }
        if !(self.gentle_divisor >= 1.0 && self.gentle_divisor.is_finite()) {
            return Err(Error::invalid(
                "retransmission.gentle_divisor",
                "must be finite and >= 1",
            ));
        }
        Ok(())
    }
}
