//! Defines the pluggable congestion control interface and the Do algorithm.
//! 定义了可插拔的拥塞控制接口和 Do 算法。
//!
//! Do watches RTT samples, acknowledgments and retransmissions on one
//! connection and decides on every ack what the congestion window and slow
//! start threshold become. Congestion is declared when any of three signals
//! fires (window past ssthresh, RTT oscillation above an adaptive threshold,
//! RTT far above the path minimum), and the reduction scales with how strong
//! the oscillation is.
//!
//! Do 在单个连接上观察 RTT 样本、确认和重传，并在每个 ACK 上决定拥塞窗口
//! 和慢启动阈值。

use std::time::Duration;

pub mod controller;
pub mod detector;
pub mod engine;
pub mod history;
pub mod oscillation;
pub mod retransmission;
pub mod window;

pub use controller::{DoController, DoFactory, DoStats};
pub use detector::{CongestionVerdict, Signals};
pub use engine::DoEngine;
pub use retransmission::RetransmissionKind;
pub use window::{ConnectionState, GrowthBand};

/// Which path of the engine produced a window update.
///
/// 引擎的哪条路径产生了窗口更新。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowAction {
    /// No congestion: the window grew (or was gently corrected).
    Grow(GrowthBand),
    /// Congestion detected: the window was reduced.
    Reduce(CongestionVerdict),
    /// A pending retransmission was handled instead of the normal update.
    Retransmission(RetransmissionKind),
}

/// The window a transport should use after an ack.
///
/// 传输层在 ACK 之后应使用的窗口。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowUpdate {
    /// New congestion window, in bytes.
    /// 新的拥塞窗口（字节）。
    pub cwnd: u32,
    /// New slow start threshold, in bytes.
    /// 新的慢启动阈值（字节）。
    pub ssthresh: u32,
    pub action: WindowAction,
    /// Whether cwnd or ssthresh changed.
    /// 是否发生了显著变化。
    pub significant_change: bool,
}

/// A trait for congestion control algorithms.
///
/// 拥塞控制算法的 trait。
pub trait CongestionControl: Send + Sync + 'static {
    /// Statistics snapshot type.
    type Stats: std::fmt::Debug + std::fmt::Display + Clone + Send + Sync + 'static;

    /// Called once per ack covering new data.
    ///
    /// 每个覆盖新数据的 ACK 调用一次。
    fn on_ack(&mut self, segments_acked: u32, rtt: Duration) -> WindowUpdate;

    /// Called when the transport retransmits a segment.
    ///
    /// 当传输层重传一个分段时调用。
    fn on_retransmission(&mut self);

    /// Gets the current congestion window in bytes.
    ///
    /// 获取当前的拥塞窗口大小（字节）。
    fn congestion_window(&self) -> u32;

    /// Gets the current slow start threshold in bytes.
    fn slow_start_threshold(&self) -> u32;

    /// The ssthresh to adopt when the transport handles a loss episode itself.
    fn ssthresh_after_loss(&self) -> u32;

    /// Resets the controller to its initial state.
    fn reset(&mut self);

    fn statistics(&self) -> Self::Stats;

    fn algorithm_name(&self) -> &'static str;
}

/// Creates one independent controller per flow.
///
/// 为每个流创建一个独立的控制器。
pub trait CongestionControllerFactory: Send + Sync + 'static {
    type Controller: CongestionControl;

    fn create(&self) -> Self::Controller;

    fn algorithm_name(&self) -> &'static str;
}
