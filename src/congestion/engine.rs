//! Do 拥塞控制引擎
//! The Do congestion control engine
//!
//! 职责：
//! - 串联振荡估算、拥塞检测、窗口控制和重传处理
//! - 每个连接一个实例，不共享任何状态

use super::{
    WindowAction, WindowUpdate,
    detector::{self, DetectionInput},
    history::RttHistory,
    oscillation::OscillationEstimator,
    retransmission::{self, PendingRetransmission},
    window::{ConnectionState, WindowController},
};
use crate::{config::Config, error::Result};
use std::time::Duration;
use tracing::{debug, trace};

/// Per-connection engine state. Opaque to the transport, which only hands it
/// events and its own [`ConnectionState`].
///
/// 每个连接的引擎状态。
#[derive(Debug, Clone)]
pub struct DoEngine {
    estimator: OscillationEstimator,
    window: WindowController,
    pending: PendingRetransmission,
    config: Config,
}

impl DoEngine {
    /// Creates an engine after validating `config`.
    ///
    /// 验证 `config` 后创建引擎。
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_validated_config(config))
    }

    pub(crate) fn with_validated_config(config: Config) -> Self {
        Self {
            estimator: OscillationEstimator::new(&config.history),
            window: WindowController::new(&config),
            pending: PendingRetransmission::default(),
            config,
        }
    }

    /// Handles an ack covering new data and rewrites `conn`'s window.
    ///
    /// If a retransmission is pending, this ack's RTT is not fed to the
    /// estimator and the retransmission handler replaces the normal update.
    /// A zero RTT carries no path information: it never reaches the estimator
    /// and leaves `last_rtt` untouched. Segment counts from the config are
    /// converted to bytes with `conn`'s own segment size.
    ///
    /// 处理覆盖新数据的 ACK 并改写 `conn` 的窗口。
    pub fn on_ack(
        &mut self,
        conn: &mut ConnectionState,
        segments_acked: u32,
        rtt: Duration,
    ) -> WindowUpdate {
        let old_cwnd = conn.cwnd;
        let old_ssthresh = conn.ssthresh;
        if !rtt.is_zero() {
            conn.last_rtt = Some(rtt);
        }

        let action = if self.pending.take() {
            trace!(
                rtt_ms = rtt.as_secs_f64() * 1000.0,
                "Retransmission pending: RTT sample discarded"
            );
            let mean = self.estimator.history().mean();
            WindowAction::Retransmission(retransmission::handle_retransmission(
                conn,
                mean,
                &self.config,
            ))
        } else {
            let oscillation = if rtt.is_zero() {
                trace!("Zero RTT sample ignored");
                self.estimator.frequency()
            } else {
                self.estimator.update(rtt, self.window.congestion_threshold())
            };

            let verdict = detector::detect(
                &DetectionInput {
                    cwnd: conn.cwnd,
                    ssthresh: conn.ssthresh,
                    oscillation,
                    congestion_threshold: self.window.congestion_threshold(),
                    last_rtt: rtt,
                    base_rtt: self.estimator.base_rtt(),
                    history: self.estimator.history(),
                },
                &self.config.detection,
            );

            if verdict.congested() {
                self.window.reduce(conn, &verdict, &self.config);
                WindowAction::Reduce(verdict)
            } else {
                WindowAction::Grow(self.window.grow(conn, oscillation, &self.config))
            }
        };

        trace!(
            segments_acked,
            cwnd = conn.cwnd,
            ssthresh = conn.ssthresh,
            ?action,
            "Ack processed"
        );

        WindowUpdate {
            cwnd: conn.cwnd,
            ssthresh: conn.ssthresh,
            action,
            significant_change: old_cwnd != conn.cwnd || old_ssthresh != conn.ssthresh,
        }
    }

    /// Marks a retransmission for special handling on the next ack.
    ///
    /// 标记一次重传，在下一个 ACK 上进行特殊处理。
    pub fn on_retransmission(&mut self) {
        self.pending.set();
        debug!("Retransmission detected, flagged for the next ack");
    }

    /// The ssthresh a transport should adopt when it handles a loss episode
    /// itself: half the window, never below two segments.
    ///
    /// 传输层自行处理丢包时应采用的 ssthresh。
    pub fn ssthresh_after_loss(&self, conn: &ConnectionState) -> u32 {
        (conn.cwnd / 2).max(conn.segments(2))
    }

    /// Returns the engine to its freshly-constructed state.
    pub fn reset(&mut self) {
        self.estimator.reset(&self.config.history);
        self.window.reset(&self.config);
        self.pending = PendingRetransmission::default();
        debug!("Do engine reset to initial state");
    }

    pub fn base_rtt(&self) -> Option<Duration> {
        self.estimator.base_rtt()
    }

    pub fn oscillation_frequency(&self) -> f64 {
        self.estimator.frequency()
    }

    pub fn congestion_threshold(&self) -> f64 {
        self.window.congestion_threshold()
    }

    pub fn history(&self) -> &RttHistory {
        self.estimator.history()
    }

    pub fn retransmit_pending(&self) -> bool {
        self.pending.is_set()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
