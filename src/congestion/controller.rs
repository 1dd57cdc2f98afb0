//! The Do controller: one connection's window plus its engine behind the
//! [`CongestionControl`] seam.
//!
//! Do 控制器：单个连接的窗口及其引擎。

use super::{
    CongestionControl, CongestionControllerFactory, WindowUpdate,
    engine::DoEngine,
    window::ConnectionState,
};
use crate::{config::Config, error::Result};
use std::time::Duration;
use tracing::debug;

const ALGORITHM_NAME: &str = "Do";

/// Owns a [`ConnectionState`] and the [`DoEngine`] that drives it.
///
/// 拥有一个 [`ConnectionState`] 以及驱动它的 [`DoEngine`]。
#[derive(Debug, Clone)]
pub struct DoController {
    conn: ConnectionState,
    engine: DoEngine,
}

impl DoController {
    /// Creates a controller whose window starts at the configured initial
    /// values.
    ///
    /// 创建一个窗口从配置的初始值开始的控制器。
    pub fn new(config: Config) -> Result<Self> {
        let conn = ConnectionState::from_config(&config);
        Ok(Self {
            engine: DoEngine::new(config)?,
            conn,
        })
    }

    /// Creates a controller around an existing window, e.g. when congestion
    /// control is attached to a connection that is already sending.
    ///
    /// The segment size of `conn` overrides the configured one.
    pub fn with_state(mut config: Config, mut conn: ConnectionState) -> Result<Self> {
        config.segment_size = conn.segment_size();
        conn.enforce_floor(conn.min_cwnd(&config));
        Ok(Self {
            engine: DoEngine::new(config)?,
            conn,
        })
    }

    pub fn connection(&self) -> &ConnectionState {
        &self.conn
    }

    pub fn engine(&self) -> &DoEngine {
        &self.engine
    }
}

impl CongestionControl for DoController {
    type Stats = DoStats;

    fn on_ack(&mut self, segments_acked: u32, rtt: Duration) -> WindowUpdate {
        self.engine.on_ack(&mut self.conn, segments_acked, rtt)
    }

    fn on_retransmission(&mut self) {
        self.engine.on_retransmission();
    }

    fn congestion_window(&self) -> u32 {
        self.conn.cwnd
    }

    fn slow_start_threshold(&self) -> u32 {
        self.conn.ssthresh
    }

    fn ssthresh_after_loss(&self) -> u32 {
        self.engine.ssthresh_after_loss(&self.conn)
    }

    fn reset(&mut self) {
        self.engine.reset();
        self.conn = ConnectionState::from_config(self.engine.config());
        debug!(cwnd = self.conn.cwnd, "Do controller reset to initial state");
    }

    fn statistics(&self) -> DoStats {
        let history = self.engine.history();
        DoStats {
            congestion_window: self.conn.cwnd,
            slow_start_threshold: self.conn.ssthresh,
            base_rtt: self.engine.base_rtt(),
            last_rtt: self.conn.last_rtt,
            oscillation_frequency: self.engine.oscillation_frequency(),
            congestion_threshold: self.engine.congestion_threshold(),
            history_len: history.len(),
            history_capacity: history.capacity(),
            retransmit_pending: self.engine.retransmit_pending(),
        }
    }

    fn algorithm_name(&self) -> &'static str {
        ALGORITHM_NAME
    }
}

/// Do congestion control statistics.
///
/// Do 拥塞控制统计信息。
#[derive(Debug, Clone, PartialEq)]
pub struct DoStats {
    pub congestion_window: u32,
    pub slow_start_threshold: u32,
    pub base_rtt: Option<Duration>,
    pub last_rtt: Option<Duration>,
    pub oscillation_frequency: f64,
    pub congestion_threshold: f64,
    pub history_len: usize,
    pub history_capacity: usize,
    pub retransmit_pending: bool,
}

impl std::fmt::Display for DoStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let millis = |rtt: Option<Duration>| rtt.map_or(0.0, |rtt| rtt.as_secs_f64() * 1000.0);
        write!(
            f,
            "Do[cwnd:{}, ssthresh:{}, base_rtt:{:.1}ms, last_rtt:{:.1}ms, osc:{:.6}, thresh:{:.6}, history:{}/{}]",
            self.congestion_window,
            self.slow_start_threshold,
            millis(self.base_rtt),
            millis(self.last_rtt),
            self.oscillation_frequency,
            self.congestion_threshold,
            self.history_len,
            self.history_capacity,
        )
    }
}

/// Hands out a fresh [`DoController`] per flow from one validated config.
///
/// 使用一个已验证的配置为每个流提供一个新的 [`DoController`]。
#[derive(Debug, Clone)]
pub struct DoFactory {
    config: Config,
}

impl DoFactory {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl CongestionControllerFactory for DoFactory {
    type Controller = DoController;

    fn create(&self) -> DoController {
        DoController {
            conn: ConnectionState::from_config(&self.config),
            engine: DoEngine::with_validated_config(self.config.clone()),
        }
    }

    fn algorithm_name(&self) -> &'static str {
        ALGORITHM_NAME
    }
}
