//! Reaction to retransmission events.
//! 重传事件的响应。

use super::window::ConnectionState;
use crate::config::Config;
use tracing::debug;

/// How a retransmission was classified.
///
/// 重传的分类方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetransmissionKind {
    /// The RTT was above the history mean: the loss came from queueing.
    /// RTT 高于历史均值：丢包源于排队。
    Congestive,
    /// The RTT was normal: an isolated loss.
    /// RTT 正常：孤立丢包。
    Isolated,
}

/// A single-slot pending retransmission event. Setting it twice before it is
/// consumed still yields one event.
///
/// 单槽的待处理重传事件。
#[derive(Debug, Clone, Default)]
pub struct PendingRetransmission {
    pending: bool,
}

impl PendingRetransmission {
    pub fn set(&mut self) {
        self.pending = true;
    }

    pub fn is_set(&self) -> bool {
        self.pending
    }

    /// Consumes the event, returning whether one was pending.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

/// Adjusts the window after a retransmission.
///
/// `history_mean` is the mean of the stored RTT history in seconds; without
/// one the retransmission is conservatively treated as congestive.
///
/// 重传后调整窗口。
pub fn handle_retransmission(
    conn: &mut ConnectionState,
    history_mean: Option<f64>,
    config: &Config,
) -> RetransmissionKind {
    let last_rtt = conn.last_rtt.map(|rtt| rtt.as_secs_f64());
    let is_congestive = match (last_rtt, history_mean) {
        (Some(last), Some(mean)) => last > mean,
        _ => true,
    };

    let kind = if is_congestive {
        let floor = conn.segments(config.retransmission.ssthresh_floor_segments);
        let reduced = (conn.ssthresh as f64 / config.retransmission.ssthresh_divisor) as u32;
        conn.ssthresh = reduced.max(floor);
        conn.cwnd = conn.ssthresh;
        RetransmissionKind::Congestive
    } else {
        let floor = conn.segments(config.retransmission.gentle_floor_segments);
        let reduced = (conn.cwnd as f64 / config.retransmission.gentle_divisor) as u32;
        conn.cwnd = reduced.max(floor);
        RetransmissionKind::Isolated
    };

    conn.enforce_floor(conn.min_cwnd(config));

    debug!(
        ?kind,
        last_rtt = ?conn.last_rtt,
        history_mean,
        new_cwnd = conn.cwnd,
        new_ssthresh = conn.ssthresh,
        "Retransmission handled"
    );
    kind
}
