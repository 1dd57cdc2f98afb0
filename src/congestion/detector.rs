//! Multi-signal congestion detection.
//! 多信号拥塞检测。
//!
//! Three independent signals are evaluated and OR-ed: any one of them is
//! enough to declare congestion.

use super::history::RttHistory;
use crate::config::DetectionConfig;
use std::time::Duration;

/// Denominator floor for the severity ratio.
const SEVERITY_EPSILON: f64 = 1e-9;

/// Inputs the detector reads for one decision.
///
/// 检测器在一次决策中读取的输入。
#[derive(Debug, Clone, Copy)]
pub struct DetectionInput<'a> {
    pub cwnd: u32,
    pub ssthresh: u32,
    pub oscillation: f64,
    pub congestion_threshold: f64,
    pub last_rtt: Duration,
    pub base_rtt: Option<Duration>,
    pub history: &'a RttHistory,
}

/// Which signals fired.
///
/// 触发了哪些信号。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Signals {
    /// The window has grown past the last known safe operating point.
    pub delay: bool,
    /// RTT oscillation exceeds the adaptive threshold.
    pub oscillation: bool,
    /// The latest RTT is far above the path's propagation delay.
    pub rtt: bool,
}

impl Signals {
    pub fn any(&self) -> bool {
        self.delay || self.oscillation || self.rtt
    }
}

/// The detector's verdict for one ack.
///
/// 检测器对一个 ACK 的判定结果。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CongestionVerdict {
    pub signals: Signals,
    /// `oscillation / congestion_threshold`. Unitless, scales the reaction.
    pub severity: f64,
}

impl CongestionVerdict {
    pub fn congested(&self) -> bool {
        self.signals.any()
    }
}

/// Delay-based signal: `cwnd > ssthresh`.
pub fn delay_signal(cwnd: u32, ssthresh: u32) -> bool {
    cwnd > ssthresh
}

/// Oscillation-based signal: `oscillation > threshold`.
pub fn oscillation_signal(oscillation: f64, congestion_threshold: f64) -> bool {
    oscillation > congestion_threshold
}

/// Absolute-RTT signal.
///
/// Compares against `base_rtt * multiplier` when the base RTT is known, and
/// falls back to the history's `mean + 2σ` bound otherwise. With neither
/// available the signal stays quiet.
///
/// The fallback only serves callers of [`detect`] that hold samples but no
/// base RTT yet. [`DoEngine`](super::DoEngine) sets the base RTT before it
/// detects, so on that path the base comparison always applies.
///
/// 绝对 RTT 信号。
pub fn rtt_signal(
    last_rtt: Duration,
    base_rtt: Option<Duration>,
    history: &RttHistory,
    multiplier: f64,
) -> bool {
    let last = last_rtt.as_secs_f64();
    match base_rtt {
        Some(base) => last > base.as_secs_f64() * multiplier,
        None => history.dynamic_bound().is_some_and(|bound| last > bound),
    }
}

/// `oscillation / threshold` with the denominator kept away from zero.
pub fn severity(oscillation: f64, congestion_threshold: f64) -> f64 {
    oscillation / congestion_threshold.max(SEVERITY_EPSILON)
}

/// Combines the three signals into one verdict.
///
/// 将三个信号合并为一个判定。
pub fn detect(input: &DetectionInput<'_>, config: &DetectionConfig) -> CongestionVerdict {
    let signals = Signals {
        delay: delay_signal(input.cwnd, input.ssthresh),
        oscillation: oscillation_signal(input.oscillation, input.congestion_threshold),
        rtt: rtt_signal(
            input.last_rtt,
            input.base_rtt,
            input.history,
            config.rtt_multiplier,
        ),
    };
    CongestionVerdict {
        signals,
        severity: severity(input.oscillation, input.congestion_threshold),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HistoryConfig;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn input(history: &RttHistory) -> DetectionInput<'_> {
        DetectionInput {
            cwnd: 10,
            ssthresh: 20,
            oscillation: 0.0,
            congestion_threshold: 0.01,
            last_rtt: ms(50),
            base_rtt: Some(ms(50)),
            history,
        }
    }

    #[test]
    fn test_quiet_path_not_congested() {
        let history = RttHistory::new(&HistoryConfig::default());
        let verdict = detect(&input(&history), &DetectionConfig::default());
        assert!(!verdict.congested());
        assert_eq!(verdict.severity, 0.0);
    }

    #[test]
    fn test_each_signal_alone_is_sufficient() {
        let history = RttHistory::new(&HistoryConfig::default());
        let config = DetectionConfig::default();

        let mut delay = input(&history);
        delay.cwnd = 21;
        let verdict = detect(&delay, &config);
        assert!(verdict.congested());
        assert_eq!(
            verdict.signals,
            Signals {
                delay: true,
                ..Default::default()
            }
        );

        let mut oscillation = input(&history);
        oscillation.oscillation = 0.02;
        let verdict = detect(&oscillation, &config);
        assert!(verdict.signals.oscillation && !verdict.signals.delay && !verdict.signals.rtt);
        assert!((verdict.severity - 2.0).abs() < 1e-9);

        let mut rtt = input(&history);
        rtt.last_rtt = ms(61);
        let verdict = detect(&rtt, &config);
        assert!(verdict.signals.rtt && !verdict.signals.delay && !verdict.signals.oscillation);
    }

    #[test]
    fn test_rtt_signal_multiplier_boundary() {
        let history = RttHistory::new(&HistoryConfig::default());
        assert!(!rtt_signal(ms(60), Some(ms(50)), &history, 1.2));
        assert!(rtt_signal(ms(61), Some(ms(50)), &history, 1.2));
    }

    #[test]
    fn test_rtt_signal_falls_back_to_dynamic_bound() {
        let mut history = RttHistory::new(&HistoryConfig::default());
        assert!(!rtt_signal(ms(500), None, &history, 1.2));

        history.record(ms(40));
        history.record(ms(60));
        // bound = 50ms + 2 * 10ms
        assert!(!rtt_signal(ms(70), None, &history, 1.2));
        assert!(rtt_signal(ms(71), None, &history, 1.2));
    }

    #[test]
    fn test_severity_guards_zero_threshold() {
        let severity = severity(0.5, 0.0);
        assert!(severity.is_finite());
        assert!(severity > 0.0);
    }
}
