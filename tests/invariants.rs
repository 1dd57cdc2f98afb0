//! Invariants that must hold over arbitrary event traces.

pub mod common;

use common::harness::{SEGMENT_SIZE, TraceEvent, controller, init_tracing, random_trace};
use std::time::Duration;
use tcp_do::{CongestionControl, WindowAction};

const MIN_CWND: u32 = 2 * SEGMENT_SIZE;

#[test]
fn test_window_floor_holds_on_random_traces() {
    init_tracing();
    for seed in 0..32 {
        let mut controller = controller();
        for event in random_trace(seed, 500) {
            match event {
                TraceEvent::Ack(rtt) => {
                    let update = controller.on_ack(1, rtt);
                    assert!(update.cwnd >= MIN_CWND, "seed {}: {:?}", seed, update);
                    assert!(update.ssthresh >= MIN_CWND, "seed {}: {:?}", seed, update);
                }
                TraceEvent::Retransmission => controller.on_retransmission(),
            }
        }
    }
}

#[test]
fn test_base_rtt_never_increases() {
    for seed in 100..116 {
        let mut controller = controller();
        let mut previous: Option<Duration> = None;
        for event in random_trace(seed, 400) {
            match event {
                TraceEvent::Ack(rtt) => {
                    controller.on_ack(1, rtt);
                }
                TraceEvent::Retransmission => controller.on_retransmission(),
            }
            let base = controller.engine().base_rtt();
            if let (Some(previous), Some(base)) = (previous, base) {
                assert!(base <= previous, "seed {}: base RTT grew", seed);
            }
            previous = base.or(previous);
        }
    }
}

#[test]
fn test_history_stays_within_capacity_bounds() {
    for seed in 200..216 {
        let mut controller = controller();
        for event in random_trace(seed, 400) {
            match event {
                TraceEvent::Ack(rtt) => {
                    controller.on_ack(1, rtt);
                }
                TraceEvent::Retransmission => controller.on_retransmission(),
            }
            let history = controller.engine().history();
            assert!((10..=50).contains(&history.capacity()));
            assert!(history.len() <= history.capacity());
            assert!(controller.engine().congestion_threshold() > 0.0);
            assert!(controller.engine().oscillation_frequency() >= 0.0);
        }
    }
}

#[test]
fn test_every_retransmission_is_handled_once() {
    for seed in 300..316 {
        let mut controller = controller();
        let mut pending = false;
        for event in random_trace(seed, 400) {
            match event {
                TraceEvent::Ack(rtt) => {
                    let samples = controller.engine().history().len();
                    let capacity = controller.engine().history().capacity();
                    let update = controller.on_ack(1, rtt);
                    let handled = matches!(update.action, WindowAction::Retransmission(_));
                    assert_eq!(handled, pending, "seed {}", seed);
                    if handled {
                        assert_eq!(controller.engine().history().len(), samples);
                        assert_eq!(controller.engine().history().capacity(), capacity);
                    }
                    pending = false;
                }
                TraceEvent::Retransmission => {
                    controller.on_retransmission();
                    pending = true;
                }
            }
        }
    }
}

#[test]
fn test_recovers_after_congestion_episode() {
    let mut controller = controller();
    for _ in 0..10 {
        controller.on_ack(1, Duration::from_millis(50));
    }
    for i in 0..10 {
        let rtt = if i % 2 == 0 { 50 } else { 400 };
        controller.on_ack(1, Duration::from_millis(rtt));
    }
    let congested = controller.congestion_window();

    for _ in 0..100 {
        controller.on_ack(1, Duration::from_millis(50));
    }
    assert!(controller.congestion_window() > congested);
    assert_eq!(controller.engine().oscillation_frequency(), 0.0);
}
