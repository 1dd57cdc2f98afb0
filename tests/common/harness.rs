//! tests/common/harness.rs
#![allow(dead_code)]

use rand::{Rng, SeedableRng, rngs::StdRng};
use std::sync::Once;
use std::time::Duration;
use tcp_do::{Config, ConnectionState, DoController};

pub const SEGMENT_SIZE: u32 = 1000;

/// Initializes tracing for tests, ensuring it's only done once.
pub fn init_tracing() {
    static TRACING_INIT: Once = Once::new();
    TRACING_INIT.call_once(|| {
        let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "tcp_do=debug".to_string());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .init();
    });
}

pub fn test_config() -> Config {
    Config {
        segment_size: SEGMENT_SIZE,
        ..Default::default()
    }
}

/// A controller with cwnd = 10 segments and ssthresh = 20 segments.
pub fn controller() -> DoController {
    DoController::with_state(
        test_config(),
        ConnectionState::new(SEGMENT_SIZE, 10 * SEGMENT_SIZE, 20 * SEGMENT_SIZE),
    )
    .unwrap()
}

/// One event of a randomized transport trace.
#[derive(Debug, Clone, Copy)]
pub enum TraceEvent {
    Ack(Duration),
    Retransmission,
}

/// A seeded random trace mixing quiet stretches, RTT spikes and
/// retransmissions.
pub fn random_trace(seed: u64, len: usize) -> Vec<TraceEvent> {
    let mut rng = StdRng::seed_from_u64(seed);
    let base_ms: u64 = rng.random_range(5..80);
    (0..len)
        .map(|_| {
            if rng.random_bool(0.05) {
                TraceEvent::Retransmission
            } else if rng.random_bool(0.1) {
                TraceEvent::Ack(Duration::from_millis(base_ms + rng.random_range(50..800)))
            } else {
                TraceEvent::Ack(Duration::from_millis(base_ms + rng.random_range(0..10)))
            }
        })
        .collect()
}
