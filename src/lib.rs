#![deny(clippy::expect_used, clippy::unwrap_used)]

//! The root of the Do congestion control library.
//! Do 拥塞控制库的根。
//!
//! A transport connection feeds [`congestion::DoController`] (or the lower
//! level [`congestion::DoEngine`]) with ack and retransmission events and
//! reads back the congestion window and slow start threshold it should use.

pub mod config;
pub mod error;

pub mod congestion;
pub mod driver;
pub mod registry;

pub use config::Config;
pub use congestion::{
    CongestionControl, CongestionControllerFactory, ConnectionState, DoController, DoEngine,
    DoFactory, DoStats, WindowAction, WindowUpdate,
};
pub use driver::{FlowDriver, FlowHandle, WindowSnapshot};
pub use error::{Error, Result};
pub use registry::FlowRegistry;
