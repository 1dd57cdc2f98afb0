//! 定义了库中所有可能的错误类型。
//! Defines all possible error types in the library.
//!
//! The congestion engine itself never fails: degenerate inputs are corrected
//! locally. Errors only come from the surfaces around it (configuration,
//! flow registry, flow driver).

use thiserror::Error;

/// The primary error type for the congestion control library.
/// 拥塞控制库的主要错误类型。
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// A configuration value is out of its accepted range.
    /// 配置值超出了允许的范围。
    #[error("invalid configuration: `{field}` {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: &'static str,
    },

    /// An event was routed to a flow that is not registered.
    /// 事件被路由到一个未注册的流。
    #[error("unknown flow")]
    UnknownFlow,

    /// The flow driver task has stopped and no longer accepts events.
    /// 流驱动任务已停止，不再接受事件。
    #[error("flow driver is closed")]
    DriverClosed,
}

impl Error {
    pub(crate) fn invalid(field: &'static str, reason: &'static str) -> Self {
        Error::InvalidConfig { field, reason }
    }
}

/// A specialized `Result` type for this library.
/// 本库专用的 `Result` 类型。
pub type Result<T> = std::result::Result<T, Error>;
