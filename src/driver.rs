//! An async actor that owns one flow's congestion controller.
//!
//! The transport side holds a [`FlowHandle`] and sends ack and retransmission
//! events through a channel; the actor applies them in the order they were
//! sent and publishes the resulting window on a watch channel.
//!
//! 拥有单个流拥塞控制器的异步 actor。

use crate::{
    congestion::{CongestionControl, WindowAction},
    error::{Error, Result},
};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, trace};

const EVENT_CHANNEL_CAPACITY: usize = 128;

/// Events a transport feeds into a flow driver.
///
/// 传输层送入流驱动器的事件。
#[derive(Debug)]
pub enum FlowEvent<S> {
    Ack { segments_acked: u32, rtt: Duration },
    Retransmission,
    Shutdown { response_tx: oneshot::Sender<S> },
}

/// The latest window published by a driver.
///
/// 驱动器发布的最新窗口。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowSnapshot {
    pub cwnd: u32,
    pub ssthresh: u32,
    /// The path taken on the last ack, `None` before the first one.
    pub last_action: Option<WindowAction>,
    /// Acks applied so far.
    pub acks: u64,
}

/// The actor that owns the controller.
///
/// 拥有控制器的 actor。
pub struct FlowDriver<C: CongestionControl> {
    controller: C,
    event_rx: mpsc::Receiver<FlowEvent<C::Stats>>,
    window_tx: watch::Sender<WindowSnapshot>,
    acks: u64,
}

impl<C: CongestionControl> FlowDriver<C> {
    /// Spawns the actor on the current tokio runtime.
    ///
    /// 在当前 tokio 运行时上启动 actor。
    pub fn spawn(controller: C) -> FlowHandle<C::Stats> {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (window_tx, window_rx) = watch::channel(WindowSnapshot {
            cwnd: controller.congestion_window(),
            ssthresh: controller.slow_start_threshold(),
            last_action: None,
            acks: 0,
        });

        debug!(algorithm = controller.algorithm_name(), "Flow driver started");
        let driver = Self {
            controller,
            event_rx,
            window_tx,
            acks: 0,
        };
        tokio::spawn(driver.run());

        FlowHandle {
            event_tx,
            window_rx,
        }
    }

    async fn run(mut self) {
        while let Some(event) = self.event_rx.recv().await {
            match event {
                FlowEvent::Ack {
                    segments_acked,
                    rtt,
                } => {
                    let update = self.controller.on_ack(segments_acked, rtt);
                    self.acks += 1;
                    // Receivers may all be gone; the controller still runs.
                    self.window_tx.send_replace(WindowSnapshot {
                        cwnd: update.cwnd,
                        ssthresh: update.ssthresh,
                        last_action: Some(update.action),
                        acks: self.acks,
                    });
                }
                FlowEvent::Retransmission => {
                    self.controller.on_retransmission();
                }
                FlowEvent::Shutdown { response_tx } => {
                    let stats = self.controller.statistics();
                    debug!(%stats, "Flow driver shutting down");
                    let _ = response_tx.send(stats);
                    return;
                }
            }
        }
        trace!("All flow handles dropped, driver exiting");
    }
}

/// The transport's side of a flow driver.
///
/// 流驱动器的传输层句柄。
#[derive(Debug, Clone)]
pub struct FlowHandle<S> {
    event_tx: mpsc::Sender<FlowEvent<S>>,
    window_rx: watch::Receiver<WindowSnapshot>,
}

impl<S> FlowHandle<S> {
    /// Queues an ack event.
    pub async fn ack(&self, segments_acked: u32, rtt: Duration) -> Result<()> {
        self.send(FlowEvent::Ack {
            segments_acked,
            rtt,
        })
        .await
    }

    /// Queues a retransmission event.
    pub async fn retransmission(&self) -> Result<()> {
        self.send(FlowEvent::Retransmission).await
    }

    /// The most recently published window.
    pub fn window(&self) -> WindowSnapshot {
        *self.window_rx.borrow()
    }

    /// Waits for the next published window.
    ///
    /// 等待下一个发布的窗口。
    pub async fn changed(&mut self) -> Result<WindowSnapshot> {
        self.window_rx
            .changed()
            .await
            .map_err(|_| Error::DriverClosed)?;
        Ok(*self.window_rx.borrow_and_update())
    }

    /// Stops the driver after every event queued before this call, returning
    /// the controller's final statistics.
    ///
    /// 在处理完此调用之前排队的所有事件后停止驱动器。
    pub async fn shutdown(self) -> Result<S> {
        let (response_tx, response_rx) = oneshot::channel();
        self.send(FlowEvent::Shutdown { response_tx }).await?;
        response_rx.await.map_err(|_| Error::DriverClosed)
    }

    async fn send(&self, event: FlowEvent<S>) -> Result<()> {
        self.event_tx
            .send(event)
            .await
            .map_err(|_| Error::DriverClosed)
    }
}
