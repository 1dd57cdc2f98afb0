//! A concurrent table of per-flow congestion controllers.
//!
//! Each flow gets its own controller from the factory; nothing is shared
//! between flows. Events for one flow are applied under that flow's entry
//! lock, so they stay sequential even when several threads feed the table.
//!
//! 每个流的拥塞控制器的并发表。

use crate::{
    congestion::{CongestionControl, CongestionControllerFactory, DoFactory, WindowUpdate},
    error::{Error, Result},
};
use dashmap::{DashMap, mapref::entry::Entry};
use std::{fmt::Debug, hash::Hash, time::Duration};
use tracing::debug;

/// Routes transport events to the controller of each flow.
///
/// 将传输事件路由到每个流的控制器。
pub struct FlowRegistry<K, F = DoFactory>
where
    K: Eq + Hash,
    F: CongestionControllerFactory,
{
    flows: DashMap<K, F::Controller>,
    factory: F,
}

impl<K, F> FlowRegistry<K, F>
where
    K: Eq + Hash + Clone + Debug,
    F: CongestionControllerFactory,
{
    pub fn new(factory: F) -> Self {
        Self {
            flows: DashMap::new(),
            factory,
        }
    }

    /// Attaches a fresh controller to `flow`. Returns `false` if the flow was
    /// already open, in which case its controller is left untouched.
    ///
    /// 为 `flow` 附加一个新的控制器。
    pub fn open(&self, flow: K) -> bool {
        match self.flows.entry(flow) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                debug!(
                    flow = ?vacant.key(),
                    algorithm = self.factory.algorithm_name(),
                    "Flow opened"
                );
                vacant.insert(self.factory.create());
                true
            }
        }
    }

    pub fn on_ack(&self, flow: &K, segments_acked: u32, rtt: Duration) -> Result<WindowUpdate> {
        let mut controller = self.flows.get_mut(flow).ok_or(Error::UnknownFlow)?;
        Ok(controller.on_ack(segments_acked, rtt))
    }

    pub fn on_retransmission(&self, flow: &K) -> Result<()> {
        let mut controller = self.flows.get_mut(flow).ok_or(Error::UnknownFlow)?;
        controller.on_retransmission();
        Ok(())
    }

    /// `(cwnd, ssthresh)` of `flow`.
    pub fn window(&self, flow: &K) -> Option<(u32, u32)> {
        self.flows
            .get(flow)
            .map(|controller| (controller.congestion_window(), controller.slow_start_threshold()))
    }

    pub fn stats(&self, flow: &K) -> Option<<F::Controller as CongestionControl>::Stats> {
        self.flows.get(flow).map(|controller| controller.statistics())
    }

    /// Detaches `flow`, returning its final statistics.
    ///
    /// 分离 `flow`，返回其最终统计信息。
    pub fn close(&self, flow: &K) -> Option<<F::Controller as CongestionControl>::Stats> {
        let (flow, controller) = self.flows.remove(flow)?;
        let stats = controller.statistics();
        debug!(?flow, %stats, "Flow closed");
        Some(stats)
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}
