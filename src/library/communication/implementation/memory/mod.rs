//! In-process trait implementations which do not require a running broker
//!
//! The [`MemoryBroker`] mimics the parts of an AMQP broker that are used by this crate: named queues
//! which have to be declared before use, publishing through the default exchange (messages for
//! undeclared queues are silently dropped), per-delivery settlement and reply routing metadata.
//! Every clone of a broker operates on the same set of queues.

use super::super::request::{RawResponse, ReplyRouting};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::debug;

mod factory;
mod publisher;
mod queue_entry;
mod queue_provider;

pub use queue_entry::*;
pub use queue_provider::*;

/// Message as it sits in a queue
#[derive(Debug, Clone)]
struct MemoryDelivery {
    payload: Vec<u8>,
    reply_to: Option<String>,
    correlation_id: Option<String>,
}

impl MemoryDelivery {
    fn reply_routing(&self) -> Option<ReplyRouting> {
        self.reply_to
            .as_ref()
            .map(|reply_to| ReplyRouting::new(reply_to.clone(), self.correlation_id.clone()))
    }
}

#[derive(Default)]
struct QueueCounters {
    published: AtomicU64,
    acknowledged: AtomicU64,
    rejected: AtomicU64,
}

/// Snapshot of the counters of one queue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStatistics {
    /// Messages which have been routed into the queue
    pub published: u64,
    /// Deliveries which have been positively acknowledged
    pub acknowledged: u64,
    /// Deliveries which have been rejected
    pub rejected: u64,
}

struct MemoryQueue {
    sender: UnboundedSender<MemoryDelivery>,
    receiver: Arc<tokio::sync::Mutex<UnboundedReceiver<MemoryDelivery>>>,
    counters: Arc<QueueCounters>,
}

impl MemoryQueue {
    fn new() -> Self {
        let (sender, receiver) = unbounded_channel();

        Self {
            sender,
            receiver: Arc::new(tokio::sync::Mutex::new(receiver)),
            counters: Arc::new(QueueCounters::default()),
        }
    }
}

/// Broker living in the memory of the current process
#[derive(Clone, Default)]
pub struct MemoryBroker {
    queues: Arc<Mutex<HashMap<String, MemoryQueue>>>,
}

impl MemoryBroker {
    fn queues(&self) -> MutexGuard<'_, HashMap<String, MemoryQueue>> {
        self.queues.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn route(&self, key: &str, delivery: MemoryDelivery) {
        let queues = self.queues();

        match queues.get(key) {
            Some(queue) => {
                if queue.sender.send(delivery).is_ok() {
                    queue.counters.published.fetch_add(1, Ordering::Relaxed);
                }
            }
            None => debug!(queue = key, "Dropping message for undeclared queue"),
        }
    }

    /// Current counters of a queue, all zero if it has never been declared
    pub fn statistics(&self, key: &str) -> QueueStatistics {
        self.queues()
            .get(key)
            .map(|queue| QueueStatistics {
                published: queue.counters.published.load(Ordering::Relaxed),
                acknowledged: queue.counters.acknowledged.load(Ordering::Relaxed),
                rejected: queue.counters.rejected.load(Ordering::Relaxed),
            })
            .unwrap_or_default()
    }

    /// Removes the next message from a queue without waiting, bypassing any consumer.
    ///
    /// Returns [`None`] when the queue is empty, undeclared or currently being consumed.
    pub fn take_raw(&self, key: &str) -> Option<RawResponse> {
        let receiver = self.queues().get(key)?.receiver.clone();
        let mut receiver = receiver.try_lock().ok()?;
        let delivery = receiver.try_recv().ok()?;

        Some(RawResponse {
            correlation_id: delivery.correlation_id,
            payload: delivery.payload,
        })
    }

    /// Deletes all queues. Active consumers see their streams end once the remaining messages are drained.
    pub fn close(&self) {
        debug!("Closing memory broker");
        self.queues().clear();
    }
}
