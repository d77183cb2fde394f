use super::super::super::queue::RawQueueEntry;
use super::super::super::request::{RawResponse, ReplyRouting};
use super::super::json::JsonQueueEntry;
use super::{MemoryDelivery, QueueCounters};
use crate::library::EmptyResult;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
enum MemoryQueueError {
    #[error("queue entry has already been settled")]
    AlreadySettled,
}

/// In-memory implementation of the [`QueueEntry`](crate::library::communication::queue::QueueEntry) trait
pub struct MemoryQueueEntry {
    delivery: MemoryDelivery,
    counters: Arc<QueueCounters>,
    settled: bool,
}

impl MemoryQueueEntry {
    pub(super) fn new(delivery: MemoryDelivery, counters: Arc<QueueCounters>) -> Self {
        Self {
            delivery,
            counters,
            settled: false,
        }
    }

    pub(super) fn into_response(self) -> RawResponse {
        RawResponse {
            correlation_id: self.delivery.correlation_id,
            payload: self.delivery.payload,
        }
    }

    fn settle(&mut self, counter: fn(&QueueCounters) -> &AtomicU64) -> EmptyResult {
        if self.settled {
            return Err(MemoryQueueError::AlreadySettled.into());
        }

        self.settled = true;
        counter(&self.counters).fetch_add(1, Ordering::Relaxed);

        Ok(())
    }
}

#[async_trait]
impl RawQueueEntry for MemoryQueueEntry {
    fn payload(&self) -> &[u8] {
        &self.delivery.payload
    }

    fn reply_routing(&self) -> Option<ReplyRouting> {
        self.delivery.reply_routing()
    }

    async fn acknowledge(&mut self) -> EmptyResult {
        self.settle(|c| &c.acknowledged)
    }

    async fn reject(&mut self) -> EmptyResult {
        self.settle(|c| &c.rejected)
    }
}

impl JsonQueueEntry for MemoryQueueEntry {}
