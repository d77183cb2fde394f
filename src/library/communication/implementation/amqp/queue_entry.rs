use super::super::super::queue::RawQueueEntry;
use super::super::super::request::{RawResponse, ReplyRouting};
use super::super::json::JsonQueueEntry;
use crate::library::EmptyResult;
use async_trait::async_trait;
use lapin::message::Delivery;
use lapin::options::{BasicAckOptions, BasicRejectOptions};
use lapin::types::ShortString;

fn to_owned_string(value: &Option<ShortString>) -> Option<String> {
    value.as_ref().map(|v| v.as_str().to_owned())
}

/// AMQP based implementation of the [`QueueEntry`](crate::library::communication::queue::QueueEntry) trait
pub struct AmqpQueueEntry {
    delivery: Delivery,
}

impl AmqpQueueEntry {
    pub(super) fn new(delivery: Delivery) -> Self {
        Self { delivery }
    }
}

impl From<Delivery> for RawResponse {
    fn from(delivery: Delivery) -> Self {
        Self {
            correlation_id: to_owned_string(delivery.properties.correlation_id()),
            payload: delivery.data,
        }
    }
}

#[async_trait]
impl RawQueueEntry for AmqpQueueEntry {
    fn payload(&self) -> &[u8] {
        &self.delivery.data
    }

    fn reply_routing(&self) -> Option<ReplyRouting> {
        let properties = &self.delivery.properties;

        to_owned_string(properties.reply_to()).map(|reply_to| {
            ReplyRouting::new(reply_to, to_owned_string(properties.correlation_id()))
        })
    }

    /// Acknowledges only this delivery
    async fn acknowledge(&mut self) -> EmptyResult {
        self.delivery
            .acker
            .ack(BasicAckOptions { multiple: false })
            .await?;

        Ok(())
    }

    /// Rejects only this delivery, the broker drops it
    async fn reject(&mut self) -> EmptyResult {
        self.delivery
            .acker
            .reject(BasicRejectOptions { requeue: false })
            .await?;

        Ok(())
    }
}

impl JsonQueueEntry for AmqpQueueEntry {}
