use super::super::super::queue::{QueueDescriptor, RawMessagePublisher};
use super::super::super::request::{RawResponsePublisher, ReplyRouting};
use super::super::json::{JsonMessagePublisher, JsonResponsePublisher};
use super::{MemoryBroker, MemoryDelivery};
use crate::library::EmptyResult;
use async_trait::async_trait;

impl JsonMessagePublisher for MemoryBroker {}
impl JsonResponsePublisher for MemoryBroker {}

#[async_trait]
impl RawMessagePublisher for MemoryBroker {
    async fn publish_raw(
        &self,
        data: &[u8],
        queue: &QueueDescriptor,
        routing: Option<&ReplyRouting>,
    ) -> EmptyResult {
        let delivery = MemoryDelivery {
            payload: data.to_vec(),
            reply_to: routing.map(|r| r.reply_to.clone()),
            correlation_id: routing.and_then(|r| r.correlation_id.clone()),
        };

        self.route(queue.key(), delivery);

        Ok(())
    }
}

#[async_trait]
impl RawResponsePublisher for MemoryBroker {
    async fn publish_raw(&self, data: &[u8], routing: &ReplyRouting) -> EmptyResult {
        let delivery = MemoryDelivery {
            payload: data.to_vec(),
            reply_to: None,
            correlation_id: routing.correlation_id.clone(),
        };

        self.route(&routing.reply_to, delivery);

        Ok(())
    }
}
