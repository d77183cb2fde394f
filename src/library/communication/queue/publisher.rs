use super::super::request::ReplyRouting;
use super::{Message, QueueDescriptor};
use crate::library::EmptyResult;
use async_trait::async_trait;

/// Structure which allows publishing of serialized data into a queue
#[async_trait]
pub trait RawMessagePublisher {
    /// Sends an opaque payload to a [`Queue`](QueueDescriptor), optionally attaching [`ReplyRouting`] metadata
    async fn publish_raw(
        &self,
        data: &[u8],
        queue: &QueueDescriptor,
        routing: Option<&ReplyRouting>,
    ) -> EmptyResult;
}

/// Publisher for [`Messages`](Message)
#[async_trait]
pub trait MessagePublisher {
    /// Publishes a [`Message`] to its designated queue
    async fn publish<M: Message + Send + Sync>(
        &self,
        message: &M,
        routing: Option<&ReplyRouting>,
    ) -> EmptyResult;
}
