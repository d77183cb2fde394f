use super::ReplyRouting;
use crate::library::EmptyResult;
use async_trait::async_trait;
use serde::Serialize;

/// Structure which allows publishing of raw responses
#[async_trait]
pub trait RawResponsePublisher {
    /// Sends an opaque payload to the reply queue named by the [`ReplyRouting`], carrying over its correlation identifier
    async fn publish_raw(&self, data: &[u8], routing: &ReplyRouting) -> EmptyResult;
}

/// Publisher for responses to [`Requests`](super::Request)
#[async_trait]
pub trait ResponsePublisher {
    /// Sends a response to the reply queue named by the [`ReplyRouting`]
    async fn publish<R: Send + Sync + Serialize>(
        &self,
        response: &R,
        routing: &ReplyRouting,
    ) -> EmptyResult;
}
