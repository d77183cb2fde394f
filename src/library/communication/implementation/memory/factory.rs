use super::super::super::queue::{QueueDescriptor, QueueProvider, RawQueueEntry};
use super::super::super::request::ReplyRouter;
use super::super::super::CommunicationFactory;
use super::MemoryBroker;
use crate::library::BoxedError;
use async_trait::async_trait;
use futures::StreamExt;

#[async_trait]
impl CommunicationFactory for MemoryBroker {
    type QueueProvider = MemoryBroker;
    type MessagePublisher = MemoryBroker;
    type ResponsePublisher = MemoryBroker;

    fn queue_provider(&self) -> Self::QueueProvider {
        self.clone()
    }

    fn message_publisher(&self) -> Self::MessagePublisher {
        self.clone()
    }

    fn response_publisher(&self) -> Self::ResponsePublisher {
        self.clone()
    }

    /// Consumes the reply queue, acknowledging every response as soon as it is received
    async fn response_collector(
        &self,
        location: &QueueDescriptor,
    ) -> Result<ReplyRouter, BoxedError> {
        let responses = self
            .consume(location)
            .await?
            .then(|entry| async move {
                let mut entry = entry?;
                entry.acknowledge().await?;

                Ok::<_, BoxedError>(entry.into_response())
            })
            .boxed();

        Ok(ReplyRouter::new(location.key().to_owned(), responses))
    }
}
