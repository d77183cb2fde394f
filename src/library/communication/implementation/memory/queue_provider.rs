use super::super::super::queue::{QueueDescriptor, QueueProvider};
use super::{MemoryBroker, MemoryDelivery, MemoryQueue, MemoryQueueEntry};
use crate::library::{BoxedError, EmptyResult};
use async_trait::async_trait;
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, instrument};

/// Errors raised by the in-memory [`QueueProvider`]
#[derive(Debug, Error)]
pub enum MemoryQueueProviderError {
    /// Consumption of a queue that has not been declared
    #[error("queue {0} has not been declared")]
    UndeclaredQueue(String),
}

#[async_trait]
impl QueueProvider for MemoryBroker {
    type Entry = MemoryQueueEntry;

    #[instrument(skip(self), fields(queue = queue.key()))]
    async fn declare(&self, queue: &QueueDescriptor) -> EmptyResult {
        self.queues()
            .entry(queue.key().to_owned())
            .or_insert_with(|| {
                debug!("Creating queue");
                MemoryQueue::new()
            });

        Ok(())
    }

    /// Streams the messages of a declared queue. Only one consumer receives messages at any given time.
    async fn consume(
        &self,
        queue: &QueueDescriptor,
    ) -> Result<BoxStream<'static, Result<Self::Entry, BoxedError>>, BoxedError> {
        let (receiver, counters) = {
            let queues = self.queues();
            let declared = queues
                .get(queue.key())
                .ok_or_else(|| MemoryQueueProviderError::UndeclaredQueue(queue.key().to_owned()))?;

            (declared.receiver.clone(), declared.counters.clone())
        };

        let stream = stream::unfold(receiver, |receiver| async move {
            let delivery = next_delivery(&receiver).await?;
            Some((delivery, receiver))
        })
        .map(move |delivery| Ok(MemoryQueueEntry::new(delivery, counters.clone())))
        .boxed();

        Ok(stream)
    }
}

async fn next_delivery(
    receiver: &Arc<tokio::sync::Mutex<UnboundedReceiver<MemoryDelivery>>>,
) -> Option<MemoryDelivery> {
    receiver.lock().await.recv().await
}

#[cfg(test)]
mod does {
    use super::super::super::super::queue::{RawMessagePublisher, RawQueueEntry};
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn deliver_published_messages_in_order() {
        let broker = MemoryBroker::default();
        let queue = QueueDescriptor::new("ordered");

        broker.declare(&queue).await.unwrap();
        RawMessagePublisher::publish_raw(&broker, b"1", &queue, None)
            .await
            .unwrap();
        RawMessagePublisher::publish_raw(&broker, b"2", &queue, None)
            .await
            .unwrap();

        let entries = broker
            .consume(&queue)
            .await
            .unwrap()
            .take(2)
            .map(|entry| entry.unwrap().payload().to_vec())
            .collect::<Vec<_>>()
            .await;

        assert_eq!(entries, vec![b"1".to_vec(), b"2".to_vec()]);
        assert_eq!(broker.statistics("ordered").published, 2);
    }

    #[tokio::test]
    async fn drop_messages_for_undeclared_queues() {
        let broker = MemoryBroker::default();
        let queue = QueueDescriptor::new("nowhere");

        RawMessagePublisher::publish_raw(&broker, b"lost", &queue, None)
            .await
            .unwrap();
        broker.declare(&queue).await.unwrap();

        assert!(broker.take_raw("nowhere").is_none());
        assert_eq!(broker.statistics("nowhere").published, 0);
    }

    #[tokio::test]
    async fn refuse_consumption_of_undeclared_queue() {
        let broker = MemoryBroker::default();
        assert!(broker
            .consume(&QueueDescriptor::new("missing"))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn end_streams_when_closed() {
        let broker = MemoryBroker::default();
        let queue = QueueDescriptor::new("closing");

        broker.declare(&queue).await.unwrap();
        let stream = broker.consume(&queue).await.unwrap();
        broker.close();

        assert_eq!(stream.count().await, 0);
    }
}
