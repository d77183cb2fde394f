use super::super::super::queue::{QueueDescriptor, QueueProvider};
use super::{consumer_tag, AmqpQueueEntry, AmqpSession};
use crate::library::{BoxedError, EmptyResult};
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use lapin::options::{BasicConsumeOptions, QueueDeclareOptions};
use lapin::types::FieldTable;
use lapin::Consumer;
use tracing::{debug, instrument};

/// Queue provider implementation using AMQP queues
#[derive(Clone)]
pub struct AmqpQueueProvider {
    session: AmqpSession,
}

impl AmqpQueueProvider {
    /// Creates a new instance operating on the given session
    pub fn new(session: AmqpSession) -> Self {
        Self { session }
    }

    /// Starts a consumer on the queue. Deliveries have to be settled unless `no_ack` is set.
    pub(super) async fn subscribe(
        &self,
        queue: &QueueDescriptor,
        no_ack: bool,
    ) -> Result<Consumer, BoxedError> {
        let tag = consumer_tag(queue.key());
        debug!(queue = queue.key(), %tag, no_ack, "Starting consumer");

        let consumer = self
            .session
            .channel()
            .basic_consume(
                queue.key(),
                &tag,
                BasicConsumeOptions {
                    no_ack,
                    ..BasicConsumeOptions::default()
                },
                FieldTable::default(),
            )
            .await?;

        Ok(consumer)
    }
}

#[async_trait]
impl QueueProvider for AmqpQueueProvider {
    type Entry = AmqpQueueEntry;

    /// Declares a non-durable, non-exclusive queue which is not deleted automatically
    #[instrument(skip(self), fields(queue = queue.key()))]
    async fn declare(&self, queue: &QueueDescriptor) -> EmptyResult {
        let declared = self
            .session
            .channel()
            .queue_declare(
                queue.key(),
                QueueDeclareOptions::default(),
                FieldTable::default(),
            )
            .await?;

        debug!(messages = declared.message_count(), "Declared queue");
        Ok(())
    }

    async fn consume(
        &self,
        queue: &QueueDescriptor,
    ) -> Result<BoxStream<'static, Result<Self::Entry, BoxedError>>, BoxedError> {
        let stream = self
            .subscribe(queue, false)
            .await?
            .map(|delivery| -> Result<AmqpQueueEntry, BoxedError> {
                Ok(AmqpQueueEntry::new(delivery?))
            })
            .boxed();

        Ok(stream)
    }
}
