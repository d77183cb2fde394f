use super::super::super::queue::QueueDescriptor;
use super::super::super::request::{RawResponse, ReplyRouter};
use super::super::super::CommunicationFactory;
use super::{AmqpPublisher, AmqpQueueProvider, AmqpSession};
use crate::library::BoxedError;
use async_trait::async_trait;
use futures::StreamExt;
use tracing::instrument;

/// [`CommunicationFactory`] handing out AMQP implementations which share one [`AmqpSession`]
#[derive(Clone)]
pub struct AmqpCommunicationFactory {
    session: AmqpSession,
}

impl AmqpCommunicationFactory {
    /// Creates a new instance from an open session
    pub fn new(session: AmqpSession) -> Self {
        Self { session }
    }

    /// Underlying session
    pub fn session(&self) -> &AmqpSession {
        &self.session
    }
}

#[async_trait]
impl CommunicationFactory for AmqpCommunicationFactory {
    type QueueProvider = AmqpQueueProvider;
    type MessagePublisher = AmqpPublisher;
    type ResponsePublisher = AmqpPublisher;

    fn queue_provider(&self) -> Self::QueueProvider {
        AmqpQueueProvider::new(self.session.clone())
    }

    fn message_publisher(&self) -> Self::MessagePublisher {
        AmqpPublisher::new(self.session.clone())
    }

    fn response_publisher(&self) -> Self::ResponsePublisher {
        AmqpPublisher::new(self.session.clone())
    }

    /// Consumes the reply queue without acknowledgements
    #[instrument(skip(self), fields(reply_queue = location.key()))]
    async fn response_collector(
        &self,
        location: &QueueDescriptor,
    ) -> Result<ReplyRouter, BoxedError> {
        let responses = self
            .queue_provider()
            .subscribe(location, true)
            .await?
            .map(|delivery| -> Result<RawResponse, BoxedError> { Ok(delivery?.into()) })
            .boxed();

        Ok(ReplyRouter::new(location.key().to_owned(), responses))
    }
}
