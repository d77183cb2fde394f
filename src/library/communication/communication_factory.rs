use super::queue::{MessagePublisher, QueueDescriptor, QueueProvider};
use super::request::{CompositeRequestor, ReplyRouter, ResponsePublisher};
use crate::library::BoxedError;
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Factory to provide implementations for the traits from this module
///
/// Instances are cheap handles to a shared broker session and are passed to every
/// component which needs to talk to the broker.
#[async_trait]
pub trait CommunicationFactory: Send + Sync {
    /// [`QueueProvider`] implementation type
    type QueueProvider: QueueProvider + Send + Sync;
    /// [`MessagePublisher`] implementation type
    type MessagePublisher: MessagePublisher + Clone + Send + Sync;
    /// [`ResponsePublisher`] implementation type
    type ResponsePublisher: ResponsePublisher + Send + Sync;

    /// Instantiates a new [`QueueProvider`]
    fn queue_provider(&self) -> Self::QueueProvider;
    /// Instantiates a new [`MessagePublisher`]
    fn message_publisher(&self) -> Self::MessagePublisher;
    /// Instantiates a new [`ResponsePublisher`]
    fn response_publisher(&self) -> Self::ResponsePublisher;

    /// Starts listening on the given reply queue, which has to be declared beforehand,
    /// and routes incoming responses to their waiting requests
    async fn response_collector(&self, location: &QueueDescriptor)
        -> Result<ReplyRouter, BoxedError>;

    /// Declares the reply queue and assembles a requestor which receives its responses on it
    #[instrument(skip(self), fields(reply_queue = location.key()))]
    async fn requestor(
        &self,
        location: &QueueDescriptor,
    ) -> Result<CompositeRequestor<Self::MessagePublisher, ReplyRouter>, BoxedError> {
        debug!("Declaring reply queue");
        self.queue_provider().declare(location).await?;

        let collector = self.response_collector(location).await?;
        Ok(CompositeRequestor::new(self.message_publisher(), collector))
    }
}
