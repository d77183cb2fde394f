use super::{QueueDescriptor, QueueEntry};
use crate::library::{BoxedError, EmptyResult};
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Allows declaration and consumption of message queues
#[async_trait]
pub trait QueueProvider {
    /// Type of [`QueueEntry`] returned by the provider
    type Entry: QueueEntry + Send + Sync + 'static;

    /// Creates the queue if it does not exist yet
    async fn declare(&self, queue: &QueueDescriptor) -> EmptyResult;

    /// Subscribes to new messages on a given queue. Each entry has to be settled explicitly.
    ///
    /// The stream ends when the underlying subscription is closed.
    async fn consume(
        &self,
        queue: &QueueDescriptor,
    ) -> Result<BoxStream<'static, Result<Self::Entry, BoxedError>>, BoxedError>;
}
