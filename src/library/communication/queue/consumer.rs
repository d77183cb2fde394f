use super::super::request::ReplyRouting;
use super::{Message, QueueEntry, RawQueueEntry};
use crate::library::EmptyResult;
use async_trait::async_trait;
use std::any::type_name;
use tracing::{trace, warn};

/// Final state a [`QueueEntry`] has been settled with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Processed successfully and positively acknowledged
    Acknowledged,
    /// Decoding or processing failed and the entry has been rejected without requeueing
    Rejected,
}

/// Entity which may consume and process [`Messages`](Message)
#[async_trait]
pub trait Consumer {
    /// Message to consume
    type Message: Message;

    /// Processes a message and returns whether it succeeded or failed
    async fn consume(&self, message: Self::Message, routing: Option<ReplyRouting>)
        -> EmptyResult;
}

/// Helper functions to aid the consumption of messages
#[async_trait]
pub trait ConsumerExt {
    /// Parses and processes a raw queue entry, acknowledging it on success and rejecting it otherwise.
    ///
    /// Every entry is settled exactly once.
    async fn process_entry<E>(&self, entry: E) -> DeliveryOutcome
    where
        E: QueueEntry + Send + Sync;
}

#[async_trait]
impl<C> ConsumerExt for C
where
    C: Consumer + Send + Sync,
    C::Message: Send + Sync,
{
    async fn process_entry<E>(&self, mut entry: E) -> DeliveryOutcome
    where
        E: QueueEntry + Send + Sync,
    {
        let message_type = type_name::<C::Message>();

        let message = match entry.parse_payload::<C::Message>() {
            Ok(message) => message,
            Err(error) => {
                warn!(?error, message_type, "Failed to decode queue entry");
                return settle(&mut entry, DeliveryOutcome::Rejected).await;
            }
        };

        let routing = entry.reply_routing();

        match self.consume(message, routing).await {
            Ok(_) => settle(&mut entry, DeliveryOutcome::Acknowledged).await,
            Err(error) => {
                warn!(?error, message_type, "Failed to consume queue entry");
                settle(&mut entry, DeliveryOutcome::Rejected).await
            }
        }
    }
}

async fn settle<E>(entry: &mut E, outcome: DeliveryOutcome) -> DeliveryOutcome
where
    E: RawQueueEntry + Send,
{
    trace!(?outcome, "Settling queue entry");

    let result = match outcome {
        DeliveryOutcome::Acknowledged => entry.acknowledge().await,
        DeliveryOutcome::Rejected => entry.reject().await,
    };

    if let Err(error) = result {
        warn!(?error, ?outcome, "Failed to settle queue entry");
    }

    outcome
}
