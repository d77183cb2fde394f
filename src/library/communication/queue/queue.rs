use super::super::request::ReplyRouting;
use super::super::CodecError;
use crate::library::EmptyResult;
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// Describes a message queue
///
/// Queues are declared non-durable, non-exclusive and without any additional arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueueDescriptor {
    key: String,
}

impl QueueDescriptor {
    /// Creates a new instance from raw parts
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Value which is used by queue implementations to identify a queue
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Entry retrieved from a [`Queue`](QueueDescriptor) providing a raw payload
#[async_trait]
pub trait RawQueueEntry {
    /// Payload of the item
    fn payload(&self) -> &[u8];

    /// Reply routing metadata attached by the publisher, if any
    fn reply_routing(&self) -> Option<ReplyRouting>;

    /// Acknowledge the item as processed
    async fn acknowledge(&mut self) -> EmptyResult;

    /// Reject the item without requeueing it
    async fn reject(&mut self) -> EmptyResult;
}

/// Useful functions for [`QueueEntry`] implementations with default implementations
pub trait QueueEntry: RawQueueEntry {
    /// Attempts to parse the wire-format payload into a given data structure
    fn parse_payload<T>(&self) -> Result<T, CodecError>
    where
        T: DeserializeOwned;
}
