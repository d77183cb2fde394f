//! Serialization and deserialization provided by [`serde_json`] using marker traits
//!
//! This module allows implementors of traits that allow raw access to underlying messaging systems
//! to provide the higher-level traits relying on serialization. It does so by providing a number of
//! marker traits which, when implemented, provide default implementations of the higher-level traits
//! by translating between lower-level serialized data and higher-level strongly typed data by using
//! [`serde_json`].

use super::super::queue::{
    Message, MessagePublisher, QueueEntry, RawMessagePublisher, RawQueueEntry,
};
use super::super::request::{RawResponsePublisher, ReplyRouting, ResponsePublisher};
use super::super::CodecError;
use crate::library::EmptyResult;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Serializes a value into its UTF-8 JSON wire representation
pub fn encode<T>(value: &T) -> Result<Vec<u8>, CodecError>
where
    T: Serialize + ?Sized,
{
    serde_json::to_vec(value).map_err(CodecError::Encoding)
}

/// Parses a UTF-8 JSON wire representation into a value
pub fn decode<T>(payload: &[u8]) -> Result<T, CodecError>
where
    T: DeserializeOwned,
{
    serde_json::from_slice(payload).map_err(CodecError::MalformedPayload)
}

/// Marker trait providing a default [`MessagePublisher`] implementation based on [`serde_json`]
pub trait JsonMessagePublisher: RawMessagePublisher + Send + Sync {}

#[async_trait]
impl<P> MessagePublisher for P
where
    P: JsonMessagePublisher,
{
    /// Serializes the message using [`serde_json::to_vec`]
    async fn publish<M: Message + Send + Sync>(
        &self,
        message: &M,
        routing: Option<&ReplyRouting>,
    ) -> EmptyResult {
        let data = encode(message)?;
        self.publish_raw(&data, &M::queue(), routing).await
    }
}

/// Marker trait providing a default [`QueueEntry`] implementation based on [`serde_json`]
pub trait JsonQueueEntry: RawQueueEntry {}

impl<E> QueueEntry for E
where
    E: JsonQueueEntry,
{
    /// Parses the payload using [`serde_json::from_slice`]
    fn parse_payload<T>(&self) -> Result<T, CodecError>
    where
        T: DeserializeOwned,
    {
        decode(self.payload())
    }
}

/// Marker trait providing a default [`ResponsePublisher`] implementation based on [`serde_json`]
pub trait JsonResponsePublisher: RawResponsePublisher + Send + Sync {}

#[async_trait]
impl<P> ResponsePublisher for P
where
    P: JsonResponsePublisher,
{
    /// Serializes the response using [`serde_json::to_vec`]
    async fn publish<R: Send + Sync + Serialize>(
        &self,
        response: &R,
        routing: &ReplyRouting,
    ) -> EmptyResult {
        let data = encode(response)?;
        self.publish_raw(&data, routing).await
    }
}

#[cfg(test)]
mod does {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Sample {
        s: String,
    }

    #[test]
    fn decode_matching_payload() {
        let sample: Sample = decode(br#"{"s":"hello"}"#).unwrap();
        assert_eq!(sample, Sample { s: "hello".into() });
    }

    #[test]
    fn reject_payload_with_wrong_schema() {
        let result = decode::<Sample>(br#"{"v":42}"#);
        assert!(matches!(result, Err(CodecError::MalformedPayload(_))));
    }

    #[test]
    fn reject_unparsable_payload() {
        let result = decode::<Sample>(b"\xff\xfe");
        assert!(matches!(result, Err(CodecError::MalformedPayload(_))));
    }

    #[test]
    fn encode_as_utf8_json() {
        let data = encode(&Sample { s: "hi".into() }).unwrap();
        assert_eq!(String::from_utf8(data).unwrap(), r#"{"s":"hi"}"#);
    }
}
