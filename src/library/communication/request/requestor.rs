use super::super::implementation::json;
use super::super::queue::MessagePublisher;
use super::super::CodecError;
use super::{ReplyRouting, Request, ResponseCollectionError, ResponseCollectionTimeout, ResponseCollector};
use crate::library::BoxedError;
use async_trait::async_trait;
use std::any::type_name;
use thiserror::Error;
use tracing::{debug, instrument, trace};
use uuid::Uuid;

/// Error type for sending requests
#[derive(Error, Debug)]
pub enum RequestError {
    /// The request could not be encoded or does not match the call site
    #[error("unable to encode request")]
    EncodingFailed(#[source] CodecError),
    /// Publishing of the request failed
    #[error("sending of request failed")]
    SendingFailure(#[source] BoxedError),
    /// Response collector stopped before a response arrived
    #[error("unable to collect response")]
    ResponseCollectionFailed(#[source] ResponseCollectionError),
    /// The response could not be decoded
    #[error("response not decodable")]
    ReceptionFailed(#[source] CodecError),
    /// The deadline expired before a response arrived
    #[error("request cancelled before a response arrived")]
    Cancelled,
}

/// Handler for sending requests and awaiting their response
#[async_trait]
pub trait Requestor {
    /// Sends out a request and waits for the correlated response until the timeout expires
    async fn request<R>(
        &self,
        request: &R,
        timeout: ResponseCollectionTimeout,
    ) -> Result<R::Response, RequestError>
    where
        R: Request + Send + Sync,
        R::Response: Send + Sync;
}

/// [`Requestor`] implementation by combining a [`MessagePublisher`] and [`ResponseCollector`]
///
/// Clones share the underlying collector and may be used concurrently.
#[derive(Clone)]
pub struct CompositeRequestor<P: MessagePublisher, C: ResponseCollector> {
    publisher: P,
    collector: C,
}

impl<P, C> CompositeRequestor<P, C>
where
    P: MessagePublisher,
    C: ResponseCollector,
{
    /// Creates a new instance from raw parts
    pub fn new(publisher: P, collector: C) -> Self {
        Self {
            publisher,
            collector,
        }
    }
}

#[async_trait]
impl<P, C> Requestor for CompositeRequestor<P, C>
where
    P: MessagePublisher + Send + Sync,
    C: ResponseCollector + Send + Sync,
{
    /// Registers a fresh correlation identifier with the [`ResponseCollector`], sends the request
    /// using the [`MessagePublisher`] and waits for the correlated response.
    ///
    /// When the timeout expires, the request is not retracted and a late response will be discarded.
    #[instrument(skip(self, request, timeout), fields(request = type_name::<R>()))]
    async fn request<R>(
        &self,
        request: &R,
        timeout: ResponseCollectionTimeout,
    ) -> Result<R::Response, RequestError>
    where
        R: Request + Send + Sync,
        R::Response: Send + Sync,
    {
        let correlation_id = Uuid::new_v4().to_string();
        let routing = ReplyRouting::new(
            self.collector.location().to_owned(),
            Some(correlation_id.clone()),
        );

        // Register before sending so that a quick response can not slip through
        let pending = self.collector.expect(correlation_id);

        trace!(?routing, "Sending request");
        self.publisher
            .publish(request, Some(&routing))
            .await
            .map_err(RequestError::SendingFailure)?;

        trace!("Awaiting response");
        let result = match timeout {
            ResponseCollectionTimeout::None => pending.await,
            ResponseCollectionTimeout::TotalDuration(duration) => {
                match tokio::time::timeout(duration, pending).await {
                    Ok(result) => result,
                    Err(_) => {
                        debug!(?duration, "Request timed out");
                        return Err(RequestError::Cancelled);
                    }
                }
            }
        };

        let payload = result.map_err(RequestError::ResponseCollectionFailed)?;

        json::decode(&payload).map_err(RequestError::ReceptionFailed)
    }
}

#[cfg(test)]
mod does {
    use super::super::super::queue::{Message, QueueDescriptor};
    use super::super::{RawResponse, ReplyRouter};
    use super::*;
    use crate::library::EmptyResult;
    use futures::channel::mpsc::{unbounded, UnboundedSender};
    use futures::StreamExt;
    use pretty_assertions::assert_eq;
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct EchoRequest(String);

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct EchoResponse(String);

    impl Message for EchoRequest {
        fn queue() -> QueueDescriptor {
            QueueDescriptor::new("echo")
        }
    }

    impl Request for EchoRequest {
        type Response = EchoResponse;
    }

    /// Answers every request directly with a fixed payload, or never if none is given
    struct LoopbackPublisher {
        responses: UnboundedSender<Result<RawResponse, BoxedError>>,
        payload: Option<Vec<u8>>,
    }

    #[async_trait]
    impl MessagePublisher for LoopbackPublisher {
        async fn publish<M: Message + Send + Sync>(
            &self,
            _message: &M,
            routing: Option<&ReplyRouting>,
        ) -> EmptyResult {
            if let Some(payload) = self.payload.clone() {
                self.responses.unbounded_send(Ok(RawResponse {
                    correlation_id: routing.and_then(|r| r.correlation_id.clone()),
                    payload,
                }))?;
            }

            Ok(())
        }
    }

    fn requestor(payload: Option<&str>) -> CompositeRequestor<LoopbackPublisher, ReplyRouter> {
        let (tx, rx) = unbounded();
        let collector = ReplyRouter::new("echo_replies".into(), rx.boxed());
        let publisher = LoopbackPublisher {
            responses: tx,
            payload: payload.map(|p| p.as_bytes().to_vec()),
        };

        CompositeRequestor::new(publisher, collector)
    }

    #[tokio::test]
    async fn receive_correlated_response() {
        let response = requestor(Some(r#""pong""#))
            .request(
                &EchoRequest("ping".into()),
                ResponseCollectionTimeout::TotalDuration(Duration::from_secs(5)),
            )
            .await
            .unwrap();

        assert_eq!(response, EchoResponse("pong".into()));
    }

    #[tokio::test]
    async fn cancel_when_deadline_expires() {
        let result = requestor(None)
            .request(
                &EchoRequest("ping".into()),
                ResponseCollectionTimeout::TotalDuration(Duration::from_millis(50)),
            )
            .await;

        assert!(matches!(result, Err(RequestError::Cancelled)));
    }

    #[tokio::test]
    async fn fail_on_undecodable_response() {
        let result = requestor(Some("{not json"))
            .request(&EchoRequest("ping".into()), ResponseCollectionTimeout::None)
            .await;

        assert!(matches!(
            result,
            Err(RequestError::ReceptionFailed(CodecError::MalformedPayload(_)))
        ));
    }
}
