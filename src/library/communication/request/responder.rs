use super::super::queue::Consumer;
use super::{ReplyRouting, Request, ResponsePublisher};
use crate::library::{BoxedError, EmptyResult};
use async_trait::async_trait;
use std::marker::PhantomData;
use thiserror::Error;
use tracing::trace;

/// Error that may be thrown while responding to a request
#[derive(Error, Debug)]
pub enum ResponderError {
    /// The [`RequestProcessor`] threw an error
    #[error("processing request failed")]
    ProcessingFailed(#[source] BoxedError),
    /// Unable to deliver the response
    #[error("sending response failed")]
    ResponseUndeliverable(#[source] BoxedError),
    /// The request did not say where the response should go
    #[error("request carries no reply routing")]
    MissingReplyRouting,
}

/// Structure which processes requests and produces responses
///
/// Failures of the request subject itself should be part of the response, an error
/// is reserved for the case where no response can be produced at all.
#[async_trait]
pub trait RequestProcessor<R: Request> {
    /// Handler for requests, returning a response
    async fn process(&self, request: R) -> Result<R::Response, BoxedError>;
}

/// Convenience wrapper to process requests and send responses
pub struct Responder<R, C, P> {
    processor: C,
    publisher: P,
    request: PhantomData<fn() -> R>,
}

impl<R, C, P> Responder<R, C, P>
where
    R: Request,
    C: RequestProcessor<R>,
    P: ResponsePublisher,
{
    /// Creates a new responder from raw parts
    pub fn new(processor: C, publisher: P) -> Self {
        Self {
            processor,
            publisher,
            request: PhantomData,
        }
    }
}

#[async_trait]
impl<R, C, P> Consumer for Responder<R, C, P>
where
    R: Request + Send + Sync + 'static,
    R::Response: Send + Sync,
    C: RequestProcessor<R> + Send + Sync,
    P: ResponsePublisher + Send + Sync,
{
    type Message = R;

    async fn consume(&self, request: R, routing: Option<ReplyRouting>) -> EmptyResult {
        // Without somewhere to send the response to, processing would be wasted
        let routing = routing.ok_or(ResponderError::MissingReplyRouting)?;

        let response = self
            .processor
            .process(request)
            .await
            .map_err(ResponderError::ProcessingFailed)?;

        trace!(?response, ?routing, "Publishing response");

        self.publisher
            .publish(&response, &routing)
            .await
            .map_err(ResponderError::ResponseUndeliverable)?;

        Ok(())
    }
}

#[cfg(test)]
mod does {
    use super::super::super::implementation::memory::MemoryBroker;
    use super::super::super::queue::{
        ConsumerExt, DeliveryOutcome, Message, QueueDescriptor, QueueProvider, RawMessagePublisher,
    };
    use super::*;
    use futures::StreamExt;
    use pretty_assertions::assert_eq;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct LengthRequest(String);

    impl Message for LengthRequest {
        fn queue() -> QueueDescriptor {
            QueueDescriptor::new("length")
        }
    }

    impl Request for LengthRequest {
        type Response = usize;
    }

    struct LengthProcessor;

    #[async_trait]
    impl RequestProcessor<LengthRequest> for LengthProcessor {
        async fn process(&self, request: LengthRequest) -> Result<usize, BoxedError> {
            if request.0 == "fail" {
                Err("refusing to count".into())
            } else {
                Ok(request.0.len())
            }
        }
    }

    async fn respond_to(
        payload: &[u8],
        routing: Option<&ReplyRouting>,
    ) -> (DeliveryOutcome, MemoryBroker) {
        let broker = MemoryBroker::default();
        let queue = LengthRequest::queue();
        let replies = QueueDescriptor::new("replies");

        broker.declare(&queue).await.unwrap();
        broker.declare(&replies).await.unwrap();
        RawMessagePublisher::publish_raw(&broker, payload, &queue, routing)
            .await
            .unwrap();

        let entry = broker
            .consume(&queue)
            .await
            .unwrap()
            .next()
            .await
            .unwrap()
            .unwrap();

        let responder = Responder::<LengthRequest, _, _>::new(LengthProcessor, broker.clone());
        (responder.process_entry(entry).await, broker)
    }

    fn routing() -> ReplyRouting {
        ReplyRouting::new("replies".into(), Some("abc".into()))
    }

    #[tokio::test]
    async fn publish_response_to_reply_queue() {
        let (outcome, broker) = respond_to(br#""four""#, Some(&routing())).await;

        assert_eq!(outcome, DeliveryOutcome::Acknowledged);
        assert_eq!(broker.statistics("length").acknowledged, 1);

        let reply = broker.take_raw("replies").unwrap();
        assert_eq!(reply.payload, b"4".to_vec());
        assert_eq!(reply.correlation_id.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn reject_malformed_request() {
        let (outcome, broker) = respond_to(b"{", Some(&routing())).await;

        assert_eq!(outcome, DeliveryOutcome::Rejected);
        assert_eq!(broker.statistics("length").acknowledged, 0);
        assert_eq!(broker.statistics("length").rejected, 1);
        assert!(broker.take_raw("replies").is_none());
    }

    #[tokio::test]
    async fn reject_request_without_reply_routing() {
        let (outcome, broker) = respond_to(br#""four""#, None).await;

        assert_eq!(outcome, DeliveryOutcome::Rejected);
        assert!(broker.take_raw("replies").is_none());
    }

    #[tokio::test]
    async fn reject_request_that_failed_processing() {
        let (outcome, broker) = respond_to(br#""fail""#, Some(&routing())).await;

        assert_eq!(outcome, DeliveryOutcome::Rejected);
        assert!(broker.take_raw("replies").is_none());
    }
}
