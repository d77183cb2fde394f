use super::super::super::queue::{QueueDescriptor, RawMessagePublisher};
use super::super::super::request::{RawResponsePublisher, ReplyRouting};
use super::super::json::{JsonMessagePublisher, JsonResponsePublisher};
use super::{AmqpSession, DEFAULT_EXCHANGE};
use crate::library::EmptyResult;
use async_trait::async_trait;
use lapin::options::BasicPublishOptions;
use lapin::types::ShortString;
use lapin::BasicProperties;
use tracing::trace;

/// Multi-purpose publisher implementation using AMQP
///
/// - [`MessagePublisher`](super::super::super::queue::MessagePublisher) implementation which routes into the queue of the message
/// - [`ResponsePublisher`](super::super::super::request::ResponsePublisher) implementation which routes into the `reply_to` queue
#[derive(Clone)]
pub struct AmqpPublisher {
    session: AmqpSession,
}

impl AmqpPublisher {
    /// Creates a new instance operating on the given session
    pub fn new(session: AmqpSession) -> Self {
        Self { session }
    }

    async fn publish_to(
        &self,
        routing_key: &str,
        data: &[u8],
        properties: BasicProperties,
    ) -> EmptyResult {
        trace!(routing_key, bytes = data.len(), "Publishing message");

        self.session
            .channel()
            .basic_publish(
                DEFAULT_EXCHANGE,
                routing_key,
                BasicPublishOptions::default(),
                data,
                properties,
            )
            .await?
            .await?;

        Ok(())
    }
}

fn with_correlation_id(properties: BasicProperties, routing: &ReplyRouting) -> BasicProperties {
    match &routing.correlation_id {
        Some(id) => properties.with_correlation_id(ShortString::from(id.clone())),
        None => properties,
    }
}

impl JsonMessagePublisher for AmqpPublisher {}
impl JsonResponsePublisher for AmqpPublisher {}

#[async_trait]
impl RawMessagePublisher for AmqpPublisher {
    async fn publish_raw(
        &self,
        data: &[u8],
        queue: &QueueDescriptor,
        routing: Option<&ReplyRouting>,
    ) -> EmptyResult {
        let properties = match routing {
            Some(routing) => with_correlation_id(
                BasicProperties::default()
                    .with_reply_to(ShortString::from(routing.reply_to.clone())),
                routing,
            ),
            None => BasicProperties::default(),
        };

        self.publish_to(queue.key(), data, properties).await
    }
}

#[async_trait]
impl RawResponsePublisher for AmqpPublisher {
    async fn publish_raw(&self, data: &[u8], routing: &ReplyRouting) -> EmptyResult {
        let properties = with_correlation_id(BasicProperties::default(), routing);
        self.publish_to(&routing.reply_to, data, properties).await
    }
}

#[cfg(test)]
mod does {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn attach_correlation_id_when_present() {
        let routing = ReplyRouting::new("replies".into(), Some("abc".into()));
        let properties = with_correlation_id(BasicProperties::default(), &routing);

        assert_eq!(
            properties.correlation_id().as_ref().map(|id| id.as_str()),
            Some("abc")
        );
    }

    #[test]
    fn omit_missing_correlation_id() {
        let routing = ReplyRouting::new("replies".into(), None);
        let properties = with_correlation_id(BasicProperties::default(), &routing);

        assert!(properties.correlation_id().is_none());
    }
}
