//! Trait implementations using [`lapin`](::lapin)
//!
//! All traffic runs over a single connection and channel which are bundled into an [`AmqpSession`].
//! Messages are published through the default exchange, which routes them directly into the queue
//! named by the routing key. Reply routing metadata travels in the `reply_to` and `correlation_id`
//! message properties.

use crate::library::{BoxedError, EmptyResult};
use lapin::{Channel, Connection, ConnectionProperties};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

mod factory;
mod publisher;
mod queue_entry;
mod queue_provider;

pub use factory::*;
pub use publisher::*;
pub use queue_entry::*;
pub use queue_provider::*;

/// Exchange which routes messages into the queue named by their routing key
const DEFAULT_EXCHANGE: &str = "";

/// Reply code sent when closing the connection regularly
const REPLY_SUCCESS: u16 = 200;

fn consumer_tag(queue: &str) -> String {
    format!("{}-{}", queue, Uuid::new_v4())
}

/// Shared handle to an open broker connection and its channel
#[derive(Clone)]
pub struct AmqpSession {
    connection: Arc<Connection>,
    channel: Channel,
}

impl AmqpSession {
    /// Connects to the broker at `url` and opens a channel
    #[instrument(skip(url))]
    pub async fn connect(url: &str) -> Result<Self, BoxedError> {
        debug!("Connecting to broker");
        let connection = Connection::connect(url, ConnectionProperties::default()).await?;
        let channel = connection.create_channel().await?;
        info!(channel = channel.id(), "Connected to broker");

        Ok(Self {
            connection: Arc::new(connection),
            channel,
        })
    }

    /// Channel all operations are executed on
    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    /// Closes the connection and with it every channel and consumer
    pub async fn close(&self) -> EmptyResult {
        debug!("Closing broker connection");
        self.connection.close(REPLY_SUCCESS, "Bye").await?;
        Ok(())
    }
}

#[cfg(test)]
mod does {
    use super::*;

    #[test]
    fn generate_unique_consumer_tags() {
        let first = consumer_tag("stringsvc_uppercase");
        let second = consumer_tag("stringsvc_uppercase");

        assert!(first.starts_with("stringsvc_uppercase-"));
        assert_ne!(first, second);
    }
}
