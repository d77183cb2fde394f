//! Answers uppercase and count requests using the [`StringService`]
//!
//! Both request queues are consumed by a single worker. Their deliveries are merged into one stream
//! and handled strictly one at a time, each being settled before the next one is looked at.

mod endpoints;
mod job;
mod options;

use super::ModuleError;
use crate::domain::request::{CountRequest, Operation, UppercaseRequest};
use crate::domain::StringService;
use crate::harness::{Heart, Module, ModuleTerminationReason};
use crate::library::communication::implementation::amqp::{AmqpCommunicationFactory, AmqpSession};
use crate::library::communication::queue::{ConsumerExt, Message, QueueProvider};
use crate::library::communication::request::Responder;
use crate::library::communication::CommunicationFactory;
use crate::library::{BoxedError, EmptyResult};
use async_trait::async_trait;
use futures::{pin_mut, stream, Future, StreamExt};
use jatsl::JobScheduler;
use tracing::{debug, error, info, instrument, warn};

pub use job::SubscriberJob;
pub use options::Options;

/// Reason why [`serve`] returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeOutcome {
    /// The shutdown signal has been received
    Stopped,
    /// All inbound queue subscriptions ended
    Exhausted,
}

/// Declares the request queues and answers incoming requests until `shutdown` resolves
/// or the subscriptions end.
///
/// Requests which can not be decoded or answered are rejected without being requeued.
#[instrument(skip(factory, shutdown))]
pub async fn serve<F, S>(factory: &F, shutdown: S) -> Result<ServeOutcome, BoxedError>
where
    F: CommunicationFactory,
    S: Future<Output = ()> + Send,
{
    let provider = factory.queue_provider();

    for operation in Operation::ALL {
        provider.declare(&operation.queue()).await?;
    }

    let uppercase =
        Responder::<UppercaseRequest, _, _>::new(StringService, factory.response_publisher());
    let count = Responder::<CountRequest, _, _>::new(StringService, factory.response_publisher());

    let uppercase_entries = provider
        .consume(&UppercaseRequest::queue())
        .await?
        .map(|entry| (Operation::Uppercase, entry));
    let count_entries = provider
        .consume(&CountRequest::queue())
        .await?
        .map(|entry| (Operation::Count, entry));

    let entries = stream::select(uppercase_entries, count_entries).take_until(Box::pin(shutdown));
    pin_mut!(entries);

    info!("Awaiting requests");

    while let Some((operation, entry)) = entries.next().await {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                warn!(%operation, ?error, "Failed to receive request");
                continue;
            }
        };

        let outcome = match operation {
            Operation::Uppercase => uppercase.process_entry(entry).await,
            Operation::Count => count.process_entry(entry).await,
        };

        debug!(%operation, ?outcome, "Handled request");
    }

    // Only holds a value if the shutdown signal ended the loop
    if entries.as_mut().take_result().is_some() {
        Ok(ServeOutcome::Stopped)
    } else {
        Ok(ServeOutcome::Exhausted)
    }
}

/// Module implementation
pub struct Subscriber {
    options: Options,
    factory: Option<AmqpCommunicationFactory>,
}

impl Subscriber {
    /// Creates a new instance from raw parts
    pub fn new(options: Options) -> Self {
        Self {
            options,
            factory: None,
        }
    }
}

#[async_trait]
impl Module for Subscriber {
    async fn pre_startup(&mut self) -> EmptyResult {
        let session = AmqpSession::connect(&self.options.amqp.url).await?;
        self.factory = Some(AmqpCommunicationFactory::new(session));

        Ok(())
    }

    #[instrument(skip(self, scheduler))]
    async fn run(&mut self, scheduler: &JobScheduler) -> Result<Option<Heart>, BoxedError> {
        let factory = self.factory.clone().ok_or(ModuleError::NotConnected)?;
        let (heart, heart_stone) = Heart::new();

        debug!("Scheduling subscriber");
        scheduler
            .spawn_job(SubscriberJob::new(factory, heart_stone))
            .await;

        Ok(Some(heart))
    }

    async fn post_shutdown(&mut self, termination_reason: &ModuleTerminationReason) {
        if let Some(factory) = self.factory.take() {
            if let Err(error) = factory.session().close().await {
                warn!(?error, "Failed to close broker connection");
            }
        }

        if termination_reason.is_failure() {
            error!("Module terminated with an error")
        } else {
            info!("Module exited normally")
        }
    }
}

#[cfg(test)]
mod does {
    use super::super::publisher::call_all;
    use super::*;
    use crate::domain::request::{CountResponse, StringResponse, UppercaseResponse};
    use crate::library::communication::implementation::memory::MemoryBroker;
    use crate::library::communication::queue::RawMessagePublisher;
    use crate::library::communication::request::{
        ReplyRouting, RequestError, ResponseCollectionTimeout,
    };
    use futures::channel::oneshot;
    use futures::FutureExt;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use tokio::task::JoinHandle;

    const TIMEOUT: ResponseCollectionTimeout =
        ResponseCollectionTimeout::TotalDuration(Duration::from_secs(5));

    struct RunningSubscriber {
        broker: MemoryBroker,
        shutdown: oneshot::Sender<()>,
        handle: JoinHandle<Result<ServeOutcome, BoxedError>>,
    }

    impl RunningSubscriber {
        async fn start() -> Self {
            let broker = MemoryBroker::default();

            // Requests sent before the queues exist would be dropped
            for operation in Operation::ALL {
                broker.declare(&operation.queue()).await.unwrap();
            }

            let (shutdown, signal) = oneshot::channel::<()>();
            let factory = broker.clone();
            let handle = tokio::spawn(async move {
                serve(&factory, signal.map(|_| ())).await
            });

            Self {
                broker,
                shutdown,
                handle,
            }
        }

        async fn stop(self) -> MemoryBroker {
            self.shutdown.send(()).unwrap();
            assert_eq!(self.handle.await.unwrap().unwrap(), ServeOutcome::Stopped);
            self.broker
        }
    }

    #[tokio::test]
    async fn answer_both_operations() {
        let subscriber = RunningSubscriber::start().await;

        let results = call_all(&subscriber.broker, "bird is the word", TIMEOUT)
            .await
            .unwrap();

        assert_eq!(
            results.uppercase.unwrap(),
            StringResponse::Uppercase(UppercaseResponse {
                v: "BIRD IS THE WORD".into(),
                err: String::new()
            })
        );
        assert_eq!(
            results.count.unwrap(),
            StringResponse::Count(CountResponse { v: 16 })
        );

        let broker = subscriber.stop().await;
        assert_eq!(broker.statistics("stringsvc_uppercase").acknowledged, 1);
        assert_eq!(broker.statistics("stringsvc_count").acknowledged, 1);
    }

    #[tokio::test]
    async fn answer_empty_input_with_error() {
        let subscriber = RunningSubscriber::start().await;

        let results = call_all(&subscriber.broker, "", TIMEOUT).await.unwrap();

        assert_eq!(
            results.uppercase.unwrap(),
            StringResponse::Uppercase(UppercaseResponse {
                v: String::new(),
                err: "empty string".into()
            })
        );
        assert_eq!(
            results.count.unwrap(),
            StringResponse::Count(CountResponse { v: 0 })
        );

        subscriber.stop().await;
    }

    #[tokio::test]
    async fn reject_malformed_request_and_keep_serving() {
        let subscriber = RunningSubscriber::start().await;
        let routing = ReplyRouting::new("nowhere".into(), Some("malformed".into()));

        RawMessagePublisher::publish_raw(
            &subscriber.broker,
            b"{\"s\":",
            &UppercaseRequest::queue(),
            Some(&routing),
        )
        .await
        .unwrap();

        let results = call_all(&subscriber.broker, "word", TIMEOUT).await.unwrap();
        assert!(results.uppercase.is_ok());

        let broker = subscriber.stop().await;
        let statistics = broker.statistics("stringsvc_uppercase");

        assert_eq!(statistics.published, 2);
        assert_eq!(statistics.rejected, 1);
        assert_eq!(statistics.acknowledged, 1);
    }

    #[tokio::test]
    async fn cancel_calls_without_subscriber() {
        let broker = MemoryBroker::default();
        let timeout = ResponseCollectionTimeout::TotalDuration(Duration::from_millis(50));

        let results = call_all(&broker, "bird is the word", timeout).await.unwrap();

        assert!(matches!(results.uppercase, Err(RequestError::Cancelled)));
        assert!(matches!(results.count, Err(RequestError::Cancelled)));
    }

    #[tokio::test]
    async fn report_exhaustion_when_broker_closes() {
        let subscriber = RunningSubscriber::start().await;

        // Closing before the subscriber consumes would let it redeclare the queues
        tokio::time::sleep(Duration::from_millis(50)).await;
        subscriber.broker.close();

        let outcome = subscriber.handle.await.unwrap().unwrap();
        assert_eq!(outcome, ServeOutcome::Exhausted);
    }
}
