//! Sends one uppercase and one count request in parallel and reports the responses

mod endpoint;
mod options;

use super::ModuleError;
use crate::domain::request::{CountRequest, Operation, StringResponse, UppercaseRequest};
use crate::harness::{Heart, Module, ModuleTerminationReason};
use crate::library::communication::implementation::amqp::{AmqpCommunicationFactory, AmqpSession};
use crate::library::communication::queue::QueueDescriptor;
use crate::library::communication::request::{RequestError, ResponseCollectionTimeout};
use crate::library::communication::CommunicationFactory;
use crate::library::{BoxedError, EmptyResult};
use async_trait::async_trait;
use jatsl::JobScheduler;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

pub use endpoint::Endpoint;
pub use options::Options;

/// Reply queue owned by the publisher process
pub const REPLY_QUEUE_KEY: &str = "stringsvc_publisher";

#[derive(Debug, Error)]
enum PublisherError {
    #[error("{0} of the requests failed")]
    RequestsFailed(usize),
}

/// Outcome of the calls made by [`call_all`]
#[derive(Debug)]
pub struct CallResults {
    /// Result of the uppercase call
    pub uppercase: Result<StringResponse, RequestError>,
    /// Result of the count call
    pub count: Result<StringResponse, RequestError>,
}

impl CallResults {
    fn into_operations(
        self,
    ) -> impl Iterator<Item = (Operation, Result<StringResponse, RequestError>)> {
        [
            (Operation::Uppercase, self.uppercase),
            (Operation::Count, self.count),
        ]
        .into_iter()
    }
}

/// Declares the reply queue and runs both operations for `word` concurrently, each bounded by `timeout`
#[instrument(skip(factory, timeout))]
pub async fn call_all<F: CommunicationFactory>(
    factory: &F,
    word: &str,
    timeout: ResponseCollectionTimeout,
) -> Result<CallResults, BoxedError> {
    let requestor = factory
        .requestor(&QueueDescriptor::new(REPLY_QUEUE_KEY))
        .await?;

    let uppercase = Endpoint::<UppercaseRequest, _>::new(requestor.clone(), timeout);
    let count = Endpoint::<CountRequest, _>::new(requestor, timeout);

    let (uppercase, count) = futures::join!(
        uppercase.call(UppercaseRequest::new(word).into()),
        count.call(CountRequest::new(word).into()),
    );

    Ok(CallResults { uppercase, count })
}

/// Module implementation
pub struct Publisher {
    options: Options,
    factory: Option<AmqpCommunicationFactory>,
}

impl Publisher {
    /// Creates a new instance from raw parts
    pub fn new(options: Options) -> Self {
        Self {
            options,
            factory: None,
        }
    }
}

#[async_trait]
impl Module for Publisher {
    async fn pre_startup(&mut self) -> EmptyResult {
        let session = AmqpSession::connect(&self.options.amqp.url).await?;
        self.factory = Some(AmqpCommunicationFactory::new(session));

        Ok(())
    }

    #[instrument(skip(self, _scheduler))]
    async fn run(&mut self, _scheduler: &JobScheduler) -> Result<Option<Heart>, BoxedError> {
        let factory = self.factory.as_ref().ok_or(ModuleError::NotConnected)?;
        let timeout = ResponseCollectionTimeout::TotalDuration(self.options.timeout);

        let results = call_all(factory, &self.options.word, timeout).await?;
        let mut failures = 0;

        for (operation, result) in results.into_operations() {
            match result {
                Ok(response) => info!(%operation, ?response, "Received response"),
                Err(error) => {
                    error!(%operation, ?error, "Request failed");
                    failures += 1;
                }
            }
        }

        if failures > 0 {
            Err(PublisherError::RequestsFailed(failures).into())
        } else {
            Ok(None)
        }
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
