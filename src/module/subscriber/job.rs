use super::{serve, ServeOutcome};
use crate::harness::HeartStone;
use crate::library::communication::CommunicationFactory;
use crate::library::EmptyResult;
use async_trait::async_trait;
use jatsl::{Job, JobManager};
use tracing::{info, warn};

/// Background job answering requests until it is terminated or its inbound queues are gone
pub struct SubscriberJob<F> {
    factory: F,
    heart_stone: HeartStone,
}

impl<F> SubscriberJob<F> {
    /// Creates a new instance which kills the heart linked to `heart_stone` when it can no longer serve
    pub fn new(factory: F, heart_stone: HeartStone) -> Self {
        Self {
            factory,
            heart_stone,
        }
    }
}

#[async_trait]
impl<F> Job for SubscriberJob<F>
where
    F: CommunicationFactory + 'static,
{
    const NAME: &'static str = module_path!();
    const SUPPORTS_GRACEFUL_TERMINATION: bool = true;

    async fn execute(&self, manager: JobManager) -> EmptyResult {
        manager.ready().await;

        let outcome = serve(&self.factory, manager.termination_signal()).await;
        let mut heart_stone = self.heart_stone.clone();

        match outcome {
            Ok(ServeOutcome::Stopped) => {
                info!("Stopped serving requests");
                Ok(())
            }
            Ok(ServeOutcome::Exhausted) => {
                warn!("Request streams have been closed by the broker");
                heart_stone.kill("request streams closed").await;
                Ok(())
            }
            Err(error) => {
                heart_stone.kill("unable to serve requests").await;
                Err(error)
            }
        }
    }
}
