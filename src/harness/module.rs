use super::{DeathReason, Heart};
use crate::library::{BoxedError, EmptyResult};
use async_trait::async_trait;
use futures::lock::Mutex;
use jatsl::{JobScheduler, State, StatusServer};
use std::any::type_name;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, error, info, instrument, warn};

/// Unit of work which owns a process from connecting to the broker until it disconnects again
#[async_trait]
pub trait Module {
    /// Acquires external resources like broker connections. Bounded by the runner's startup timeout.
    async fn pre_startup(&mut self) -> EmptyResult {
        Ok(())
    }

    /// Does the actual work of the module.
    ///
    /// Modules that hand their work off to background jobs return a [`Heart`] which keeps the
    /// process alive until it dies. Returning `None` means the work is done and shutdown begins.
    async fn run(&mut self, scheduler: &JobScheduler) -> Result<Option<Heart>, BoxedError>;

    /// Called while background jobs are still running
    async fn pre_shutdown(&mut self, _scheduler: &JobScheduler) {}

    /// Releases resources once all background jobs are gone
    #[instrument(skip(self))]
    async fn post_shutdown(&mut self, termination_reason: &ModuleTerminationReason) {
        if termination_reason.is_failure() {
            error!("Module terminated with an error")
        } else {
            info!("Module exited normally")
        }
    }
}

/// Why [`ModuleRunner::run`] returned
#[derive(Error, Debug)]
pub enum ModuleTerminationReason {
    /// [`Module::pre_startup`] failed
    #[error("module failed to start")]
    StartupFailed(#[source] BoxedError),
    /// [`Module::run`] failed
    #[error("module failed while running")]
    OperationalError(#[source] BoxedError),
    /// The [`Heart`] returned by [`Module::run`] stopped beating
    #[error("module heart stopped: {0}")]
    HeartDied(DeathReason),
    /// [`Module::run`] finished without handing out a heart
    #[error("module finished its work")]
    ExitedNormally,
    /// [`Module::pre_startup`] did not finish in time
    #[error("module startup timed out")]
    Timeout,
}

impl ModuleTerminationReason {
    /// Whether the process should report a failure to its environment.
    ///
    /// A heart killed from within signals that the module could no longer do its work.
    pub fn is_failure(&self) -> bool {
        !matches!(
            self,
            ModuleTerminationReason::HeartDied(DeathReason::Terminated)
                | ModuleTerminationReason::ExitedNormally
        )
    }
}

/// Readiness as reported by the optional status server
struct Readiness(Option<Arc<Mutex<State>>>);

impl Readiness {
    async fn serve(scheduler: &JobScheduler, port: Option<u16>) -> Self {
        match port {
            Some(port) => {
                info!(port, "Serving readiness probe");
                let (state, server) = StatusServer::new(scheduler, port);
                scheduler.spawn_job(server).await;
                Self(Some(state))
            }
            None => Self(None),
        }
    }

    async fn report(&self, state: State) {
        if let Some(shared) = &self.0 {
            *shared.lock().await = state;
        }
    }
}

/// Drives a [`Module`] through its lifecycle hooks
pub struct ModuleRunner {
    startup_timeout: Duration,
    shutdown_timeout: Duration,
    job_termination_timeout: Duration,
    status_server_port: Option<u16>,
}

impl ModuleRunner {
    /// Runner which additionally serves a readiness probe on `status_server_port`
    pub fn new_with_status_server(status_server_port: u16) -> Self {
        Self {
            status_server_port: Some(status_server_port),
            ..Default::default()
        }
    }
}

impl Default for ModuleRunner {
    fn default() -> Self {
        Self {
            startup_timeout: Duration::from_secs(60),
            shutdown_timeout: Duration::from_secs(30),
            job_termination_timeout: Duration::from_secs(5),
            status_server_port: None,
        }
    }
}

impl ModuleRunner {
    /// Runs startup, work and shutdown of `module` in order.
    ///
    /// Shutdown hooks run regardless of how far the module got.
    #[instrument(skip(self, module), fields(module = type_name::<M>()))]
    pub async fn run<M: Module + Send + Sync>(&self, mut module: M) -> ModuleTerminationReason {
        let scheduler = JobScheduler::default();
        let readiness = Readiness::serve(&scheduler, self.status_server_port).await;

        debug!("Starting module");
        let termination_reason = match timeout(self.startup_timeout, module.pre_startup()).await {
            Ok(Ok(())) => self.work(&mut module, &scheduler, &readiness).await,
            Ok(Err(error)) => {
                error!(?error, "Module failed to start");
                ModuleTerminationReason::StartupFailed(error)
            }
            Err(_) => {
                error!(timeout = ?self.startup_timeout, "Module startup timed out");
                ModuleTerminationReason::Timeout
            }
        };

        readiness.report(State::Shutdown).await;
        module.pre_shutdown(&scheduler).await;

        debug!("Stopping background jobs");
        scheduler.terminate_jobs(self.job_termination_timeout).await;

        debug!("Shutting down module");
        if timeout(
            self.shutdown_timeout,
            module.post_shutdown(&termination_reason),
        )
        .await
        .is_err()
        {
            warn!(timeout = ?self.shutdown_timeout, "Module shutdown timed out");
        }

        termination_reason
    }

    async fn work<M: Module + Send + Sync>(
        &self,
        module: &mut M,
        scheduler: &JobScheduler,
        readiness: &Readiness,
    ) -> ModuleTerminationReason {
        let heart = match module.run(scheduler).await {
            Ok(heart) => heart,
            Err(error) => {
                error!(?error, "Module failed while running");
                return ModuleTerminationReason::OperationalError(error);
            }
        };

        readiness.report(State::Running).await;

        match heart {
            Some(mut heart) => {
                info!("Module is up, waiting for its heart to stop");
                let death_reason = heart.death().await;
                info!(%death_reason, "Module heart stopped");
                ModuleTerminationReason::HeartDied(death_reason)
            }
            None => {
                debug!("Module finished its work");
                ModuleTerminationReason::ExitedNormally
            }
        }
    }
}

#[cfg(test)]
mod does {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct Probe {
        fail_startup: bool,
        fail_run: bool,
        kill: bool,
        ran: Arc<AtomicBool>,
    }

    #[async_trait]
    impl Module for Probe {
        async fn pre_startup(&mut self) -> EmptyResult {
            if self.fail_startup {
                Err("no broker".into())
            } else {
                Ok(())
            }
        }

        async fn run(&mut self, _scheduler: &JobScheduler) -> Result<Option<Heart>, BoxedError> {
            self.ran.store(true, Ordering::SeqCst);

            if self.fail_run {
                return Err("broken".into());
            }

            if self.kill {
                let (heart, mut stone) = Heart::new();
                stone.kill("finished").await;
                return Ok(Some(heart));
            }

            Ok(None)
        }
    }

    #[tokio::test]
    async fn skip_run_when_startup_fails() {
        let ran = Arc::new(AtomicBool::new(false));
        let probe = Probe {
            fail_startup: true,
            ran: ran.clone(),
            ..Default::default()
        };

        let reason = ModuleRunner::default().run(probe).await;

        assert!(matches!(reason, ModuleTerminationReason::StartupFailed(_)));
        assert!(reason.is_failure());
        assert!(!ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn report_operational_errors() {
        let probe = Probe {
            fail_run: true,
            ..Default::default()
        };

        let reason = ModuleRunner::default().run(probe).await;

        assert!(matches!(
            reason,
            ModuleTerminationReason::OperationalError(_)
        ));
        assert!(reason.is_failure());
    }

    #[tokio::test]
    async fn exit_normally_after_run() {
        let reason = ModuleRunner::default().run(Probe::default()).await;

        assert!(matches!(reason, ModuleTerminationReason::ExitedNormally));
        assert!(!reason.is_failure());
    }

    #[tokio::test]
    async fn await_death_of_returned_heart() {
        let probe = Probe {
            kill: true,
            ..Default::default()
        };

        let reason = ModuleRunner::default().run(probe).await;

        assert!(matches!(
            reason,
            ModuleTerminationReason::HeartDied(DeathReason::Killed(_))
        ));
        assert!(reason.is_failure());
    }

    #[test]
    fn treat_external_termination_as_success() {
        let reason = ModuleTerminationReason::HeartDied(DeathReason::Terminated);
        assert!(!reason.is_failure());
    }
}
