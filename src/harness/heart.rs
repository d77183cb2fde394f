//! Process liveness: a [`Heart`] beats until it is killed from within or the process receives a termination signal

use futures::{
    channel::mpsc::{channel, Receiver, Sender},
    pin_mut,
    prelude::*,
    select,
};
use std::fmt;
use tokio::signal::ctrl_c;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{debug, error, warn};

/// Why a [`Heart`] stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeathReason {
    /// A [`HeartStone`] killed it, carrying a human readable reason
    Killed(String),
    /// SIGTERM, SIGINT or other process-external cause
    Terminated,
}

impl fmt::Display for DeathReason {
    fn fmt(&self, w: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeathReason::Killed(reason) => write!(w, "killed: {}", reason),
            DeathReason::Terminated => write!(w, "terminated by signal"),
        }
    }
}

/// Keeps a module alive while its background jobs do the work
pub struct Heart {
    rx: Receiver<String>,
}

impl Heart {
    /// Creates a new heart and linked stone
    pub fn new() -> (Self, HeartStone) {
        let (remote, rx) = channel(1);
        (Self { rx }, HeartStone { remote })
    }

    /// Resolves once the heart stops
    pub async fn death(&mut self) -> DeathReason {
        debug!("Waiting for heart to stop");

        let termination = Heart::termination_signal().fuse();
        pin_mut!(termination);

        loop {
            select! {
                reason = self.rx.next() => {
                    match reason {
                        Some(reason) => return DeathReason::Killed(reason),
                        // Stream is fused, only external signals remain
                        None => debug!("All heart stones have been dropped"),
                    }
                },
                () = termination => return DeathReason::Terminated,
            };
        }
    }

    async fn termination_signal() {
        let ctrl_c = ctrl_c().fuse();
        pin_mut!(ctrl_c);

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm_stream) => {
                let sigterm = sigterm_stream.recv().fuse();
                pin_mut!(sigterm);

                select! {
                    _ = sigterm => {},
                    _ = ctrl_c => {},
                };
            }
            Err(error) => {
                warn!(?error, "Unable to listen for SIGTERM");
                ctrl_c.await.ok();
            }
        }
    }
}

/// Handle which can stop the linked [`Heart`] from anywhere, cloneable
#[derive(Clone)]
pub struct HeartStone {
    remote: Sender<String>,
}

impl HeartStone {
    /// Stops the linked heart
    pub async fn kill(&mut self, reason: impl Into<String>) {
        if let Err(e) = self.remote.send(reason.into()).await {
            error!(error = %e, "Heart is no longer listening");
        }
    }
}
