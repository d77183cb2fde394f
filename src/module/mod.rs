//! Runnable modules each bundling their services and providing a unified configuration

use thiserror::Error;

pub mod options;

pub mod publisher;
pub mod subscriber;

/// Errors shared by all modules
#[derive(Debug, Error)]
pub enum ModuleError {
    /// The run procedure has been called without a successful startup
    #[error("module is not connected to a broker")]
    NotConnected,
}
