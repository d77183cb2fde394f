//! Domain specific structures, implementations, and logic

mod service;

pub mod request;

pub use service::*;
