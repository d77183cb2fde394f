//! Runtime harness to execute modules as standalone processes

mod heart;
mod logging;
mod module;

pub use heart::*;
pub use logging::*;
pub use module::*;
