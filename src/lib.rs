//! This library crate contains everything needed to run the string service over a message broker.
//!
//! Submodules have been introduced to split responsibilities. Each module has a specific focus
//! and they together form a chain of dependencies from the low-level [`library`], over the
//! string service [`domain`], through the executable [`harness`], up to the high-level
//! [`modules`](module) which wire everything together.

#![deny(missing_docs)]
#![allow(clippy::nonstandard_macro_braces)]

pub mod domain;
pub mod harness;
pub mod library;
pub mod module;
