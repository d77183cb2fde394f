//! Structures to publish messages into and consume them from named queues
//!
//! Every [`Message`] knows the [`Queue`](QueueDescriptor) it travels on. Publishing a message
//! serializes it and hands it to the broker which routes it into the queue. On the consuming side a
//! [`QueueProvider`] subscribes to a queue and yields one [`QueueEntry`] per delivery. Each entry
//! has to be settled exactly once, either by acknowledging it after it has been processed
//! successfully or by rejecting it. Rejected entries are not requeued.
//!
//! A [`Consumer`] processes the messages of one queue. With the help of [`ConsumerExt`] it can be
//! fed raw entries directly, taking care of parsing and settlement.

mod consumer;
mod message;
mod provider;
mod publisher;
#[allow(clippy::module_inception)]
mod queue;

pub use consumer::*;
pub use message::*;
pub use provider::*;
pub use publisher::*;
pub use queue::*;
