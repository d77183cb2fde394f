//! Structures to communicate between services over a message broker
//!
//! Communication happens in a request and response fashion on top of plain message queues.
//!
//! Messages are plain data structures implementing the [`Message`](queue::Message) trait which
//! describes the [`Queue`](queue::QueueDescriptor) they travel on in a type-safe manner. The queue
//! identity alone determines the shape of a payload, there is no self-describing envelope on the wire.
//! Consuming these queues and settling the individual [`entries`](queue::QueueEntry) is covered by
//! the [`queue`] module.
//!
//! The [`Request`](request::Request) trait builds on top of that by linking a response type
//! to a message. Requests carry [`ReplyRouting`](request::ReplyRouting) metadata next to their
//! payload which tells the responding side where to send the answer to and which correlation
//! identifier to attach. For more details, consult the [`request`] module.
//!
//! Concrete transports live in the [`implementation`] module and are bundled by a
//! [`CommunicationFactory`] which is passed explicitly to everything that needs to talk to the broker.

mod codec;
mod communication_factory;

pub mod implementation;
pub mod queue;
pub mod request;

pub use codec::CodecError;
pub use communication_factory::CommunicationFactory;
