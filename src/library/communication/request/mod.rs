//! Structures to realise a request-response pattern
//!
//! When talking about the request-response pattern, there are two parties involved:
//!
//! - Requesting side
//! - Responding side
//!
//! On the requesting side, a [`Requestor`] is used to send a [`Request`] and receive the linked
//! [`Request::Response`]. The [`CompositeRequestor`] wraps a [`MessagePublisher`](super::queue::MessagePublisher)
//! used to dispatch the request and a [`ResponseCollector`] which waits for the response on a reply queue
//! owned by the requesting process. Each request carries a fresh correlation identifier so that
//! multiple requests may share one reply queue, the [`ReplyRouter`] hands every incoming response
//! to the request it belongs to.
//!
//! On the responding side, a [`Responder`] waits for incoming [`Requests`](Request) by the means of
//! implementing the [`Consumer`](super::queue::Consumer) trait, processes them using a [`RequestProcessor`]
//! and publishes the returned response to the [`ReplyRouting`] attached to the request using a [`ResponsePublisher`].
//!
//! Responses are not acknowledged. If the requesting side gives up before the response arrives,
//! the response is discarded once it shows up.

mod publisher;
#[allow(clippy::module_inception)]
mod request;
mod requestor;
mod responder;
mod router;

pub use publisher::*;
pub use request::*;
pub use requestor::*;
pub use responder::*;
pub use router::*;
