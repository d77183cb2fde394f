use super::super::queue::Message;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// Name of the queue a response should be sent to
pub type ResponseLocation = String;

/// Opaque value linking a response to the request it answers
pub type CorrelationId = String;

/// Metadata attached to a request so that the responder can route its answer back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyRouting {
    /// Queue on which the requesting side awaits the response
    pub reply_to: ResponseLocation,
    /// Identifier to attach to the response, if the requesting side provided one
    pub correlation_id: Option<CorrelationId>,
}

impl ReplyRouting {
    /// Creates a new instance from raw parts
    pub fn new(reply_to: ResponseLocation, correlation_id: Option<CorrelationId>) -> Self {
        Self {
            reply_to,
            correlation_id,
        }
    }
}

/// Query for information which can be replied to
///
/// Requests may not have side effects. A response can get lost when the requesting side
/// stops waiting for it and the request may be repeated by the caller.
pub trait Request: Message {
    /// Expected response type
    type Response: Serialize + DeserializeOwned + Debug + PartialEq;
}
