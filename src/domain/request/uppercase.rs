use crate::library::communication::queue::{Message, QueueDescriptor};
use crate::library::communication::request::Request;
use serde::{Deserialize, Serialize};

const QUEUE_KEY: &str = "stringsvc_uppercase";

/// Request to convert a string to uppercase
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UppercaseRequest {
    /// Input string
    pub s: String,
}

/// Response to an [`UppercaseRequest`]
///
/// Failures of the operation are transported as text in `err`, which is omitted on the wire when empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UppercaseResponse {
    /// Converted string, empty if the operation failed
    pub v: String,

    /// Description of the failure, empty on success
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub err: String,
}

impl UppercaseRequest {
    /// Creates a new instance from the input string
    pub fn new(s: impl Into<String>) -> Self {
        Self { s: s.into() }
    }
}

impl Message for UppercaseRequest {
    fn queue() -> QueueDescriptor {
        QueueDescriptor::new(QUEUE_KEY)
    }
}

impl Request for UppercaseRequest {
    type Response = UppercaseResponse;
}
