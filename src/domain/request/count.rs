use crate::library::communication::queue::{Message, QueueDescriptor};
use crate::library::communication::request::Request;
use serde::{Deserialize, Serialize};

const QUEUE_KEY: &str = "stringsvc_count";

/// Request to count the characters of a string
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountRequest {
    /// Input string
    pub s: String,
}

/// Response to a [`CountRequest`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountResponse {
    /// Number of characters
    pub v: usize,
}

impl CountRequest {
    /// Creates a new instance from the input string
    pub fn new(s: impl Into<String>) -> Self {
        Self { s: s.into() }
    }
}

impl Message for CountRequest {
    fn queue() -> QueueDescriptor {
        QueueDescriptor::new(QUEUE_KEY)
    }
}

impl Request for CountRequest {
    type Response = CountResponse;
}
