//! Domain specific [`Request`](super::super::library::communication::request::Request) structures
//!
//! Each operation of the [`StringService`](super::StringService) has its own queue and request type.
//! The queue alone determines the expected payload shape, the wire format carries no type tag.
//! Callers which do not know the operation statically use the closed [`StringRequest`] and
//! [`StringResponse`] unions instead.

mod count;
mod uppercase;

pub use count::*;
pub use uppercase::*;

use crate::library::communication::queue::{Message, QueueDescriptor};
use crate::library::communication::CodecError;
use std::convert::TryFrom;
use std::fmt;

/// Operation offered by the string service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Convert to uppercase
    Uppercase,
    /// Count characters
    Count,
}

impl Operation {
    /// All operations in a fixed order
    pub const ALL: [Operation; 2] = [Operation::Uppercase, Operation::Count];

    /// Queue on which requests for this operation are consumed
    pub fn queue(&self) -> QueueDescriptor {
        match self {
            Operation::Uppercase => UppercaseRequest::queue(),
            Operation::Count => CountRequest::queue(),
        }
    }

    fn request_type(&self) -> &'static str {
        match self {
            Operation::Uppercase => "UppercaseRequest",
            Operation::Count => "CountRequest",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Uppercase => write!(f, "uppercase"),
            Operation::Count => write!(f, "count"),
        }
    }
}

/// Any request understood by the string service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringRequest {
    /// See [`UppercaseRequest`]
    Uppercase(UppercaseRequest),
    /// See [`CountRequest`]
    Count(CountRequest),
}

impl StringRequest {
    /// Operation this request targets
    pub fn operation(&self) -> Operation {
        match self {
            StringRequest::Uppercase(_) => Operation::Uppercase,
            StringRequest::Count(_) => Operation::Count,
        }
    }

    fn mismatch(&self, expected: Operation) -> CodecError {
        CodecError::UnexpectedRequestType {
            expected: expected.request_type(),
            actual: self.operation().request_type(),
        }
    }
}

/// Any response produced by the string service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringResponse {
    /// See [`UppercaseResponse`]
    Uppercase(UppercaseResponse),
    /// See [`CountResponse`]
    Count(CountResponse),
}

impl From<UppercaseRequest> for StringRequest {
    fn from(request: UppercaseRequest) -> Self {
        StringRequest::Uppercase(request)
    }
}

impl From<CountRequest> for StringRequest {
    fn from(request: CountRequest) -> Self {
        StringRequest::Count(request)
    }
}

impl TryFrom<StringRequest> for UppercaseRequest {
    type Error = CodecError;

    fn try_from(request: StringRequest) -> Result<Self, Self::Error> {
        match request {
            StringRequest::Uppercase(request) => Ok(request),
            other => Err(other.mismatch(Operation::Uppercase)),
        }
    }
}

impl TryFrom<StringRequest> for CountRequest {
    type Error = CodecError;

    fn try_from(request: StringRequest) -> Result<Self, Self::Error> {
        match request {
            StringRequest::Count(request) => Ok(request),
            other => Err(other.mismatch(Operation::Count)),
        }
    }
}

impl From<UppercaseResponse> for StringResponse {
    fn from(response: UppercaseResponse) -> Self {
        StringResponse::Uppercase(response)
    }
}

impl From<CountResponse> for StringResponse {
    fn from(response: CountResponse) -> Self {
        StringResponse::Count(response)
    }
}
