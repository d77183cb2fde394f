use thiserror::Error;

/// Errors occurring while translating between typed values and their wire representation
#[derive(Error, Debug)]
pub enum CodecError {
    /// Payload could not be parsed or did not match the expected schema
    #[error("malformed payload")]
    MalformedPayload(#[source] serde_json::Error),

    /// Value could not be serialized
    #[error("unable to encode value")]
    Encoding(#[source] serde_json::Error),

    /// A request was handed to a call site which expects a different request type
    #[error("unexpected request type {actual} (expected {expected})")]
    UnexpectedRequestType {
        /// Request type the call site is bound to
        expected: &'static str,
        /// Request type that was actually provided
        actual: &'static str,
    },
}
