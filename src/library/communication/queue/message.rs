use super::QueueDescriptor;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// Entity which can be sent to and received from a queue
pub trait Message: Serialize + DeserializeOwned + PartialEq + Debug {
    /// Queue on which this implementation can be sent and received
    fn queue() -> QueueDescriptor;
}
