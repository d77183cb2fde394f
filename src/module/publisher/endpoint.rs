use crate::domain::request::{StringRequest, StringResponse};
use crate::library::communication::request::{
    Request, RequestError, Requestor, ResponseCollectionTimeout,
};
use crate::library::communication::CodecError;
use std::convert::TryFrom;
use std::marker::PhantomData;
use tracing::instrument;

/// Call site for one operation of the string service
///
/// Accepts the closed [`StringRequest`] union but only forwards the variant it is bound to.
pub struct Endpoint<R, Q> {
    requestor: Q,
    timeout: ResponseCollectionTimeout,
    request: PhantomData<fn() -> R>,
}

impl<R, Q> Endpoint<R, Q>
where
    R: Request + TryFrom<StringRequest, Error = CodecError> + Send + Sync,
    R::Response: Into<StringResponse> + Send + Sync,
    Q: Requestor + Send + Sync,
{
    /// Creates a new instance which waits at most `timeout` for each response
    pub fn new(requestor: Q, timeout: ResponseCollectionTimeout) -> Self {
        Self {
            requestor,
            timeout,
            request: PhantomData,
        }
    }

    /// Sends the request and waits for its response
    #[instrument(skip(self, request), fields(operation = %request.operation()))]
    pub async fn call(&self, request: StringRequest) -> Result<StringResponse, RequestError> {
        let request = R::try_from(request).map_err(RequestError::EncodingFailed)?;
        let response = self.requestor.request(&request, self.timeout).await?;

        Ok(response.into())
    }
}

#[cfg(test)]
mod does {
    use super::*;
    use crate::domain::request::{CountRequest, UppercaseRequest};
    use crate::library::communication::implementation::memory::MemoryBroker;
    use crate::library::communication::queue::QueueDescriptor;
    use crate::library::communication::CommunicationFactory;

    #[tokio::test]
    async fn refuse_requests_of_other_operations() {
        let broker = MemoryBroker::default();
        let requestor = broker
            .requestor(&QueueDescriptor::new("replies"))
            .await
            .unwrap();

        let endpoint = Endpoint::<UppercaseRequest, _>::new(
            requestor,
            ResponseCollectionTimeout::TotalDuration(std::time::Duration::from_millis(10)),
        );

        let result = endpoint.call(CountRequest::new("bird").into()).await;

        assert!(matches!(
            result,
            Err(RequestError::EncodingFailed(
                CodecError::UnexpectedRequestType { .. }
            ))
        ));
    }
}
