use crate::domain::request::{CountRequest, CountResponse, UppercaseRequest, UppercaseResponse};
use crate::domain::StringService;
use crate::library::communication::request::RequestProcessor;
use crate::library::BoxedError;
use async_trait::async_trait;

#[async_trait]
impl RequestProcessor<UppercaseRequest> for StringService {
    /// Failures of the operation are reported in the response
    async fn process(&self, request: UppercaseRequest) -> Result<UppercaseResponse, BoxedError> {
        let response = match self.uppercase(&request.s) {
            Ok(v) => UppercaseResponse { v, err: String::new() },
            Err(error) => UppercaseResponse {
                v: String::new(),
                err: error.to_string(),
            },
        };

        Ok(response)
    }
}

#[async_trait]
impl RequestProcessor<CountRequest> for StringService {
    async fn process(&self, request: CountRequest) -> Result<CountResponse, BoxedError> {
        Ok(CountResponse {
            v: self.count(&request.s),
        })
    }
}
