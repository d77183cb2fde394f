use super::{CorrelationId, ResponseLocation};
use crate::library::BoxedError;
use futures::stream::BoxStream;
use futures::StreamExt;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// Timeout structure for response collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCollectionTimeout {
    /// Block until the response arrives
    None,
    /// Wait at most for the given duration
    TotalDuration(Duration),
}

/// Response as it has been received from a reply queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// Correlation identifier the responder attached
    pub correlation_id: Option<CorrelationId>,
    /// Serialized response
    pub payload: Vec<u8>,
}

/// Error returned by a [`PendingResponse`]
#[derive(Error, Debug)]
pub enum ResponseCollectionError {
    /// The reply queue subscription ended before the response arrived
    #[error("response stream closed before the response arrived")]
    StreamClosed,
}

/// Structure which waits for responses on a reply queue
pub trait ResponseCollector {
    /// Name of the reply queue that responses have to be sent to
    fn location(&self) -> &ResponseLocation;

    /// Registers interest in the response carrying the given correlation identifier.
    ///
    /// Has to be called before the request is sent, otherwise the response may be discarded.
    fn expect(&self, correlation_id: CorrelationId) -> PendingResponse;
}

#[derive(Default)]
struct Routes {
    closed: bool,
    waiting: HashMap<CorrelationId, oneshot::Sender<Vec<u8>>>,
}

type SharedRoutes = Arc<Mutex<Routes>>;

fn lock(routes: &SharedRoutes) -> MutexGuard<'_, Routes> {
    routes.lock().unwrap_or_else(PoisonError::into_inner)
}

struct RoutingTask(JoinHandle<()>);

impl Drop for RoutingTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// [`ResponseCollector`] which distributes the responses of one reply queue to the requests waiting for them
///
/// A background task drains the reply queue and hands each response to the [`PendingResponse`]
/// with the matching correlation identifier. Responses nobody waits for are logged and discarded.
/// The task is stopped once the last clone of the router has been dropped.
#[derive(Clone)]
pub struct ReplyRouter {
    location: ResponseLocation,
    routes: SharedRoutes,
    _task: Arc<RoutingTask>,
}

impl ReplyRouter {
    /// Spawns the routing task for a stream of responses received on `location`.
    /// Must be called from within a tokio runtime.
    pub fn new(
        location: ResponseLocation,
        responses: BoxStream<'static, Result<RawResponse, BoxedError>>,
    ) -> Self {
        let routes = SharedRoutes::default();
        let handle = tokio::spawn(route(responses, routes.clone()));

        Self {
            location,
            routes,
            _task: Arc::new(RoutingTask(handle)),
        }
    }

    #[cfg(test)]
    pub(crate) fn outstanding(&self) -> usize {
        lock(&self.routes).waiting.len()
    }
}

impl ResponseCollector for ReplyRouter {
    fn location(&self) -> &ResponseLocation {
        &self.location
    }

    fn expect(&self, correlation_id: CorrelationId) -> PendingResponse {
        let (tx, rx) = oneshot::channel();

        {
            let mut routes = lock(&self.routes);

            // Dropping the sender right away resolves the pending response with an error
            if !routes.closed {
                routes.waiting.insert(correlation_id.clone(), tx);
            }
        }

        PendingResponse {
            correlation_id,
            receiver: rx,
            routes: self.routes.clone(),
        }
    }
}

/// Future resolving to the raw payload of one correlated response
///
/// Dropping it before the response arrives deregisters the interest, a late response will then be discarded.
pub struct PendingResponse {
    correlation_id: CorrelationId,
    receiver: oneshot::Receiver<Vec<u8>>,
    routes: SharedRoutes,
}

impl PendingResponse {
    /// Correlation identifier this instance is waiting for
    pub fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }
}

impl Future for PendingResponse {
    type Output = Result<Vec<u8>, ResponseCollectionError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().receiver)
            .poll(cx)
            .map_err(|_| ResponseCollectionError::StreamClosed)
    }
}

impl Drop for PendingResponse {
    fn drop(&mut self) {
        lock(&self.routes).waiting.remove(&self.correlation_id);
    }
}

async fn route(
    mut responses: BoxStream<'static, Result<RawResponse, BoxedError>>,
    routes: SharedRoutes,
) {
    while let Some(response) = responses.next().await {
        match response {
            Ok(response) => dispatch(&routes, response),
            Err(error) => warn!(?error, "Failed to receive response"),
        }
    }

    debug!("Response stream closed, releasing waiting requests");
    let mut routes = lock(&routes);
    routes.closed = true;
    routes.waiting.clear();
}

fn dispatch(routes: &SharedRoutes, response: RawResponse) {
    let waiting = response
        .correlation_id
        .as_ref()
        .and_then(|id| lock(routes).waiting.remove(id));

    match waiting {
        Some(sender) => {
            trace!(correlation_id = ?response.correlation_id, "Routing response");
            if sender.send(response.payload).is_err() {
                debug!(correlation_id = ?response.correlation_id, "Request stopped waiting for its response");
            }
        }
        None => warn!(correlation_id = ?response.correlation_id, "Discarding orphaned response"),
    }
}

#[cfg(test)]
mod does {
    use super::*;
    use futures::channel::mpsc::{unbounded, UnboundedSender};
    use pretty_assertions::assert_eq;

    type ResponseSender = UnboundedSender<Result<RawResponse, BoxedError>>;

    fn router() -> (ReplyRouter, ResponseSender) {
        let (tx, rx) = unbounded();
        (ReplyRouter::new("replies".into(), rx.boxed()), tx)
    }

    fn response(id: Option<&str>, payload: &str) -> Result<RawResponse, BoxedError> {
        Ok(RawResponse {
            correlation_id: id.map(String::from),
            payload: payload.as_bytes().to_vec(),
        })
    }

    #[tokio::test]
    async fn route_responses_by_correlation_id() {
        let (router, tx) = router();

        let first = router.expect("first".into());
        let second = router.expect("second".into());

        tx.unbounded_send(response(Some("second"), "2")).unwrap();
        tx.unbounded_send(response(Some("first"), "1")).unwrap();

        assert_eq!(first.await.unwrap(), b"1".to_vec());
        assert_eq!(second.await.unwrap(), b"2".to_vec());
        assert_eq!(router.outstanding(), 0);
    }

    #[tokio::test]
    async fn discard_orphaned_responses() {
        let (router, tx) = router();

        let pending = router.expect("known".into());

        tx.unbounded_send(response(Some("unknown"), "x")).unwrap();
        tx.unbounded_send(response(None, "y")).unwrap();
        tx.unbounded_send(response(Some("known"), "z")).unwrap();

        assert_eq!(pending.await.unwrap(), b"z".to_vec());
    }

    #[tokio::test]
    async fn deregister_when_dropped() {
        let (router, _tx) = router();

        let pending = router.expect("abandoned".into());
        assert_eq!(router.outstanding(), 1);

        drop(pending);
        assert_eq!(router.outstanding(), 0);
    }

    #[tokio::test]
    async fn release_waiting_requests_when_stream_closes() {
        let (router, tx) = router();

        let pending = router.expect("waiting".into());
        drop(tx);

        assert!(matches!(
            pending.await,
            Err(ResponseCollectionError::StreamClosed)
        ));

        let late = router.expect("late".into());
        assert!(matches!(
            late.await,
            Err(ResponseCollectionError::StreamClosed)
        ));
    }
}
