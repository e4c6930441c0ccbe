//! Issues recommendation requests against the catalog service.

use crate::error::RequestError;
use crate::guard::Revocable;
use crate::types::{Filters, RecommendationKind, RecommendationRequest, RecommendationResult, Review, SessionState};
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;

mod http;

pub use http::{decode_response, decode_reviews, HttpRecommendationApi};

/// Identifies one submission. Ids grow monotonically per requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The catalog service as seen by the requester.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RecommendationApi: Send + Sync {
    async fn recommend(&self, request: &RecommendationRequest) -> Result<RecommendationResult, RequestError>;

    /// Viewer reviews of one movie, in server order.
    async fn reviews(&self, movie_id: u64) -> Result<Vec<Review>, RequestError>;
}

/// A thin request/response wrapper. It does not deduplicate: any number of
/// submissions may be in flight and the caller decides which one counts.
pub struct RecommendationRequester<A: ?Sized> {
    api: Arc<A>,
    next_id: u64,
}

impl<A> RecommendationRequester<A>
where
    A: RecommendationApi + ?Sized + 'static,
{
    pub fn new(api: Arc<A>) -> Self {
        Self { api, next_id: 0 }
    }

    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    /// Builds the payload from `snapshot` now and sends it in the background.
    ///
    /// `on_complete` runs once with the outcome unless the returned handle is
    /// cancelled first.
    pub fn submit<F>(
        &mut self,
        snapshot: &SessionState,
        filters: &Filters,
        kind: RecommendationKind,
        on_complete: F,
    ) -> PendingRequest
    where
        F: FnOnce(RequestId, Result<RecommendationResult, RequestError>) + Send + 'static,
    {
        self.next_id += 1;
        let id = RequestId(self.next_id);
        let request = RecommendationRequest::from_snapshot(snapshot, filters, kind);
        tracing::debug!("submitting {} request {}: {:?}", kind, id, request);

        let live = Revocable::new(());
        let task_live = live.clone();
        let api = Arc::clone(&self.api);
        let task = tokio::spawn(async move {
            let outcome = api.recommend(&request).await;
            match &outcome {
                Ok(result) => tracing::info!(
                    "request {} completed: mood {}, {} items",
                    id,
                    result.detected_mood(),
                    result.items().len()
                ),
                Err(RequestError::MalformedResponse(detail)) => {
                    tracing::warn!("request {} got a malformed response: {}", id, detail)
                }
                Err(e) => tracing::warn!("request {} failed: {}", id, e),
            }
            if task_live.with(|_| on_complete(id, outcome)).is_none() {
                tracing::debug!("request {} was cancelled, dropping its outcome", id);
            }
        });

        PendingRequest { id, live, task }
    }

    pub fn cancel(&self, pending: &PendingRequest) {
        pending.cancel();
    }
}

/// Handle to one submitted request.
#[derive(Debug)]
pub struct PendingRequest {
    id: RequestId,
    live: Revocable<()>,
    task: JoinHandle<()>,
}

impl PendingRequest {
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Suppresses the completion callback. The remote side may still finish
    /// processing the call.
    pub fn cancel(&self) {
        if self.live.revoke() {
            tracing::debug!("cancelled request {}", self.id);
        }
        self.task.abort();
    }

    pub fn is_cancelled(&self) -> bool {
        self.live.is_revoked()
    }
}
