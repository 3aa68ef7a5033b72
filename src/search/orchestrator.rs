use super::generation::{Generation, LiveQuery};
use super::provider::QueryExecutor;
use crate::config::SessionConfig;
use crate::domain::{RequestParams, SearchQuery, SearchScope, StoreItem};
use crate::error::{FetchError, FetchResult};
use futures::future::ready;
use futures::stream::{BoxStream, FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Entities one concrete scope contributed to one generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScopeBatch {
    pub generation: Generation,
    /// The query the fetch was started for, not the live one.
    pub query: SearchQuery,
    pub scope: SearchScope,
    pub items: Vec<StoreItem>,
}

/// Fans one logical search out over its concrete scopes and streams the
/// accepted batches back in completion order.
#[derive(Clone)]
pub struct FetchOrchestrator {
    executor: Arc<dyn QueryExecutor>,
    config: Arc<SessionConfig>,
}

impl FetchOrchestrator {
    pub fn new(executor: Arc<dyn QueryExecutor>, config: Arc<SessionConfig>) -> Self {
        Self { executor, config }
    }

    /// Start every scope fetch for `query` and return the batches lazily, as each
    /// scope finishes.
    ///
    /// Batches are checked against `live` right before they are yielded; stale ones
    /// are dropped. Failed scopes are logged and contribute nothing. Once `cancel`
    /// fires, outstanding requests are abandoned and the stream ends without
    /// yielding anything further.
    pub fn fetch(
        &self,
        query: SearchQuery,
        generation: Generation,
        live: watch::Receiver<LiveQuery>,
        cancel: CancellationToken,
    ) -> BoxStream<'static, ScopeBatch> {
        let timeout = self.config.request_timeout();

        let pending: FuturesUnordered<_> = query
            .scope
            .expand()
            .into_iter()
            .map(|scope| {
                let executor = Arc::clone(&self.executor);
                let params = RequestParams::for_scope(&query, scope, &self.config);
                let cancel = cancel.clone();
                async move {
                    let outcome = fetch_scope(executor, scope, params, timeout, &cancel).await;
                    (scope, outcome)
                }
            })
            .collect();

        debug!(%generation, %query, scopes = pending.len(), "fan-out started");

        pending
            .filter_map(move |(scope, outcome)| {
                let batch = match outcome {
                    _ if cancel.is_cancelled() => {
                        debug!(%generation, %scope, "dropping result of cancelled fetch");
                        None
                    }
                    Ok(items) => {
                        let staleness = live.borrow().accepts(generation, &query, scope);
                        if staleness.is_fresh() {
                            Some(ScopeBatch {
                                generation,
                                query: query.clone(),
                                scope,
                                items,
                            })
                        } else {
                            debug!(%generation, %scope, ?staleness, "discarding stale batch");
                            None
                        }
                    }
                    Err(e) if e.is_cancellation() => None,
                    Err(e) => {
                        warn!(%generation, %scope, error = %e, "scope fetch failed");
                        None
                    }
                };
                ready(batch)
            })
            .boxed()
    }
}

async fn fetch_scope(
    executor: Arc<dyn QueryExecutor>,
    scope: SearchScope,
    params: RequestParams,
    timeout: Option<Duration>,
    cancel: &CancellationToken,
) -> FetchResult<Vec<StoreItem>> {
    if cancel.is_cancelled() {
        return Err(FetchError::Cancelled);
    }

    let request = async {
        match timeout {
            Some(after) => tokio::time::timeout(after, executor.execute(params))
                .await
                .unwrap_or(Err(FetchError::Timeout { scope, after })),
            None => executor.execute(params).await,
        }
    };

    let result = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(FetchError::Cancelled),
        result = request => result,
    };

    // The request may have completed after the session moved on.
    if cancel.is_cancelled() {
        return Err(FetchError::Cancelled);
    }
    result
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
