use crate::domain::{RequestParams, StoreItem};
use crate::error::FetchResult;
use async_trait::async_trait;

/// Query-execution primitive: turns one request into a list of entities.
///
/// Implementations may fail with a transport or provider error. They do not need
/// to watch for cancellation themselves; the orchestrator drops their future when
/// the search is cancelled.
#[async_trait]
pub trait QueryExecutor: Send + Sync + 'static {
    async fn execute(&self, params: RequestParams) -> FetchResult<Vec<StoreItem>>;
}

/// Asset-load primitive used by per-row tasks. Must be idempotent.
#[async_trait]
pub trait AssetLoader: Send + Sync + 'static {
    type Asset: Send + 'static;

    async fn load_asset(&self, item: &StoreItem) -> FetchResult<Self::Asset>;
}

#[cfg(test)]
pub mod testing {
    //! Scripted primitives for tests: per-scope latency, canned results and
    //! call recording.

    use super::*;
    use crate::domain::SearchScope;
    use crate::error::FetchError;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Clone)]
    pub struct ScriptedResponse {
        pub latency: Duration,
        pub result: FetchResult<Vec<StoreItem>>,
    }

    type ScriptKey = (Option<String>, SearchScope);

    /// Executor answering per media tag (and optionally per term) from a script.
    /// Unscripted requests return an empty list immediately.
    #[derive(Clone, Default)]
    pub struct ScriptedExecutor {
        responses: Arc<Mutex<HashMap<ScriptKey, ScriptedResponse>>>,
        calls: Arc<Mutex<Vec<RequestParams>>>,
    }

    impl ScriptedExecutor {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(&self, scope: SearchScope, latency: Duration, items: Vec<StoreItem>) -> &Self {
            self.responses.lock().unwrap().insert(
                (None, scope),
                ScriptedResponse {
                    latency,
                    result: Ok(items),
                },
            );
            self
        }

        /// Like [`ScriptedExecutor::respond`], but only for requests with this exact term.
        pub fn respond_to(
            &self,
            term: &str,
            scope: SearchScope,
            latency: Duration,
            items: Vec<StoreItem>,
        ) -> &Self {
            self.responses.lock().unwrap().insert(
                (Some(term.to_string()), scope),
                ScriptedResponse {
                    latency,
                    result: Ok(items),
                },
            );
            self
        }

        pub fn fail(&self, scope: SearchScope, latency: Duration, error: FetchError) -> &Self {
            self.responses.lock().unwrap().insert(
                (None, scope),
                ScriptedResponse {
                    latency,
                    result: Err(error),
                },
            );
            self
        }

        pub fn calls(&self) -> Vec<RequestParams> {
            self.calls.lock().unwrap().clone()
        }

        pub fn terms(&self) -> Vec<String> {
            self.calls()
                .iter()
                .filter_map(|p| p.term().map(str::to_string))
                .collect()
        }
    }

    #[async_trait]
    impl QueryExecutor for ScriptedExecutor {
        async fn execute(&self, params: RequestParams) -> FetchResult<Vec<StoreItem>> {
            self.calls.lock().unwrap().push(params.clone());
            let scope = params
                .media()
                .and_then(SearchScope::from_media_tag)
                .unwrap_or(SearchScope::All);
            let response = {
                let responses = self.responses.lock().unwrap();
                responses
                    .get(&(params.term().map(str::to_string), scope))
                    .or_else(|| responses.get(&(None, scope)))
                    .cloned()
            };
            match response {
                Some(response) => {
                    tokio::time::sleep(response.latency).await;
                    response.result
                }
                None => Ok(Vec::new()),
            }
        }
    }

    /// Distinct items for one scope: ids start at `base`.
    pub fn items(base: u64, count: u64, kind: &str) -> Vec<StoreItem> {
        (base..base + count)
            .map(|id| StoreItem::new(id, format!("{kind} {id}"), kind))
            .collect()
    }

    /// Asset loader returning the item's name after a fixed delay.
    #[derive(Clone)]
    pub struct DelayedAssetLoader {
        pub latency: Duration,
        pub loads: Arc<Mutex<Vec<u64>>>,
    }

    impl DelayedAssetLoader {
        pub fn new(latency: Duration) -> Self {
            Self {
                latency,
                loads: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl AssetLoader for DelayedAssetLoader {
        type Asset = String;

        async fn load_asset(&self, item: &StoreItem) -> FetchResult<String> {
            self.loads.lock().unwrap().push(item.id.0);
            tokio::time::sleep(self.latency).await;
            Ok(item.name.clone())
        }
    }
}
