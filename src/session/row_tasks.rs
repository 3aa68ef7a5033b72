//! Keyed cancellation registry for per-row asset loads.
//!
//! At most one task is live per position. Attaching a task to an occupied
//! position cancels the previous occupant before the new one starts, so a reused
//! row never receives an asset loaded for the entity it used to show.

use crate::domain::StoreItem;
use crate::search::provider::AssetLoader;
use futures::future::{BoxFuture, FutureExt};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Stable position of a row: section and row index, like an index path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowPosition {
    pub section: usize,
    pub row: usize,
}

impl RowPosition {
    pub fn new(section: usize, row: usize) -> Self {
        Self { section, row }
    }
}

impl fmt::Display for RowPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.section, self.row)
    }
}

/// Identifies one attachment, so that a superseded task cannot remove its successor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RowTicket(u64);

/// Handed to every task started by the registry.
#[derive(Clone, Debug)]
pub struct RowTaskContext<K> {
    position: K,
    ticket: RowTicket,
    token: CancellationToken,
}

impl<K> RowTaskContext<K> {
    pub fn position(&self) -> &K {
        &self.position
    }

    pub fn ticket(&self) -> RowTicket {
        self.ticket
    }

    /// Tasks must check this before applying anything to their row.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}

struct RowTask {
    ticket: RowTicket,
    token: CancellationToken,
}

struct Inner<K> {
    tasks: HashMap<K, RowTask>,
    next_ticket: u64,
}

pub struct RowTaskRegistry<K = RowPosition> {
    inner: Arc<Mutex<Inner<K>>>,
}

impl<K> Clone for RowTaskRegistry<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K> Default for RowTaskRegistry<K> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                tasks: HashMap::new(),
                next_ticket: 0,
            })),
        }
    }
}

impl<K> RowTaskRegistry<K>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner<K>> {
        // The map is never left half-updated, so a poisoned lock is still usable.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Cancel whatever runs at `position`, then start the task built by `factory`.
    ///
    /// The task is dropped at its next suspension point once cancelled; on normal
    /// completion it removes itself. Must be called from within a tokio runtime.
    pub fn attach<F, Fut>(&self, position: K, factory: F) -> RowTicket
    where
        F: FnOnce(RowTaskContext<K>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let ticket = {
            let mut inner = self.lock();
            if let Some(previous) = inner.tasks.remove(&position) {
                previous.token.cancel();
                debug!(?position, "cancelled row task for reused position");
            }
            inner.next_ticket += 1;
            let ticket = RowTicket(inner.next_ticket);
            inner.tasks.insert(
                position.clone(),
                RowTask {
                    ticket,
                    token: token.clone(),
                },
            );
            ticket
        };

        let task = factory(RowTaskContext {
            position: position.clone(),
            ticket,
            token: token.clone(),
        });
        let registry = self.clone();
        tokio::spawn(async move {
            let finished = tokio::select! {
                biased;
                _ = token.cancelled() => false,
                _ = task => true,
            };
            if finished {
                registry.complete(&position, ticket);
            }
        });

        ticket
    }

    /// Remove the entry for `position` if it still belongs to `ticket`.
    /// Returns `false` when the task was already superseded or cancelled.
    pub fn complete(&self, position: &K, ticket: RowTicket) -> bool {
        let mut inner = self.lock();
        match inner.tasks.get(position) {
            Some(task) if task.ticket == ticket => {
                inner.tasks.remove(position);
                true
            }
            _ => false,
        }
    }

    /// Cancel the task at one position, if any.
    pub fn cancel(&self, position: &K) -> bool {
        match self.lock().tasks.remove(position) {
            Some(task) => {
                task.token.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancel every live task and clear the registry. Returns how many were cancelled.
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<RowTask> = self.lock().tasks.drain().map(|(_, task)| task).collect();
        for task in &drained {
            task.token.cancel();
        }
        if !drained.is_empty() {
            debug!(count = drained.len(), "cancelled all row tasks");
        }
        drained.len()
    }

    pub fn is_attached(&self, position: &K) -> bool {
        self.lock().tasks.contains_key(position)
    }

    pub fn len(&self) -> usize {
        self.lock().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Task factory loading `item`'s asset and handing it to `sink`, unless the task
/// was cancelled while the load was in flight.
pub fn asset_task<K, L, S>(
    loader: Arc<L>,
    item: StoreItem,
    sink: S,
) -> impl FnOnce(RowTaskContext<K>) -> BoxFuture<'static, ()>
where
    K: Clone + fmt::Debug + Send + Sync + 'static,
    L: AssetLoader,
    S: FnOnce(K, L::Asset) + Send + 'static,
{
    move |ctx: RowTaskContext<K>| {
        async move {
            match loader.load_asset(&item).await {
                Ok(asset) => {
                    if ctx.is_cancelled() {
                        debug!(position = ?ctx.position(), id = %item.id, "asset arrived after cancellation");
                        return;
                    }
                    sink(ctx.position().clone(), asset);
                }
                Err(e) if e.is_cancellation() => {}
                Err(e) => warn!(position = ?ctx.position(), id = %item.id, error = %e, "asset load failed"),
            }
        }
        .boxed()
    }
}

#[cfg(test)]
#[path = "row_tasks_test.rs"]
mod tests;
