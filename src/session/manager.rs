//! Search Session Manager.
//!
//! [`SearchSession`] is the handle the presentation layer holds. Every input is
//! turned into a [`Message`] and delivered to a single coordinator task, which
//! owns the [`SessionState`], the debounce scheduler and the cancellation token
//! of the running generation. Fetch results reach the state only through that
//! task, so appending a batch and publishing the new snapshot happen as one step.

use super::commands::Command;
use super::debounce::Debouncer;
use super::events::Message;
use super::row_tasks::{RowPosition, RowTaskContext, RowTaskRegistry, RowTicket};
use super::state::{SearchStatus, SessionState};
use crate::config::SessionConfig;
use crate::domain::{ResultSnapshot, SearchQuery, SearchScope};
use crate::search::{FetchOrchestrator, LiveQuery, QueryExecutor};
use futures::StreamExt;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Receives every published snapshot together with the "animate transition" hint.
pub type SnapshotCallback = Arc<dyn Fn(Arc<ResultSnapshot>, bool) + Send + Sync>;

type Subscribers = Arc<Mutex<Vec<SnapshotCallback>>>;

pub struct SearchSession {
    tx: mpsc::UnboundedSender<Message>,
    snapshot: watch::Receiver<Arc<ResultSnapshot>>,
    status: watch::Receiver<SearchStatus>,
    live: watch::Receiver<LiveQuery>,
    subscribers: Subscribers,
    rows: RowTaskRegistry<RowPosition>,
    shutdown: CancellationToken,
    driver: Option<JoinHandle<()>>,
}

impl SearchSession {
    /// Start a session and its coordinator task. Must be called from within a
    /// tokio runtime.
    pub fn new(executor: Arc<dyn QueryExecutor>, config: SessionConfig) -> Self {
        let config = Arc::new(config);
        let (tx, rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot) = watch::channel(Arc::new(ResultSnapshot::default()));
        let (status_tx, status) = watch::channel(SearchStatus::Idle);
        let (live_tx, live) = watch::channel(LiveQuery::default());
        let subscribers: Subscribers = Arc::new(Mutex::new(Vec::new()));
        let rows = RowTaskRegistry::new();
        let shutdown = CancellationToken::new();

        let coordinator = Coordinator {
            state: SessionState::new(),
            orchestrator: FetchOrchestrator::new(executor, Arc::clone(&config)),
            debouncer: Debouncer::new(config.debounce_interval()),
            search: None,
            tx: tx.clone(),
            snapshot_tx,
            status_tx,
            live_tx,
            subscribers: Arc::clone(&subscribers),
            rows: rows.clone(),
            animate: config.animate_transitions,
        };
        let driver = tokio::spawn(coordinator.run(rx, shutdown.clone()));
        debug!(debounce_ms = config.debounce_ms, locale = %config.locale, "search session started");

        Self {
            tx,
            snapshot,
            status,
            live,
            subscribers,
            rows,
            shutdown,
            driver: Some(driver),
        }
    }

    /// Entry point for every keystroke and scope-bar change.
    pub fn on_query_changed(&self, term: impl Into<String>, scope: SearchScope) {
        let query = SearchQuery::new(term, scope);
        if self.tx.send(Message::QueryChanged(query)).is_err() {
            debug!("query change after session shutdown ignored");
        }
    }

    /// The latest published snapshot.
    pub fn current_snapshot(&self) -> Arc<ResultSnapshot> {
        Arc::clone(&self.snapshot.borrow())
    }

    /// Register a callback invoked on the coordinator task for every published
    /// snapshot, in publication order.
    pub fn on_snapshot_changed<F>(&self, callback: F)
    where
        F: Fn(Arc<ResultSnapshot>, bool) + Send + Sync + 'static,
    {
        lock(&self.subscribers).push(Arc::new(callback));
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<ResultSnapshot>> {
        self.snapshot.clone()
    }

    pub fn status(&self) -> watch::Receiver<SearchStatus> {
        self.status.clone()
    }

    pub fn current_status(&self) -> SearchStatus {
        *self.status.borrow()
    }

    pub fn live_query(&self) -> LiveQuery {
        self.live.borrow().clone()
    }

    /// Start an asset load for the row at `position`, cancelling the one it replaces.
    pub fn attach_row_task<F, Fut>(&self, position: RowPosition, factory: F) -> RowTicket
    where
        F: FnOnce(RowTaskContext<RowPosition>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.rows.attach(position, factory)
    }

    pub fn cancel_all_row_tasks(&self) -> usize {
        self.rows.cancel_all()
    }

    pub fn row_tasks(&self) -> &RowTaskRegistry<RowPosition> {
        &self.rows
    }

    /// Cancel all outstanding work and wait for the coordinator to stop.
    pub async fn shutdown(mut self) {
        self.shutdown.cancel();
        if let Some(driver) = self.driver.take() {
            let _ = driver.await;
        }
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn lock(subscribers: &Subscribers) -> std::sync::MutexGuard<'_, Vec<SnapshotCallback>> {
    subscribers
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Owns everything the coordination task mutates.
struct Coordinator {
    state: SessionState,
    orchestrator: FetchOrchestrator,
    debouncer: Debouncer,
    /// Cancellation token of the running generation's fetch.
    search: Option<CancellationToken>,
    tx: mpsc::UnboundedSender<Message>,
    snapshot_tx: watch::Sender<Arc<ResultSnapshot>>,
    status_tx: watch::Sender<SearchStatus>,
    live_tx: watch::Sender<LiveQuery>,
    subscribers: Subscribers,
    rows: RowTaskRegistry<RowPosition>,
    animate: bool,
}

impl Coordinator {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Message>, shutdown: CancellationToken) {
        loop {
            let msg = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                msg = rx.recv() => match msg {
                    Some(msg) => msg,
                    None => break,
                },
            };

            let command = self.state.update(msg);
            // The staleness filter reads the live query, so it must be current
            // before any fetch for the new generation starts.
            self.sync_watches();
            self.execute(command);
        }

        self.debouncer.cancel();
        self.cancel_search();
        self.rows.cancel_all();
        debug!("search session stopped");
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::None => {}
            Command::ScheduleSearch { ticket, query } => {
                let tx = self.tx.clone();
                self.debouncer.trigger(move || {
                    let _ = tx.send(Message::DebounceElapsed { ticket, query });
                });
            }
            Command::StartSearch {
                generation,
                query,
                snapshot,
            } => {
                self.cancel_search();
                self.rows.cancel_all();
                self.publish(snapshot);

                let cancel = CancellationToken::new();
                let mut batches = self.orchestrator.fetch(
                    query,
                    generation,
                    self.live_tx.subscribe(),
                    cancel.clone(),
                );
                let tx = self.tx.clone();
                let token = cancel.clone();
                tokio::spawn(async move {
                    while let Some(batch) = batches.next().await {
                        if tx.send(Message::BatchArrived(batch)).is_err() {
                            return;
                        }
                    }
                    if !token.is_cancelled() {
                        let _ = tx.send(Message::FetchFinished(generation));
                    }
                });
                self.search = Some(cancel);
            }
            Command::ClearResults(snapshot) => {
                self.debouncer.cancel();
                self.cancel_search();
                self.rows.cancel_all();
                self.publish(snapshot);
            }
            Command::Publish(snapshot) => self.publish(snapshot),
        }
    }

    fn cancel_search(&mut self) {
        if let Some(token) = self.search.take() {
            if !token.is_cancelled() {
                token.cancel();
                debug!("cancelled in-flight search");
            }
        }
    }

    fn sync_watches(&self) {
        let live = self.state.live();
        self.live_tx.send_if_modified(|current| {
            if current == live {
                false
            } else {
                *current = live.clone();
                true
            }
        });

        let status = self.state.status();
        self.status_tx.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                *current = status;
                true
            }
        });
    }

    fn publish(&self, snapshot: Arc<ResultSnapshot>) {
        debug!(generation = %snapshot.generation, items = snapshot.len(), "publishing snapshot");
        self.snapshot_tx.send_replace(Arc::clone(&snapshot));
        // Callbacks run outside the lock so they may register further subscribers.
        let callbacks: Vec<SnapshotCallback> = lock(&self.subscribers).clone();
        for callback in callbacks {
            callback(Arc::clone(&snapshot), self.animate);
        }
    }
}

#[cfg(test)]
#[path = "manager_test.rs"]
mod tests;
