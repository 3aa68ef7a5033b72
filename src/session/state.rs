use super::commands::Command;
use super::events::Message;
use crate::domain::{ItemId, ResultSnapshot, StoreItem};
use crate::search::{Generation, GenerationCounter, LiveQuery, ScopeBatch};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Where the session stands with respect to its latest generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchStatus {
    Idle,
    Searching(Generation),
    /// Every scope fetch of this generation has terminated.
    Completed(Generation),
}

impl SearchStatus {
    pub fn generation(self) -> Option<Generation> {
        match self {
            SearchStatus::Idle => None,
            SearchStatus::Searching(generation) | SearchStatus::Completed(generation) => {
                Some(generation)
            }
        }
    }
}

impl fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchStatus::Idle => f.write_str("idle"),
            SearchStatus::Searching(generation) => write!(f, "searching ({generation})"),
            SearchStatus::Completed(generation) => write!(f, "completed ({generation})"),
        }
    }
}

/// Pure search-session state. All transitions go through [`SessionState::update`];
/// the async driver executes the returned [`Command`].
pub struct SessionState {
    generations: GenerationCounter,
    live: LiveQuery,
    status: SearchStatus,
    debounce_ticket: u64,
    accepted: Vec<StoreItem>,
    seen: HashSet<ItemId>,
    snapshot: Arc<ResultSnapshot>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            generations: GenerationCounter::new(),
            live: LiveQuery::default(),
            status: SearchStatus::Idle,
            debounce_ticket: 0,
            accepted: Vec::new(),
            seen: HashSet::new(),
            snapshot: Arc::new(ResultSnapshot::default()),
        }
    }

    pub fn live(&self) -> &LiveQuery {
        &self.live
    }

    pub fn status(&self) -> SearchStatus {
        self.status
    }

    pub fn snapshot(&self) -> &Arc<ResultSnapshot> {
        &self.snapshot
    }

    pub fn generation(&self) -> Generation {
        self.generations.current()
    }

    pub fn update(&mut self, msg: Message) -> Command {
        match msg {
            Message::QueryChanged(query) => {
                self.debounce_ticket += 1;
                if query.is_empty() {
                    // Invalidate the running generation outright; nothing fetched
                    // before the clear may surface if the same term is typed again.
                    let generation = self.generations.mint();
                    debug!(%generation, "query cleared");
                    self.live = LiveQuery::idle(generation);
                    self.status = SearchStatus::Idle;
                    self.reset(generation);
                    Command::ClearResults(Arc::clone(&self.snapshot))
                } else {
                    self.live.query = query.clone();
                    Command::ScheduleSearch {
                        ticket: self.debounce_ticket,
                        query,
                    }
                }
            }
            Message::DebounceElapsed { ticket, query } => {
                if ticket != self.debounce_ticket || query.is_empty() {
                    debug!(ticket, current = self.debounce_ticket, "ignoring superseded debounce");
                    return Command::None;
                }
                let generation = self.generations.mint();
                info!(%generation, %query, "starting search");
                self.live = LiveQuery::searching(generation, query.clone());
                self.status = SearchStatus::Searching(generation);
                self.reset(generation);
                Command::StartSearch {
                    generation,
                    query,
                    snapshot: Arc::clone(&self.snapshot),
                }
            }
            Message::BatchArrived(batch) => self.accept(batch),
            Message::FetchFinished(generation) => {
                if self.status == SearchStatus::Searching(generation) {
                    info!(%generation, results = self.accepted.len(), "search completed");
                    self.status = SearchStatus::Completed(generation);
                }
                Command::None
            }
        }
    }

    fn reset(&mut self, generation: Generation) {
        self.accepted.clear();
        self.seen.clear();
        self.snapshot = Arc::new(ResultSnapshot::empty(generation));
    }

    /// The single mutation path for results: filter, append, rebuild.
    fn accept(&mut self, batch: ScopeBatch) -> Command {
        let staleness = self
            .live
            .accepts(batch.generation, &batch.query, batch.scope);
        if !staleness.is_fresh() {
            debug!(
                generation = %batch.generation,
                scope = %batch.scope,
                ?staleness,
                "discarding stale batch"
            );
            return Command::None;
        }

        let before = self.accepted.len();
        for item in batch.items {
            if self.seen.insert(item.id) {
                self.accepted.push(item);
            }
        }
        let added = self.accepted.len() - before;
        debug!(generation = %batch.generation, scope = %batch.scope, added, "accepted batch");
        if added == 0 {
            return Command::None;
        }

        self.snapshot = Arc::new(ResultSnapshot::from_items(
            batch.generation,
            self.accepted.iter().cloned(),
        ));
        Command::Publish(Arc::clone(&self.snapshot))
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
