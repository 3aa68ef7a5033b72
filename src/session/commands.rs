use crate::domain::{ResultSnapshot, SearchQuery};
use crate::search::Generation;
use std::sync::Arc;

/// Effects requested by the session state machine.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    None,
    /// (Re)start the quiet period; on expiry, deliver `DebounceElapsed` with this ticket.
    ScheduleSearch { ticket: u64, query: SearchQuery },
    /// Cancel the previous generation and all row tasks, publish the empty
    /// snapshot, then fan out.
    StartSearch {
        generation: Generation,
        query: SearchQuery,
        snapshot: Arc<ResultSnapshot>,
    },
    /// Cancel everything in flight, including a pending debounce, and publish the
    /// empty snapshot. No fetch follows.
    ClearResults(Arc<ResultSnapshot>),
    Publish(Arc<ResultSnapshot>),
}
