use crate::domain::SearchQuery;
use crate::search::{Generation, ScopeBatch};

/// Inputs to the session state machine, all delivered on the coordination task.
#[derive(Clone, Debug)]
pub enum Message {
    // Presentation layer
    QueryChanged(SearchQuery),

    // Debounce scheduler
    DebounceElapsed { ticket: u64, query: SearchQuery },

    // Fetch orchestrator
    BatchArrived(ScopeBatch),
    FetchFinished(Generation),
}
