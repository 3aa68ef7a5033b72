//! Generation tokens and the staleness filter.
//!
//! Every debounce-triggered search mints a new [`Generation`]. The session keeps
//! a single [`LiveQuery`] naming the generation, term and scope that results must
//! still match; anything else is stale and dropped.

use crate::domain::{SearchQuery, SearchScope};
use serde::Serialize;
use std::fmt;

/// Opaque, monotonically increasing search id. Never reused within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Generation(u64);

impl Generation {
    /// Generation in effect before the first search. No fetch ever runs under it.
    pub const INITIAL: Generation = Generation(0);

    pub fn next(self) -> Generation {
        Generation(self.0 + 1)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen#{}", self.0)
    }
}

impl Default for Generation {
    fn default() -> Self {
        Generation::INITIAL
    }
}

/// Mints generations for one session.
#[derive(Debug, Default)]
pub struct GenerationCounter {
    current: Generation,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mint(&mut self) -> Generation {
        self.current = self.current.next();
        self.current
    }

    pub fn current(&self) -> Generation {
        self.current
    }
}

/// The query results must still correspond to, owned by the session.
///
/// `query` follows the presentation layer's input on every change, while
/// `generation` only advances when a debounced search actually starts. An empty
/// term means the session is idle and rejects everything.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct LiveQuery {
    pub generation: Generation,
    pub query: SearchQuery,
}

impl LiveQuery {
    pub fn idle(generation: Generation) -> Self {
        Self {
            generation,
            query: SearchQuery::default(),
        }
    }

    pub fn searching(generation: Generation, query: SearchQuery) -> Self {
        Self { generation, query }
    }

    pub fn is_idle(&self) -> bool {
        self.query.is_empty()
    }

    /// Staleness filter.
    ///
    /// A batch fetched under `generation` for `origin` (the query that started it)
    /// and `scope` is accepted only when the generation is live, the term is
    /// unchanged, and the live scope is `All` or equals the batch scope.
    pub fn accepts(&self, generation: Generation, origin: &SearchQuery, scope: SearchScope) -> Staleness {
        if self.is_idle() {
            return Staleness::Idle;
        }
        if generation != self.generation {
            return Staleness::Superseded;
        }
        if origin.term != self.query.term {
            return Staleness::TermChanged;
        }
        if !self.query.scope.admits(scope) {
            return Staleness::ScopeChanged;
        }
        Staleness::Fresh
    }
}

/// Outcome of the staleness filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Staleness {
    Fresh,
    Idle,
    Superseded,
    TermChanged,
    ScopeChanged,
}

impl Staleness {
    pub fn is_fresh(self) -> bool {
        self == Staleness::Fresh
    }
}
