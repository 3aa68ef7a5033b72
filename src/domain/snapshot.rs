use super::models::{ItemId, StoreItem};
use crate::search::generation::Generation;
use serde::Serialize;
use std::collections::HashSet;

pub const RESULTS_SECTION: &str = "Results";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Section {
    pub name: String,
    pub items: Vec<StoreItem>,
}

/// Immutable, ordered result set handed to the presentation layer.
///
/// A snapshot is rebuilt for every accepted batch and never mutated afterwards;
/// identities are unique across all sections.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResultSnapshot {
    pub generation: Generation,
    pub sections: Vec<Section>,
}

impl ResultSnapshot {
    pub fn empty(generation: Generation) -> Self {
        Self {
            generation,
            sections: Vec::new(),
        }
    }

    /// Single "Results" section holding `items` in order. Later duplicates of an
    /// identity are dropped.
    pub fn from_items(generation: Generation, items: impl IntoIterator<Item = StoreItem>) -> Self {
        let mut seen = HashSet::new();
        let items: Vec<StoreItem> = items
            .into_iter()
            .filter(|item| seen.insert(item.id))
            .collect();

        Self {
            generation,
            sections: vec![Section {
                name: RESULTS_SECTION.to_string(),
                items,
            }],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(|s| s.items.is_empty())
    }

    pub fn len(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }

    pub fn items(&self) -> impl Iterator<Item = &StoreItem> {
        self.sections.iter().flat_map(|s| s.items.iter())
    }

    pub fn ids(&self) -> Vec<ItemId> {
        self.items().map(|item| item.id).collect()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items().any(|item| item.id == id)
    }
}

impl Default for ResultSnapshot {
    fn default() -> Self {
        Self::empty(Generation::INITIAL)
    }
}
