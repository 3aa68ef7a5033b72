use super::scope::SearchScope;
use crate::config::SessionConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A query as seen by one debounce trigger. Compared by value in the staleness filter.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    pub term: String,
    pub scope: SearchScope,
}

impl SearchQuery {
    pub fn new(term: impl Into<String>, scope: SearchScope) -> Self {
        Self {
            term: term.into(),
            scope,
        }
    }

    /// A query with an empty (or whitespace-only) term never reaches a provider.
    pub fn is_empty(&self) -> bool {
        self.term.trim().is_empty()
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} in {}", self.term, self.scope)
    }
}

/// Provider-assigned identity of a result entity; unique within a result set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single search result. Immutable once built by the query primitive.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StoreItem {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub artist: Option<String>,
    pub kind: String,
    #[serde(default)]
    pub artwork: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl StoreItem {
    pub fn new(id: u64, name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: ItemId(id),
            name: name.into(),
            artist: None,
            kind: kind.into(),
            artwork: None,
            url: None,
        }
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn with_artwork(mut self, artwork: impl Into<String>) -> Self {
        self.artwork = Some(artwork.into());
        self
    }

    pub fn display_name(&self) -> &str {
        &self.name
    }
}

pub const PARAM_TERM: &str = "term";
pub const PARAM_MEDIA: &str = "media";
pub const PARAM_LANG: &str = "lang";
pub const PARAM_LIMIT: &str = "limit";

/// Request handed to the query primitive: a plain string-to-string mapping.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestParams(BTreeMap<String, String>);

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the request for one concrete scope of `query`.
    ///
    /// The page size depends on the live scope: multi-scope fan-out uses the larger
    /// limit, a single-scope search the smaller one.
    pub fn for_scope(query: &SearchQuery, scope: SearchScope, config: &SessionConfig) -> Self {
        let limit = if query.scope == SearchScope::All {
            config.fan_out_limit
        } else {
            config.single_scope_limit
        };

        let mut params = Self::new()
            .with(PARAM_TERM, query.term.trim())
            .with(PARAM_LANG, &config.locale)
            .with(PARAM_LIMIT, limit.to_string());
        if let Some(tag) = scope.media_tag() {
            params = params.with(PARAM_MEDIA, tag);
        }
        params
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn term(&self) -> Option<&str> {
        self.get(PARAM_TERM)
    }

    pub fn media(&self) -> Option<&str> {
        self.get(PARAM_MEDIA)
    }

    pub fn lang(&self) -> Option<&str> {
        self.get(PARAM_LANG)
    }

    pub fn limit(&self) -> Option<usize> {
        self.get(PARAM_LIMIT).and_then(|raw| raw.parse().ok())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
