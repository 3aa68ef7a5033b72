use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Search scope selected in the scope bar.
///
/// `All` is a meta-scope: it never reaches a provider directly and is expanded
/// into every concrete scope at fetch time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchScope {
    All,
    Movies,
    Music,
    Apps,
    Books,
}

impl SearchScope {
    /// Concrete scopes in declaration order. Fan-out launches in this order,
    /// which only matters as a tie-break.
    pub const CONCRETE: [SearchScope; 4] = [
        SearchScope::Movies,
        SearchScope::Music,
        SearchScope::Apps,
        SearchScope::Books,
    ];

    /// Every scope including `All`, in scope-bar order.
    pub const ALL_SCOPES: [SearchScope; 5] = [
        SearchScope::All,
        SearchScope::Movies,
        SearchScope::Music,
        SearchScope::Apps,
        SearchScope::Books,
    ];

    pub fn is_concrete(self) -> bool {
        self != SearchScope::All
    }

    /// Provider category tag sent as the `media` request parameter.
    /// `None` for the meta-scope.
    pub fn media_tag(self) -> Option<&'static str> {
        match self {
            SearchScope::All => None,
            SearchScope::Movies => Some("movie"),
            SearchScope::Music => Some("music"),
            SearchScope::Apps => Some("software"),
            SearchScope::Books => Some("ebook"),
        }
    }

    /// Reverse lookup of [`SearchScope::media_tag`].
    pub fn from_media_tag(tag: &str) -> Option<SearchScope> {
        Self::CONCRETE
            .into_iter()
            .find(|scope| scope.media_tag() == Some(tag))
    }

    /// Expand into the concrete scopes a fetch has to cover.
    pub fn expand(self) -> Vec<SearchScope> {
        match self {
            SearchScope::All => Self::CONCRETE.to_vec(),
            concrete => vec![concrete],
        }
    }

    /// Whether a batch fetched for `origin` belongs under this live scope.
    pub fn admits(self, origin: SearchScope) -> bool {
        self == SearchScope::All || self == origin
    }

    pub fn label(self) -> &'static str {
        match self {
            SearchScope::All => "All",
            SearchScope::Movies => "Movies",
            SearchScope::Music => "Music",
            SearchScope::Apps => "Apps",
            SearchScope::Books => "Books",
        }
    }
}

impl Default for SearchScope {
    fn default() -> Self {
        SearchScope::All
    }
}

impl fmt::Display for SearchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SearchScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        match lowered.as_str() {
            "all" => Ok(SearchScope::All),
            "movies" | "movie" => Ok(SearchScope::Movies),
            "music" => Ok(SearchScope::Music),
            "apps" | "app" | "software" => Ok(SearchScope::Apps),
            "books" | "book" | "ebook" => Ok(SearchScope::Books),
            other => Err(format!("unknown search scope: {other}")),
        }
    }
}
