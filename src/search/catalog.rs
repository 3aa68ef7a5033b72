//! In-memory storefront catalog implementing both external primitives.
//!
//! Catalog files are JSON arrays of items tagged with their `media`:
//!
//! ```json
//! [{"media": "music", "id": 1, "name": "Blue Train", "artist": "John Coltrane", "kind": "song"}]
//! ```

use super::provider::{AssetLoader, QueryExecutor};
use crate::domain::{RequestParams, SearchScope, StoreItem};
use crate::error::{CatalogError, FetchError, FetchResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub media: String,
    #[serde(flatten)]
    pub item: StoreItem,
}

/// Query primitive answering from a fixed catalog, optionally after a simulated
/// network delay.
#[derive(Debug, Clone)]
pub struct CatalogExecutor {
    entries: Arc<Vec<CatalogEntry>>,
    latency: Duration,
}

impl CatalogExecutor {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries: Arc::new(entries),
            latency: Duration::ZERO,
        }
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = tokio::fs::read(path).await.map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let entries: Vec<CatalogEntry> =
            serde_json::from_slice(&raw).map_err(|source| CatalogError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("Loaded {} catalog entries from {}", entries.len(), path.display());
        Ok(Self::new(entries))
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn matches_term(item: &StoreItem, term: &str) -> bool {
    item.name.to_lowercase().contains(term)
        || item
            .artist
            .as_deref()
            .is_some_and(|artist| artist.to_lowercase().contains(term))
}

#[async_trait]
impl QueryExecutor for CatalogExecutor {
    async fn execute(&self, params: RequestParams) -> FetchResult<Vec<StoreItem>> {
        let media = params.media();
        let scope = media
            .and_then(SearchScope::from_media_tag)
            .unwrap_or(SearchScope::All);
        let term = params
            .term()
            .map(str::to_lowercase)
            .ok_or_else(|| FetchError::provider(scope, "missing term parameter"))?;
        let limit = params.limit().unwrap_or(usize::MAX);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        Ok(self
            .entries
            .iter()
            .filter(|entry| media.is_none_or(|tag| entry.media == tag))
            .filter(|entry| matches_term(&entry.item, &term))
            .take(limit)
            .map(|entry| entry.item.clone())
            .collect())
    }
}

/// Asset primitive reading an item's artwork reference as a local file,
/// resolved against `root` when relative.
#[derive(Debug, Clone)]
pub struct CatalogAssetLoader {
    root: PathBuf,
}

impl CatalogAssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl AssetLoader for CatalogAssetLoader {
    type Asset = Vec<u8>;

    async fn load_asset(&self, item: &StoreItem) -> FetchResult<Vec<u8>> {
        let artwork = item.artwork.as_deref().ok_or_else(|| FetchError::Asset {
            message: format!("item {} has no artwork", item.id),
        })?;
        let path = self.root.join(artwork);
        tokio::fs::read(&path).await.map_err(|e| FetchError::Asset {
            message: format!("{}: {e}", path.display()),
        })
    }
}
