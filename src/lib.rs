pub mod config;
pub mod domain;
pub mod error;
pub mod output;
pub mod search;
pub mod session;
pub mod telemetry;

pub use config::SessionConfig;
pub use domain::{ItemId, RequestParams, ResultSnapshot, SearchQuery, SearchScope, Section, StoreItem};
pub use error::{CatalogError, ConfigError, FetchError, FetchResult};
pub use search::{
    AssetLoader, CatalogAssetLoader, CatalogExecutor, FetchOrchestrator, Generation, LiveQuery,
    QueryExecutor, ScopeBatch,
};
pub use session::{RowPosition, RowTaskRegistry, SearchSession, SearchStatus};
