pub mod catalog;
pub mod generation;
pub mod orchestrator;
pub mod provider;

pub use catalog::{CatalogAssetLoader, CatalogEntry, CatalogExecutor};
pub use generation::{Generation, GenerationCounter, LiveQuery, Staleness};
pub use orchestrator::{FetchOrchestrator, ScopeBatch};
pub use provider::{AssetLoader, QueryExecutor};
