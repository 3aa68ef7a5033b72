pub mod models;
pub mod scope;
pub mod snapshot;

#[cfg(test)]
mod models_test;

pub use models::{ItemId, RequestParams, SearchQuery, StoreItem};
pub use scope::SearchScope;
pub use snapshot::{RESULTS_SECTION, ResultSnapshot, Section};
