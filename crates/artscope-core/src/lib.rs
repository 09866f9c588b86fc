//! Artscope core library.
//! Query construction, pagination and rendering for the art-collection explorer,
//! with the API gateway and reference-data cache it runs against.

pub mod api;
pub mod busy;
pub mod cache;
pub mod config;
pub mod error;
pub mod explorer;
pub mod models;
pub mod pagination;
pub mod query;
pub mod reference;
pub mod render;
pub mod view;

pub use api::{ApiClient, Endpoints, HttpApiClient, ReferenceResource};
pub use busy::{BusyGuard, BusyIndicator};
pub use cache::{CacheStore, MemoryCache, SledCache, CENTURIES_KEY, CLASSIFICATIONS_KEY};
pub use config::ArtscopeConfig;
pub use error::{CacheError, FetchError};
pub use explorer::{Explorer, ExplorerStatus, Outcome, SessionId};
pub use models::{ArtworkRecord, ImageDescriptor, PageInfo, PersonDescriptor, RecordPage, ReferenceEntry};
pub use pagination::{Direction, Pagination};
pub use query::{QueryBuilder, SearchCriteria, SearchField};
pub use reference::ReferenceCatalog;
pub use render::{render_feature, render_preview, Fact, FactContent, FeatureView, PreviewTile};
pub use view::ViewState;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
