//! Facet reference lists, served from the cache when present and fetched once otherwise.

use crate::api::{ApiClient, Endpoints, ReferenceResource};
use crate::busy::BusyIndicator;
use crate::cache::CacheStore;
use crate::error::{CacheError, FetchError};
use crate::models::ReferenceEntry;
use std::sync::Arc;

pub struct ReferenceCatalog {
    cache: Arc<dyn CacheStore>,
    client: Arc<dyn ApiClient>,
    endpoints: Endpoints,
    busy: BusyIndicator,
}

impl ReferenceCatalog {
    pub fn new(
        cache: Arc<dyn CacheStore>,
        client: Arc<dyn ApiClient>,
        endpoints: Endpoints,
        busy: BusyIndicator,
    ) -> Self {
        Self {
            cache,
            client,
            endpoints,
            busy,
        }
    }

    /// Cache-or-fetch, never both. A network fetch is written back to the cache
    /// and holds the busy indicator; a cache hit does neither.
    pub async fn load(&self, resource: ReferenceResource) -> Result<Vec<ReferenceEntry>, FetchError> {
        let key = resource.cache_key();
        if let Some(entries) = self.cached(key) {
            tracing::debug!(target: "artscope::reference", key, count = entries.len(), "cache hit");
            return Ok(entries);
        }

        let _busy = self.busy.hold();
        let url = self.endpoints.reference_list(resource);
        let entries = self.client.fetch_reference_list(&url).await?;
        tracing::info!(target: "artscope::reference", key, count = entries.len(), "fetched reference list");

        if let Err(e) = self.store(key, &entries) {
            tracing::warn!(target: "artscope::reference", key, error = %e, "could not cache reference list");
        }
        Ok(entries)
    }

    /// Both lists at once: the two fetches start together and fail as a unit.
    /// Returns `(classifications, centuries)`.
    pub async fn prefetch(&self) -> Result<(Vec<ReferenceEntry>, Vec<ReferenceEntry>), FetchError> {
        tokio::try_join!(
            self.load(ReferenceResource::Classification),
            self.load(ReferenceResource::Century)
        )
    }

    fn cached(&self, key: &str) -> Option<Vec<ReferenceEntry>> {
        let raw = match self.cache.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(target: "artscope::reference", key, error = %e, "cache read failed");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => Some(entries),
            Err(e) => {
                tracing::warn!(target: "artscope::reference", key, error = %e, "ignoring unreadable cache entry");
                None
            }
        }
    }

    fn store(&self, key: &str, entries: &[ReferenceEntry]) -> Result<(), CacheError> {
        let raw = serde_json::to_string(entries)?;
        self.cache.put(key, &raw)
    }
}
