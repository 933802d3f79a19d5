//! Catalog access seam consumed by the view pipeline.

use std::sync::Arc;

use async_trait::async_trait;
use dexview_models::{DetailRecord, Filters, ListItem, PaginatedResponse};

use crate::client::ResourceClient;
use crate::error::ClientResult;

/// Read access to the remote catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch one list page; `Ok(None)` means the request was superseded.
    async fn list_page(
        &self,
        page: u32,
        filters: &Filters,
    ) -> ClientResult<Option<PaginatedResponse<ListItem>>>;

    /// Resolve one full record.
    async fn get_by_id(&self, id: u32) -> ClientResult<Arc<DetailRecord>>;

    /// Name search; never fails, degrading to an empty result.
    async fn search_by_name(&self, query: &str) -> Vec<Arc<DetailRecord>>;
}

#[async_trait]
impl CatalogSource for ResourceClient {
    async fn list_page(
        &self,
        page: u32,
        filters: &Filters,
    ) -> ClientResult<Option<PaginatedResponse<ListItem>>> {
        Self::list_page(self, page, filters).await
    }

    async fn get_by_id(&self, id: u32) -> ClientResult<Arc<DetailRecord>> {
        Self::get_by_id(self, id).await
    }

    async fn search_by_name(&self, query: &str) -> Vec<Arc<DetailRecord>> {
        Self::search_by_name(self, query).await
    }
}
