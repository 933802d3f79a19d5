//! In-memory catalog implementing [`CatalogSource`].

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use dexview_client::{CatalogSource, ClientError, ClientResult, list_window};
use dexview_models::{DetailRecord, Filters, ListItem, PaginatedResponse, find_cohort};

use crate::fixtures::{detail_record, resource_url};

/// Calls observed by a [`FakeCatalog`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallLog {
    /// Pages requested through `list_page`, in call order.
    pub list_pages: Vec<u32>,
    /// Ids requested through `get_by_id`, in call order.
    pub detail_ids: Vec<u32>,
    /// Queries passed to `search_by_name`.
    pub searches: Vec<String>,
}

#[derive(Debug, Default)]
struct Behaviour {
    failing_pages: HashSet<u32>,
    failing_ids: HashSet<u32>,
    superseded_pages: HashSet<u32>,
    list_delays: HashMap<u32, Duration>,
    search_delay: Option<Duration>,
}

/// Catalog whose ids are `1..=N` in list order.
///
/// Pages, cohort clipping, and search mirror the HTTP client; individual pages
/// or ids can be made to fail, be superseded, or respond slowly.
#[derive(Debug)]
pub struct FakeCatalog {
    records: Vec<Arc<DetailRecord>>,
    page_size: u32,
    search_limit: usize,
    calls: Mutex<CallLog>,
    behaviour: Mutex<Behaviour>,
}

impl FakeCatalog {
    /// Catalog of `count` generated records named `mon-{id}`.
    #[must_use]
    pub fn with_count(count: u32, page_size: u32) -> Self {
        let records = (1..=count)
            .map(|id| detail_record(id, &format!("mon-{id}")))
            .collect();
        Self::from_records(records, page_size)
    }

    /// Catalog over explicit records; ids must run `1..=N` in order.
    #[must_use]
    pub fn from_records(records: Vec<DetailRecord>, page_size: u32) -> Self {
        Self {
            records: records.into_iter().map(Arc::new).collect(),
            page_size,
            search_limit: 20,
            calls: Mutex::new(CallLog::default()),
            behaviour: Mutex::new(Behaviour::default()),
        }
    }

    /// Snapshot of the calls made so far.
    #[must_use]
    pub fn calls(&self) -> CallLog {
        self.lock_calls().clone()
    }

    /// Make `list_page(page)` fail with an API error.
    pub fn fail_page(&self, page: u32) {
        self.lock_behaviour().failing_pages.insert(page);
    }

    /// Let `list_page(page)` succeed again.
    pub fn heal_page(&self, page: u32) {
        self.lock_behaviour().failing_pages.remove(&page);
    }

    /// Make `get_by_id(id)` fail with an API error.
    pub fn fail_id(&self, id: u32) {
        self.lock_behaviour().failing_ids.insert(id);
    }

    /// Report `list_page(page)` as superseded.
    pub fn supersede_page(&self, page: u32) {
        self.lock_behaviour().superseded_pages.insert(page);
    }

    /// Delay `list_page(page)` by `delay`.
    pub fn delay_page(&self, page: u32, delay: Duration) {
        self.lock_behaviour().list_delays.insert(page, delay);
    }

    /// Delay every search by `delay`.
    pub fn delay_search(&self, delay: Duration) {
        self.lock_behaviour().search_delay = Some(delay);
    }

    fn lock_calls(&self) -> MutexGuard<'_, CallLog> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_behaviour(&self) -> MutexGuard<'_, Behaviour> {
        self.behaviour.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn list_item(record: &DetailRecord) -> ListItem {
        ListItem {
            name: record.name.clone(),
            url: resource_url(record.id),
        }
    }
}

#[async_trait]
impl CatalogSource for FakeCatalog {
    async fn list_page(
        &self,
        page: u32,
        filters: &Filters,
    ) -> ClientResult<Option<PaginatedResponse<ListItem>>> {
        self.lock_calls().list_pages.push(page);
        let (delay, failing, superseded) = {
            let behaviour = self.lock_behaviour();
            (
                behaviour.list_delays.get(&page).copied(),
                behaviour.failing_pages.contains(&page),
                behaviour.superseded_pages.contains(&page),
            )
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if failing {
            return Err(ClientError::Api {
                status: 500,
                body: format!("page {page} unavailable"),
            });
        }
        if superseded {
            return Ok(None);
        }

        let cohort = filters.cohort.as_deref().and_then(find_cohort);
        let window = list_window(page, self.page_size, cohort);
        let total = u32::try_from(self.records.len()).unwrap_or(u32::MAX);
        let results = self
            .records
            .iter()
            .skip(window.offset as usize)
            .take(window.limit as usize)
            .map(|record| Self::list_item(record))
            .collect();
        Ok(Some(PaginatedResponse {
            count: window.count_override.unwrap_or(total),
            next: None,
            previous: None,
            results,
        }))
    }

    async fn get_by_id(&self, id: u32) -> ClientResult<Arc<DetailRecord>> {
        self.lock_calls().detail_ids.push(id);
        if self.lock_behaviour().failing_ids.contains(&id) {
            return Err(ClientError::Api {
                status: 503,
                body: format!("detail {id} unavailable"),
            });
        }
        self.records
            .iter()
            .find(|record| record.id == id)
            .cloned()
            .ok_or_else(|| ClientError::Api {
                status: 404,
                body: "Not Found".to_string(),
            })
    }

    async fn search_by_name(&self, query: &str) -> Vec<Arc<DetailRecord>> {
        self.lock_calls().searches.push(query.to_string());
        let delay = self.lock_behaviour().search_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.records
            .iter()
            .filter(|record| record.name.to_lowercase().contains(&needle))
            .take(self.search_limit)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pages_follow_list_order_and_report_total() {
        let catalog = FakeCatalog::with_count(45, 20);
        let page = catalog
            .list_page(3, &Filters::default())
            .await
            .expect("page")
            .expect("current");

        assert_eq!(page.count, 45);
        let ids: Vec<u32> = page.results.iter().map(ListItem::id).collect();
        assert_eq!(ids, (41..=45).collect::<Vec<_>>());
        assert_eq!(catalog.calls().list_pages, vec![3]);
    }

    #[tokio::test]
    async fn configured_failures_surface() {
        let catalog = FakeCatalog::with_count(5, 20);
        catalog.fail_id(2);
        catalog.supersede_page(1);

        assert!(catalog.get_by_id(2).await.is_err());
        assert_eq!(catalog.get_by_id(3).await.expect("record").id, 3);
        assert_eq!(catalog.list_page(1, &Filters::default()).await, Ok(None));
    }
}
