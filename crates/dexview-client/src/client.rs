//! Typed catalog calls over HTTP.
//!
//! # Design
//! - Detail lookups by id go through the [`RequestBatcher`] and land in an
//!   in-memory cache; lookups by name bypass both.
//! - List pages run under [`LIST_CANCEL_KEY`] and the search listing under
//!   [`SEARCH_CANCEL_KEY`], so a newer request of the same kind supersedes
//!   the older one. Superseded pages surface as `Ok(None)`.
//! - Cohort filters are translated into offset/limit windows; category
//!   filters are left to the view layer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use dexview_config::CatalogConfig;
use dexview_models::{Cohort, DetailRecord, Filters, ListItem, PaginatedResponse, find_cohort};
use futures_util::future::try_join_all;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::batcher::{BatchSettings, BulkFetch, RequestBatcher, fetch_in_chunks};
use crate::cancel::CancellationRegistry;
use crate::error::{ClientError, ClientResult};
use crate::timer::{Timer, TokioTimer};

/// Cancellation key shared by list page requests.
pub const LIST_CANCEL_KEY: &str = "list";
/// Cancellation key shared by search listing requests.
pub const SEARCH_CANCEL_KEY: &str = "search";

/// Offset/limit window for one list page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListWindow {
    /// Zero-based offset into the full listing.
    pub offset: u32,
    /// Entries to request; zero means the page lies past the cohort.
    pub limit: u32,
    /// Total reported to callers in place of the remote count.
    pub count_override: Option<u32>,
}

/// Compute the window for `page` (1-based, zero treated as one).
///
/// With a cohort the window is clipped to the cohort's id range and the
/// reported total becomes the cohort size.
#[must_use]
pub fn list_window(page: u32, page_size: u32, cohort: Option<&Cohort>) -> ListWindow {
    let skipped = page.max(1).saturating_sub(1).saturating_mul(page_size);
    match cohort {
        None => ListWindow {
            offset: skipped,
            limit: page_size,
            count_override: None,
        },
        Some(cohort) => {
            let offset = (cohort.min_id - 1).saturating_add(skipped);
            let limit = cohort.max_id.saturating_sub(offset).min(page_size);
            ListWindow {
                offset,
                limit,
                count_override: Some(cohort.len()),
            }
        }
    }
}

/// Shared HTTP plumbing: URL building, timing, status classification.
#[derive(Debug)]
struct HttpGateway {
    http: Client,
    config: CatalogConfig,
}

impl HttpGateway {
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ClientResult<T> {
        let url = self.config.endpoint(path);
        let started = Instant::now();
        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|err| ClientError::from_transport(&err))?;
        self.record_latency(path, started.elapsed());

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(path, status = status.as_u16(), "catalog returned error status");
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|err| ClientError::from_transport(&err))
    }

    fn record_latency(&self, path: &str, elapsed: Duration) {
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        if elapsed > self.config.slow_call_threshold {
            warn!(path, elapsed_ms, "slow catalog call");
        } else {
            debug!(path, elapsed_ms, "catalog call completed");
        }
    }

    async fn detail(&self, key: &str) -> ClientResult<DetailRecord> {
        self.get_json(&format!("pokemon/{key}"), &[]).await
    }
}

struct DetailFetcher {
    gateway: Arc<HttpGateway>,
}

#[async_trait]
impl BulkFetch<Arc<DetailRecord>> for DetailFetcher {
    async fn fetch_many(&self, ids: Vec<u32>) -> ClientResult<Vec<Arc<DetailRecord>>> {
        let gateway = &self.gateway;
        let records = fetch_in_chunks(&ids, gateway.config.chunk_size, |id| async move {
            gateway.detail(&id.to_string()).await.map(Arc::new)
        })
        .await?;
        Ok(records)
    }
}

/// Catalog client with batching, caching, and supersession.
///
/// Cheap to clone; clones share the batch worker and caches.
#[derive(Debug, Clone)]
pub struct ResourceClient {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    gateway: Arc<HttpGateway>,
    batcher: RequestBatcher<Arc<DetailRecord>>,
    cancellations: CancellationRegistry,
    details: Mutex<HashMap<u32, Arc<DetailRecord>>>,
    listing: Mutex<Option<Arc<Vec<ListItem>>>>,
}

impl ResourceClient {
    /// Build a client on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration is invalid or the HTTP client
    /// cannot be constructed.
    pub fn new(config: CatalogConfig) -> Result<Self> {
        Self::with_timer(config, Arc::new(TokioTimer))
    }

    /// Build a client whose batch window is driven by `timer`.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration is invalid or the HTTP client
    /// cannot be constructed.
    pub fn with_timer(config: CatalogConfig, timer: Arc<dyn Timer>) -> Result<Self> {
        config.validate().context("invalid catalog configuration")?;
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("failed to build HTTP client")?;
        let settings = BatchSettings {
            max_batch: config.batch_size,
            delay: config.batch_delay,
        };
        let gateway = Arc::new(HttpGateway { http, config });
        let batcher = RequestBatcher::spawn(
            DetailFetcher {
                gateway: Arc::clone(&gateway),
            },
            settings,
            timer,
        );
        Ok(Self {
            inner: Arc::new(ClientInner {
                gateway,
                batcher,
                cancellations: CancellationRegistry::new(),
                details: Mutex::new(HashMap::new()),
                listing: Mutex::new(None),
            }),
        })
    }

    /// Configuration the client was built with.
    #[must_use]
    pub fn config(&self) -> &CatalogConfig {
        &self.inner.gateway.config
    }

    /// Fetch one list page, clipped to the cohort filter when one is set.
    ///
    /// Returns `Ok(None)` when a newer list request superseded this one.
    ///
    /// # Errors
    ///
    /// Returns network, API, timeout, or decode failures.
    pub async fn list_page(
        &self,
        page: u32,
        filters: &Filters,
    ) -> ClientResult<Option<PaginatedResponse<ListItem>>> {
        let cohort = filters.cohort.as_deref().and_then(find_cohort);
        let window = list_window(page, self.config().page_size, cohort);
        if window.limit == 0 {
            debug!(page, "page lies past the cohort; skipping request");
            self.inner.cancellations.cancel(LIST_CANCEL_KEY);
            return Ok(Some(PaginatedResponse::empty(
                window.count_override.unwrap_or(0),
            )));
        }

        let ticket = self.inner.cancellations.begin(LIST_CANCEL_KEY);
        let query = [
            ("limit", window.limit.to_string()),
            ("offset", window.offset.to_string()),
        ];
        let outcome = ticket
            .run(
                self.inner
                    .gateway
                    .get_json::<PaginatedResponse<ListItem>>("pokemon", &query),
            )
            .await;
        match outcome {
            Ok(mut response) => {
                if let Some(count) = window.count_override {
                    response.count = count;
                }
                Ok(Some(response))
            }
            Err(err) if err.is_canceled() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Resolve a full record by id, coalescing concurrent lookups.
    ///
    /// # Errors
    ///
    /// Returns the batch failure for this id.
    pub async fn get_by_id(&self, id: u32) -> ClientResult<Arc<DetailRecord>> {
        if let Some(record) = self.cached(id) {
            return Ok(record);
        }
        let record = self.inner.batcher.request(id).await?;
        Ok(self.remember(record))
    }

    /// Resolve several ids through the batcher, preserving order.
    ///
    /// # Errors
    ///
    /// Returns the first failure among the lookups.
    pub async fn get_many(&self, ids: &[u32]) -> ClientResult<Vec<Arc<DetailRecord>>> {
        try_join_all(ids.iter().map(|id| self.get_by_id(*id))).await
    }

    /// Resolve a record by name without batching.
    ///
    /// # Errors
    ///
    /// Returns network, API, timeout, or decode failures.
    pub async fn get_by_name(&self, name: &str) -> ClientResult<Arc<DetailRecord>> {
        let key: String =
            url::form_urlencoded::byte_serialize(name.trim().to_lowercase().as_bytes()).collect();
        let record = self.inner.gateway.detail(&key).await?;
        Ok(self.remember(Arc::new(record)))
    }

    /// Full name listing used by search, fetched once and cached.
    ///
    /// Returns `Ok(None)` when a newer search superseded this fetch.
    ///
    /// # Errors
    ///
    /// Returns network, API, timeout, or decode failures.
    pub async fn list_all(&self) -> ClientResult<Option<Arc<Vec<ListItem>>>> {
        if let Some(listing) = self.lock_listing().clone() {
            return Ok(Some(listing));
        }
        let ticket = self.inner.cancellations.begin(SEARCH_CANCEL_KEY);
        let query = [
            ("limit", self.config().search_listing_limit.to_string()),
            ("offset", "0".to_string()),
        ];
        let outcome = ticket
            .run(
                self.inner
                    .gateway
                    .get_json::<PaginatedResponse<ListItem>>("pokemon", &query),
            )
            .await;
        match outcome {
            Ok(response) => {
                let listing = Arc::new(response.results);
                *self.lock_listing() = Some(Arc::clone(&listing));
                Ok(Some(listing))
            }
            Err(err) if err.is_canceled() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Case-insensitive substring search over names.
    ///
    /// Matches are capped at the configured search limit and resolved to full
    /// records. Failures degrade to an empty result.
    pub async fn search_by_name(&self, query: &str) -> Vec<Arc<DetailRecord>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        match self.try_search(&needle).await {
            Ok(records) => records,
            Err(err) if err.is_canceled() => {
                debug!(query = %needle, "search superseded");
                Vec::new()
            }
            Err(err) => {
                warn!(error = %err, query = %needle, "search failed; returning no results");
                Vec::new()
            }
        }
    }

    async fn try_search(&self, needle: &str) -> ClientResult<Vec<Arc<DetailRecord>>> {
        let Some(listing) = self.list_all().await? else {
            return Err(ClientError::Canceled);
        };
        let ids: Vec<u32> = listing
            .iter()
            .filter(|item| item.name.to_lowercase().contains(needle))
            .map(ListItem::id)
            .filter(|id| *id > 0)
            .take(self.config().search_limit)
            .collect();
        debug!(query = %needle, matches = ids.len(), "resolving search matches");
        self.get_many(&ids).await
    }

    /// Cancel the in-flight request under `key`, if any.
    pub fn cancel(&self, key: &str) {
        self.inner.cancellations.cancel(key);
    }

    /// Cached record for `id`, if one was fetched earlier.
    #[must_use]
    pub fn cached(&self, id: u32) -> Option<Arc<DetailRecord>> {
        self.lock_details().get(&id).cloned()
    }

    /// Number of bulk dispatches issued by the batcher.
    #[must_use]
    pub fn dispatch_count(&self) -> u64 {
        self.inner.batcher.dispatch_count()
    }

    fn remember(&self, record: Arc<DetailRecord>) -> Arc<DetailRecord> {
        let mut details = self.lock_details();
        Arc::clone(details.entry(record.id).or_insert(record))
    }

    fn lock_details(&self) -> std::sync::MutexGuard<'_, HashMap<u32, Arc<DetailRecord>>> {
        self.inner
            .details
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_listing(&self) -> std::sync::MutexGuard<'_, Option<Arc<Vec<ListItem>>>> {
        self.inner
            .listing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::{Value, json};

    fn detail_json(id: u32, name: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "height": 7,
            "weight": 69,
            "base_experience": 64,
            "sprites": {"front_default": format!("https://img.test/{id}.png")},
            "types": [{"slot": 1, "type": {"name": "grass", "url": ""}}],
            "abilities": [],
            "stats": []
        })
    }

    fn list_json(count: u32, names: &[(&str, u32)]) -> Value {
        let results: Vec<Value> = names
            .iter()
            .map(|(name, id)| {
                json!({"name": name, "url": format!("https://pokeapi.co/api/v2/pokemon/{id}/")})
            })
            .collect();
        json!({"count": count, "next": null, "previous": null, "results": results})
    }

    fn client_for(server: &MockServer) -> ResourceClient {
        let config = CatalogConfig {
            api_base_url: server.base_url(),
            batch_delay: Duration::from_millis(20),
            ..CatalogConfig::default()
        };
        ResourceClient::new(config).expect("client")
    }

    #[test]
    fn window_without_cohort_is_plain_paging() {
        assert_eq!(
            list_window(3, 20, None),
            ListWindow {
                offset: 40,
                limit: 20,
                count_override: None
            }
        );
        assert_eq!(list_window(0, 20, None).offset, 0);
    }

    #[test]
    fn window_is_clipped_to_cohort() {
        let first = find_cohort("1");
        assert_eq!(
            list_window(8, 20, first),
            ListWindow {
                offset: 140,
                limit: 11,
                count_override: Some(151)
            }
        );
        assert_eq!(list_window(9, 20, first).limit, 0);

        let second = find_cohort("2");
        let window = list_window(1, 20, second);
        assert_eq!((window.offset, window.limit), (151, 20));
    }

    #[tokio::test]
    async fn list_page_requests_offset_and_limit() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/pokemon")
                .query_param("limit", "20")
                .query_param("offset", "20");
            then.status(200)
                .json_body(list_json(1302, &[("ivysaur", 2), ("venusaur", 3)]));
        });

        let client = client_for(&server);
        let page = client
            .list_page(2, &Filters::default())
            .await
            .expect("page")
            .expect("not superseded");

        mock.assert();
        assert_eq!(page.count, 1302);
        assert_eq!(page.results[1].id(), 3);
    }

    #[tokio::test]
    async fn cohort_pages_report_cohort_size() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/pokemon")
                .query_param("limit", "11")
                .query_param("offset", "140");
            then.status(200).json_body(list_json(1302, &[("mew", 151)]));
        });

        let client = client_for(&server);
        let filters = Filters {
            cohort: Some("1".into()),
            ..Filters::default()
        };
        let page = client
            .list_page(8, &filters)
            .await
            .expect("page")
            .expect("not superseded");
        mock.assert();
        assert_eq!(page.count, 151);

        let past_end = client
            .list_page(9, &filters)
            .await
            .expect("page")
            .expect("not superseded");
        assert!(past_end.results.is_empty());
        assert_eq!(past_end.count, 151);
        mock.assert_calls(1);
    }

    #[tokio::test]
    async fn newer_list_request_supersedes_older_one() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/pokemon").query_param("offset", "0");
            then.status(200)
                .delay(Duration::from_millis(300))
                .json_body(list_json(40, &[("bulbasaur", 1)]));
        });
        server.mock(|when, then| {
            when.method(GET).path("/pokemon").query_param("offset", "20");
            then.status(200).json_body(list_json(40, &[("spearow", 21)]));
        });

        let client = client_for(&server);
        let filters = Filters::default();
        let (first, second) = tokio::join!(client.list_page(1, &filters), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            client.list_page(2, &filters).await
        });

        assert_eq!(first, Ok(None));
        let second = second.expect("page").expect("current");
        assert_eq!(second.results[0].name, "spearow");
    }

    #[tokio::test]
    async fn page_past_the_cohort_still_supersedes_older_requests() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/pokemon").query_param("offset", "0");
            then.status(200)
                .delay(Duration::from_millis(300))
                .json_body(list_json(1302, &[("bulbasaur", 1)]));
        });

        let client = client_for(&server);
        let cohort = Filters {
            cohort: Some("1".into()),
            ..Filters::default()
        };
        let default_filters = Filters::default();
        let (first, past_end) = tokio::join!(client.list_page(1, &default_filters), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            client.list_page(9, &cohort).await
        });

        assert_eq!(first, Ok(None));
        let past_end = past_end.expect("page").expect("current");
        assert!(past_end.results.is_empty());
        assert_eq!(past_end.count, 151);
    }

    #[tokio::test]
    async fn concurrent_lookups_share_one_dispatch_and_cache() {
        let server = MockServer::start_async().await;
        let mocks: Vec<_> = [1, 4, 7]
            .into_iter()
            .map(|id| {
                server.mock(|when, then| {
                    when.method(GET).path(format!("/pokemon/{id}"));
                    then.status(200).json_body(detail_json(id, &format!("mon-{id}")));
                })
            })
            .collect();

        let client = client_for(&server);
        let records = client.get_many(&[1, 4, 7]).await.expect("records");
        assert_eq!(
            records.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![1, 4, 7]
        );
        assert_eq!(client.dispatch_count(), 1);

        let again = client.get_by_id(4).await.expect("cached");
        assert_eq!(again.name, "mon-4");
        for mock in &mocks {
            mock.assert_calls(1);
        }
    }

    #[tokio::test]
    async fn get_by_name_bypasses_the_batcher() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET).path("/pokemon/pikachu");
            then.status(200).json_body(detail_json(25, "pikachu"));
        });

        let client = client_for(&server);
        let record = client.get_by_name(" Pikachu ").await.expect("record");

        mock.assert();
        assert_eq!(record.id, 25);
        assert_eq!(client.dispatch_count(), 0);
        assert!(client.cached(25).is_some());
    }

    #[tokio::test]
    async fn api_errors_carry_status_and_body() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/pokemon/missingno");
            then.status(404).body("Not Found");
        });

        let client = client_for(&server);
        let err = client.get_by_name("missingno").await.expect_err("404");
        assert_eq!(
            err,
            ClientError::Api {
                status: 404,
                body: "Not Found".into()
            }
        );
    }

    #[tokio::test]
    async fn slow_responses_time_out() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/pokemon/slowpoke");
            then.status(200)
                .delay(Duration::from_millis(500))
                .json_body(detail_json(79, "slowpoke"));
        });

        let config = CatalogConfig {
            api_base_url: server.base_url(),
            request_timeout: Duration::from_millis(100),
            ..CatalogConfig::default()
        };
        let client = ResourceClient::new(config).expect("client");
        let err = client.get_by_name("slowpoke").await.expect_err("timeout");
        assert_eq!(err, ClientError::Timeout);
    }

    #[tokio::test]
    async fn malformed_bodies_are_decode_errors() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/pokemon/glitch");
            then.status(200).body("not json");
        });

        let client = client_for(&server);
        let err = client.get_by_name("glitch").await.expect_err("decode");
        assert!(matches!(err, ClientError::Decode { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn unreachable_remote_is_a_network_error() {
        let config = CatalogConfig {
            api_base_url: "http://127.0.0.1:9".into(),
            ..CatalogConfig::default()
        };
        let client = ResourceClient::new(config).expect("client");
        let err = client.get_by_name("bulbasaur").await.expect_err("network");
        assert!(matches!(err, ClientError::Network { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn search_matches_case_insensitively_and_resolves_records() {
        let server = MockServer::start_async().await;
        let listing = server.mock(|when, then| {
            when.method(GET).path("/pokemon").query_param("limit", "1500");
            then.status(200).json_body(list_json(
                4,
                &[
                    ("charmander", 4),
                    ("charmeleon", 5),
                    ("pikachu", 25),
                    ("charizard", 6),
                ],
            ));
        });
        for (id, name) in [(4, "charmander"), (5, "charmeleon"), (6, "charizard")] {
            server.mock(|when, then| {
                when.method(GET).path(format!("/pokemon/{id}"));
                then.status(200).json_body(detail_json(id, name));
            });
        }

        let client = client_for(&server);
        let results = client.search_by_name("CHAR").await;
        let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["charmander", "charmeleon", "charizard"]);

        let again = client.search_by_name("char").await;
        assert_eq!(again.len(), 3);
        listing.assert_calls(1);
    }

    #[tokio::test]
    async fn search_caps_matches_at_the_limit() {
        let server = MockServer::start_async().await;
        let names: Vec<(String, u32)> = (1..=25).map(|id| (format!("char{id}"), id)).collect();
        let borrowed: Vec<(&str, u32)> = names.iter().map(|(n, id)| (n.as_str(), *id)).collect();
        server.mock(|when, then| {
            when.method(GET).path("/pokemon").query_param("limit", "1500");
            then.status(200).json_body(list_json(25, &borrowed));
        });
        let detail_mocks: Vec<_> = (1..=25)
            .map(|id| {
                server.mock(|when, then| {
                    when.method(GET).path(format!("/pokemon/{id}"));
                    then.status(200).json_body(detail_json(id, &format!("char{id}")));
                })
            })
            .collect();

        let client = client_for(&server);
        let results = client.search_by_name("char").await;

        assert_eq!(results.len(), 20);
        assert_eq!(results[19].id, 20);
        detail_mocks[20].assert_calls(0);
    }

    #[tokio::test]
    async fn search_failures_degrade_to_empty() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/pokemon");
            then.status(500).body("boom");
        });

        let client = client_for(&server);
        assert!(client.search_by_name("char").await.is_empty());
        assert!(client.search_by_name("   ").await.is_empty());
    }
}
