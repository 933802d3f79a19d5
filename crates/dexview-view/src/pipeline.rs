//! Derived list pipeline: one consistent view over browse pages, search
//! results, and favorites.
//!
//! # Design
//! - All mutable state sits behind one mutex that is never held across an
//!   `.await`; every async step re-checks the epoch before writing back.
//! - The epoch advances whenever the data source changes (mode, search
//!   query, or cohort). Results carrying an older epoch are dropped.
//! - Category and sort changes only re-run the transform over data already
//!   loaded.
//! - Browse pagination is `Idle -> FetchingPage -> Idle`. A failed page keeps
//!   `has_more` and records the error; nothing retries on its own.
//! - Browse keeps prefetching while resolved items outrun the loaded ids,
//!   until the ratio drops or the source runs out.
//! - Query edits wait out `search_debounce` before searching; an edit that
//!   lands during the wait moves the epoch and the older search never runs.
//! - [`ViewPipeline::spawn_favorites_sync`] keeps favorites mode in line with
//!   the personalization store.
//! - Snapshots are published on a `watch` channel after every transition.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use dexview_client::{CatalogSource, ClientError, Timer, TokioTimer};
use dexview_config::CatalogConfig;
use dexview_models::{DetailRecord, Filters, PageState, SortSpec};
use dexview_store::{PersonalizationEvent, PersonalizationStore};
use futures_util::future::join_all;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::snapshot::{ViewMode, ViewSnapshot};
use crate::transform::derive_view;
use crate::url;

/// Tunables for the pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineSettings {
    /// Entries per browse page.
    pub page_size: u32,
    /// Highest id kept in browse mode.
    pub max_id: u32,
    /// Resolved/loaded ratio above which the next page is prefetched.
    pub prefetch_ratio: f64,
    /// Quiet period after a query edit before the search starts.
    pub search_debounce: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from(&CatalogConfig::default())
    }
}

impl From<&CatalogConfig> for PipelineSettings {
    fn from(config: &CatalogConfig) -> Self {
        Self {
            page_size: config.page_size,
            max_id: config.max_id,
            prefetch_ratio: config.prefetch_ratio,
            search_debounce: config.search_debounce,
        }
    }
}

/// Identity of the data currently loaded; a change starts a new epoch.
#[derive(Debug, Clone, PartialEq, Eq)]
enum DataSource {
    Browse { cohort: Option<String> },
    Search { query: String },
    Favorites,
}

impl DataSource {
    fn for_state(state: &PageState) -> Self {
        match ViewMode::for_state(state) {
            ViewMode::Search => Self::Search {
                query: state.active_query().unwrap_or_default().to_string(),
            },
            ViewMode::Favorites => Self::Favorites,
            ViewMode::Browse => Self::Browse {
                cohort: state.filters.cohort.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum FetchPhase {
    #[default]
    Idle,
    FetchingPage,
}

#[derive(Debug, Default)]
struct BrowseState {
    phase: FetchPhase,
    pages_loaded: u32,
    count: Option<u32>,
    raw_ids: Vec<u32>,
    requested: HashSet<u32>,
    details: HashMap<u32, Arc<DetailRecord>>,
}

impl BrowseState {
    fn has_more(&self, page_size: u32) -> bool {
        self.count.is_none_or(|count| {
            u64::from(self.pages_loaded) * u64::from(page_size) < u64::from(count)
        })
    }

    fn resolved(&self) -> impl Iterator<Item = Arc<DetailRecord>> + '_ {
        self.raw_ids
            .iter()
            .filter_map(|id| self.details.get(id).cloned())
    }

    fn unresolved(&self) -> Vec<u32> {
        self.raw_ids
            .iter()
            .copied()
            .filter(|id| !self.requested.contains(id))
            .collect()
    }
}

#[derive(Debug)]
struct PipelineState {
    page: PageState,
    source: Option<DataSource>,
    epoch: u64,
    browse: BrowseState,
    records: Vec<Arc<DetailRecord>>,
    loading: bool,
    error: Option<ClientError>,
}

impl PipelineState {
    fn mode(&self) -> ViewMode {
        ViewMode::for_state(&self.page)
    }

    fn reset(&mut self, source: DataSource) {
        self.source = Some(source);
        self.epoch += 1;
        self.browse = BrowseState::default();
        self.records.clear();
        self.loading = false;
        self.error = None;
    }

    fn visible(&self) -> Vec<Arc<DetailRecord>> {
        let category = self.page.filters.category.as_deref();
        match self.mode() {
            ViewMode::Browse => derive_view(self.browse.resolved(), category, &self.page.sort),
            ViewMode::Search | ViewMode::Favorites => {
                derive_view(self.records.iter().cloned(), category, &self.page.sort)
            }
        }
    }
}

/// Reconciles page state, remote data, and favorites into [`ViewSnapshot`]s.
pub struct ViewPipeline {
    catalog: Arc<dyn CatalogSource>,
    personalization: Arc<PersonalizationStore>,
    settings: PipelineSettings,
    timer: Arc<dyn Timer>,
    state: Mutex<PipelineState>,
    snapshots: watch::Sender<ViewSnapshot>,
}

impl std::fmt::Debug for ViewPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewPipeline")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl ViewPipeline {
    /// Build an idle pipeline; call [`ViewPipeline::apply_url`] to start.
    #[must_use]
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        personalization: Arc<PersonalizationStore>,
        settings: PipelineSettings,
    ) -> Self {
        let (snapshots, _) = watch::channel(ViewSnapshot::default());
        Self {
            catalog,
            personalization,
            settings,
            timer: Arc::new(TokioTimer),
            state: Mutex::new(PipelineState {
                page: PageState::default(),
                source: None,
                epoch: 0,
                browse: BrowseState::default(),
                records: Vec::new(),
                loading: false,
                error: None,
            }),
            snapshots,
        }
    }

    /// Receive every published snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ViewSnapshot> {
        self.snapshots.subscribe()
    }

    /// Latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> ViewSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Current page state.
    #[must_use]
    pub fn page_state(&self) -> PageState {
        self.lock().page.clone()
    }

    /// Canonical query string for the current page state.
    #[must_use]
    pub fn current_url(&self) -> String {
        url::serialize(&self.lock().page)
    }

    /// Adopt the state encoded in `query` and return its canonical form.
    pub async fn apply_url(&self, query: &str) -> String {
        self.apply_state(url::parse(query), Duration::ZERO).await
    }

    /// Replace the free-text query.
    pub async fn set_query(&self, query: &str) -> String {
        let mut next = self.page_state();
        query.clone_into(&mut next.query);
        next.page = 1;
        self.apply_state(next, self.settings.search_debounce).await
    }

    /// Replace the filters.
    pub async fn set_filters(&self, filters: Filters) -> String {
        let mut next = self.page_state();
        next.filters = filters;
        next.page = 1;
        self.apply_state(next, Duration::ZERO).await
    }

    /// Replace the ordering.
    pub async fn set_sort(&self, sort: SortSpec) -> String {
        let mut next = self.page_state();
        next.sort = sort;
        self.apply_state(next, Duration::ZERO).await
    }

    /// Flip the favorites-only filter.
    pub async fn toggle_favorites_only(&self) -> String {
        let mut next = self.page_state();
        next.filters.favorites_only = !next.filters.favorites_only;
        next.page = 1;
        self.apply_state(next, Duration::ZERO).await
    }

    /// Return to the default state.
    pub async fn clear_all(&self) -> String {
        self.apply_state(PageState::default(), Duration::ZERO).await
    }

    /// Sentinel near the end of the list became visible.
    pub async fn on_sentinel_visible(&self) {
        if self.load_next_page().await {
            self.maybe_prefetch().await;
        }
    }

    /// Retry after a failure.
    ///
    /// Browse mode re-requests the failed page and any unresolved ids;
    /// search and favorites reload from scratch.
    pub async fn retry(&self) {
        let mode = {
            let mut state = self.lock();
            state.error = None;
            state.mode()
        };
        self.publish();
        match mode {
            ViewMode::Browse => {
                self.resolve_pending().await;
                if self.load_next_page().await {
                    self.maybe_prefetch().await;
                }
            }
            ViewMode::Search | ViewMode::Favorites => self.reload().await,
        }
    }

    /// Reload the active source from scratch under a new epoch.
    pub async fn reload(&self) {
        let source = {
            let mut state = self.lock();
            let source = DataSource::for_state(&state.page);
            state.reset(source.clone());
            source
        };
        self.load_source(source, Duration::ZERO).await;
    }

    /// Follow favorites changes while the pipeline is alive.
    ///
    /// In favorites mode newly added ids are resolved and removed ones are
    /// dropped, under the epoch current when the change arrived. The task
    /// exits on the first change after the pipeline is dropped, or when the
    /// store goes away.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn spawn_favorites_sync(self: &Arc<Self>) -> JoinHandle<()> {
        let mut events = self.personalization.subscribe();
        let pipeline: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(PersonalizationEvent::FavoritesChanged { ids }) => {
                        debug!(count = ids.len(), "favorites changed");
                    }
                    Ok(_) => continue,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "favorites listener lagged; resyncing");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
                let Some(pipeline) = pipeline.upgrade() else {
                    break;
                };
                pipeline.sync_favorites(false).await;
            }
        })
    }

    async fn apply_state(&self, next: PageState, debounce: Duration) -> String {
        let canonical = url::serialize(&next);
        let source = DataSource::for_state(&next);
        let changed = {
            let mut state = self.lock();
            state.page = next;
            let changed = state.source.as_ref() != Some(&source);
            if changed {
                state.reset(source.clone());
            }
            changed
        };

        if changed {
            info!(url = %canonical, "view source changed");
            self.load_source(source, debounce).await;
        } else {
            debug!(url = %canonical, "view reshaped");
            self.publish();
            self.maybe_prefetch().await;
        }
        canonical
    }

    async fn load_source(&self, source: DataSource, debounce: Duration) {
        match source {
            DataSource::Search { query } => self.load_search(&query, debounce).await,
            DataSource::Favorites => self.load_favorites().await,
            DataSource::Browse { .. } => {
                if self.load_next_page().await {
                    self.maybe_prefetch().await;
                }
            }
        }
    }

    async fn load_search(&self, query: &str, debounce: Duration) {
        let epoch = self.begin_loading();
        if !debounce.is_zero() {
            self.timer.sleep(debounce).await;
            let current = self.lock().epoch;
            if current != epoch {
                debug!(query, "query edited again while debouncing");
                return;
            }
        }
        let results = self.catalog.search_by_name(query).await;
        let mut state = self.lock();
        if state.epoch != epoch {
            debug!(query, "discarding stale search results");
            return;
        }
        debug!(query, results = results.len(), "search resolved");
        state.records = results;
        state.loading = false;
        drop(state);
        self.publish();
    }

    async fn load_favorites(&self) {
        self.begin_loading();
        self.sync_favorites(true).await;
    }

    /// Reconcile the favorites view with the store: resolve ids not yet
    /// held and drop records no longer favorited.
    async fn sync_favorites(&self, finish_loading: bool) {
        let (epoch, missing) = {
            let state = self.lock();
            if state.mode() != ViewMode::Favorites {
                return;
            }
            let held: HashSet<u32> = state.records.iter().map(|record| record.id).collect();
            let missing: Vec<u32> = self
                .personalization
                .favorite_ids()
                .into_iter()
                .filter(|id| !held.contains(id))
                .collect();
            (state.epoch, missing)
        };
        let outcomes = join_all(missing.iter().map(|id| self.catalog.get_by_id(*id))).await;

        let mut state = self.lock();
        if state.epoch != epoch {
            debug!("discarding stale favorites");
            return;
        }
        let mut by_id: HashMap<u32, Arc<DetailRecord>> = state
            .records
            .drain(..)
            .map(|record| (record.id, record))
            .collect();
        for (id, outcome) in missing.into_iter().zip(outcomes) {
            match outcome {
                Ok(record) => {
                    by_id.insert(id, record);
                }
                Err(err) => {
                    warn!(id, error = %err, "failed to resolve favorite");
                    state.error.get_or_insert(err);
                }
            }
        }
        state.records = self
            .personalization
            .favorite_ids()
            .into_iter()
            .filter_map(|id| by_id.remove(&id))
            .collect();
        if finish_loading {
            state.loading = false;
        }
        drop(state);
        self.publish();
    }

    /// Fetch the next browse page and resolve its ids.
    ///
    /// Returns `true` when a page was applied to the current epoch.
    async fn load_next_page(&self) -> bool {
        let (epoch, page, filters) = {
            let mut state = self.lock();
            if state.mode() != ViewMode::Browse
                || state.browse.phase == FetchPhase::FetchingPage
                || !state.browse.has_more(self.settings.page_size)
            {
                return false;
            }
            state.browse.phase = FetchPhase::FetchingPage;
            state.loading = true;
            (
                state.epoch,
                state.browse.pages_loaded + 1,
                state.page.filters.clone(),
            )
        };
        self.publish();

        let outcome = self.catalog.list_page(page, &filters).await;
        let fresh_ids = {
            let mut state = self.lock();
            if state.epoch != epoch {
                debug!(page, "discarding page from an older epoch");
                return false;
            }
            match outcome {
                Ok(Some(response)) => {
                    let max_id = self.settings.max_id;
                    let browse = &mut state.browse;
                    browse.pages_loaded = page;
                    browse.count = Some(response.count);
                    browse.raw_ids.extend(
                        response
                            .results
                            .iter()
                            .map(dexview_models::ListItem::id)
                            .filter(|id| (1..=max_id).contains(id)),
                    );
                    let fresh = browse.unresolved();
                    browse.requested.extend(fresh.iter().copied());
                    debug!(page, fresh = fresh.len(), "page loaded");
                    fresh
                }
                Ok(None) => {
                    debug!(page, "page request superseded");
                    state.browse.phase = FetchPhase::Idle;
                    state.loading = false;
                    drop(state);
                    self.publish();
                    return false;
                }
                Err(err) => {
                    warn!(page, error = %err, "failed to load page");
                    state.browse.phase = FetchPhase::Idle;
                    state.loading = false;
                    state.error = Some(err);
                    drop(state);
                    self.publish();
                    return false;
                }
            }
        };

        self.resolve_ids(epoch, fresh_ids).await;
        let mut state = self.lock();
        if state.epoch != epoch {
            return false;
        }
        state.browse.phase = FetchPhase::Idle;
        state.loading = false;
        drop(state);
        self.publish();
        true
    }

    /// Re-request browse ids that failed to resolve earlier.
    async fn resolve_pending(&self) {
        let (epoch, pending) = {
            let mut state = self.lock();
            if state.mode() != ViewMode::Browse || state.browse.phase == FetchPhase::FetchingPage
            {
                return;
            }
            let pending = state.browse.unresolved();
            if pending.is_empty() {
                return;
            }
            state.browse.requested.extend(pending.iter().copied());
            state.loading = true;
            (state.epoch, pending)
        };
        self.publish();
        self.resolve_ids(epoch, pending).await;
        let mut state = self.lock();
        if state.epoch == epoch {
            state.loading = false;
            drop(state);
            self.publish();
        }
    }

    async fn resolve_ids(&self, epoch: u64, ids: Vec<u32>) {
        let outcomes = join_all(ids.iter().map(|id| self.catalog.get_by_id(*id))).await;
        let mut state = self.lock();
        if state.epoch != epoch {
            return;
        }
        for (id, outcome) in ids.into_iter().zip(outcomes) {
            match outcome {
                Ok(record) => {
                    state.browse.details.entry(id).or_insert(record);
                }
                Err(err) => {
                    warn!(id, error = %err, "failed to resolve entry");
                    state.browse.requested.remove(&id);
                    state.error.get_or_insert(err);
                }
            }
        }
    }

    /// Keep fetching pages while resolved items outrun the loaded ids.
    async fn maybe_prefetch(&self) {
        while self.prefetch_due() {
            debug!("prefetching next page");
            if !self.load_next_page().await {
                break;
            }
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn prefetch_due(&self) -> bool {
        let state = self.lock();
        if state.mode() != ViewMode::Browse
            || state.browse.raw_ids.is_empty()
            || !state.browse.has_more(self.settings.page_size)
        {
            return false;
        }
        let loaded = state.browse.raw_ids.len() as f64;
        state.visible().len() as f64 > loaded * self.settings.prefetch_ratio
    }

    fn begin_loading(&self) -> u64 {
        let epoch = {
            let mut state = self.lock();
            state.loading = true;
            state.epoch
        };
        self.publish();
        epoch
    }

    fn publish(&self) {
        let snapshot = {
            let state = self.lock();
            let mode = state.mode();
            ViewSnapshot {
                mode,
                items: state.visible(),
                has_more: mode == ViewMode::Browse
                    && state.browse.has_more(self.settings.page_size),
                loading: state.loading,
                error: state.error.clone(),
            }
        };
        self.snapshots.send_replace(snapshot);
    }

    fn lock(&self) -> MutexGuard<'_, PipelineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
