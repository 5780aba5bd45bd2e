//! Per-screen table state and the fetch cycle that keeps it in sync.
//!
//! A [`TableDataController`] owns one screen's sorting, filters, search and
//! pagination. Each [`load`](TableDataController::load) derives a cache key
//! from that state and goes through the shared [`QueryCache`]. While a new
//! page is loading the previous page stays visible; a response that arrives
//! after the cache key has moved on is dropped.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::{BoxFuture, FutureExt};
use projectdesk_api::types::TableResponse;
use projectdesk_api::{
    encode, ColumnFilter, Error, PaginationState, QueryKey, SortDescriptor, TableQueryOptions,
    WireQueryParams,
};

use crate::cache::QueryCache;

/// The screen-supplied fetch function.
pub type FetchFn<T> =
    Arc<dyn Fn(WireQueryParams) -> BoxFuture<'static, Result<TableResponse<T>, Error>> + Send + Sync>;

/// Wraps an async closure as a [`FetchFn`].
pub fn fetch_fn<T, F, Fut>(f: F) -> FetchFn<T>
where
    F: Fn(WireQueryParams) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<TableResponse<T>, Error>> + Send + 'static,
{
    Arc::new(move |params| f(params).boxed())
}

/// What a call to [`TableDataController::load`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A response arrived and is now visible.
    Applied,
    /// A fresh cache entry was shown without a request.
    Cached,
    /// The state changed while waiting; the response was dropped.
    Superseded,
    /// The request failed; the error is visible and old data kept.
    Failed,
    /// Server-side mode is off; nothing was fetched.
    Disabled,
}

/// Render-ready snapshot of a table screen.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView<T> {
    pub data: Vec<T>,
    pub total_count: u64,
    pub page_count: u32,
    /// Fetching with nothing to show yet.
    pub is_loading: bool,
    pub is_fetching: bool,
    pub error: Option<Error>,
    pub sorting: Vec<SortDescriptor>,
    pub column_filters: Vec<ColumnFilter>,
    pub global_filter: String,
    pub pagination: PaginationState,
}

struct ControllerState<T> {
    options: TableQueryOptions,
    /// Cache key of the most recent load still waiting on a response.
    pending: Option<String>,
    visible: Option<TableResponse<T>>,
    error: Option<Error>,
    /// Rows for pass-through mode.
    rows: Vec<T>,
}

pub struct TableDataController<T> {
    namespace: String,
    cache: Arc<QueryCache<TableResponse<T>>>,
    fetch: FetchFn<T>,
    server_side: bool,
    state: Mutex<ControllerState<T>>,
}

impl<T> TableDataController<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(
        namespace: &str,
        cache: Arc<QueryCache<TableResponse<T>>>,
        fetch: FetchFn<T>,
    ) -> Self {
        Self {
            namespace: namespace.to_string(),
            cache,
            fetch,
            server_side: true,
            state: Mutex::new(ControllerState {
                options: TableQueryOptions::default(),
                pending: None,
                visible: None,
                error: None,
                rows: Vec::new(),
            }),
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.state_mut().options.page_size = page_size;
        self
    }

    /// Starts from the given options instead of the defaults.
    pub fn with_options(mut self, options: TableQueryOptions) -> Self {
        self.state_mut().options = options;
        self
    }

    /// With server-side mode off the controller never fetches; it pages
    /// through the rows given to [`with_rows`](Self::with_rows).
    ///
    /// Only pagination is applied to those rows. Sorting, column filters and
    /// the global filter are kept in the view for the caller, who must hand
    /// over rows already sorted and filtered.
    pub fn with_server_side(mut self, enabled: bool) -> Self {
        self.server_side = enabled;
        self
    }

    pub fn with_rows(mut self, rows: Vec<T>) -> Self {
        self.state_mut().rows = rows;
        self
    }

    fn state_mut(&mut self) -> &mut ControllerState<T> {
        self.state.get_mut().unwrap_or_else(|e| e.into_inner())
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState<T>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_server_side(&self) -> bool {
        self.server_side
    }

    fn key_of(&self, options: &TableQueryOptions) -> String {
        QueryKey::new(&self.namespace, encode(options)).to_string()
    }

    fn update(&self, f: impl FnOnce(&mut TableQueryOptions)) {
        f(&mut self.lock().options);
    }

    pub fn set_sorting(&self, sorting: Vec<SortDescriptor>) {
        self.update(|options| options.sorting = sorting);
    }

    pub fn set_column_filters(&self, column_filters: Vec<ColumnFilter>) {
        self.update(|options| options.column_filters = column_filters);
    }

    pub fn set_global_filter(&self, global_filter: &str) {
        self.update(|options| options.search = global_filter.to_string());
    }

    pub fn set_pagination(&self, pagination: PaginationState) {
        self.update(|options| {
            options.page_index = pagination.page_index;
            options.page_size = pagination.page_size;
        });
    }

    /// Replaces the pass-through rows.
    pub fn set_rows(&self, rows: Vec<T>) {
        self.lock().rows = rows;
    }

    pub fn options(&self) -> TableQueryOptions {
        self.lock().options.clone()
    }

    /// The wire parameters for the current state.
    pub fn params(&self) -> WireQueryParams {
        encode(&self.lock().options)
    }

    pub fn query_key(&self) -> QueryKey {
        QueryKey::new(&self.namespace, self.params())
    }

    /// Fetches the data for the current state.
    ///
    /// A response is only shown if its cache key is still the current one
    /// when it arrives. State changes that leave the key unchanged (an empty
    /// filter, sorting away and back) keep the pending response.
    pub async fn load(&self) -> LoadOutcome {
        if !self.server_side {
            return LoadOutcome::Disabled;
        }

        let (key, params) = {
            let mut state = self.lock();
            let params = encode(&state.options);
            let key = QueryKey::new(&self.namespace, params.clone()).to_string();

            if let Some(hit) = self.cache.get_fresh(&key) {
                state.visible = Some(hit);
                state.error = None;
                state.pending = None;
                return LoadOutcome::Cached;
            }
            // A stale entry for this exact key beats the previous page.
            if let Some(stale) = self.cache.get(&key) {
                state.visible = Some(stale);
            }
            state.pending = Some(key.clone());
            (key, params)
        };

        let fetch = Arc::clone(&self.fetch);
        let result = self.cache.fetch(&key, move || fetch(params)).await;

        let mut state = self.lock();
        if self.key_of(&state.options) != key {
            tracing::debug!("Discarding superseded response for {}", key);
            return LoadOutcome::Superseded;
        }
        if state.pending.as_deref() == Some(key.as_str()) {
            state.pending = None;
        }
        match result {
            Ok(resp) => {
                state.visible = Some(resp);
                state.error = None;
                LoadOutcome::Applied
            }
            Err(e) => {
                tracing::warn!("Loading {} failed: {}", key, e);
                state.error = Some(e);
                LoadOutcome::Failed
            }
        }
    }

    /// Drops the cached entry for the current state and loads it again.
    pub async fn refetch(&self) -> LoadOutcome {
        if self.server_side {
            let key = self.key_of(&self.lock().options);
            self.cache.invalidate(&key);
        }
        self.load().await
    }

    pub fn view(&self) -> TableView<T> {
        let state = self.lock();
        let options = &state.options;
        let is_fetching = self.server_side
            && state.pending.as_deref() == Some(self.key_of(options).as_str());

        let (data, total_count, page_count) = if self.server_side {
            match &state.visible {
                Some(resp) => (resp.data.clone(), resp.total_count, resp.total_pages),
                None => (Vec::new(), 0, 0),
            }
        } else {
            local_page(&state.rows, options.pagination())
        };

        TableView {
            data,
            total_count,
            page_count,
            is_loading: is_fetching && state.visible.is_none(),
            is_fetching,
            error: state.error.clone(),
            sorting: options.sorting.clone(),
            column_filters: options.column_filters.clone(),
            global_filter: options.search.clone(),
            pagination: options.pagination(),
        }
    }
}

fn local_page<T: Clone>(rows: &[T], pagination: PaginationState) -> (Vec<T>, u64, u32) {
    let total = rows.len();
    if pagination.page_size == 0 {
        return (rows.to_vec(), total as u64, u32::from(total > 0));
    }
    let size = pagination.page_size as usize;
    let start = (pagination.page_index as usize).saturating_mul(size);
    let page = rows
        .iter()
        .skip(start)
        .take(size)
        .cloned()
        .collect::<Vec<_>>();
    let page_count = u32::try_from(total.div_ceil(size)).unwrap_or(u32::MAX);
    (page, total as u64, page_count)
}
