//! In-memory query cache backed by `DashMap`, with request deduplication.
//!
//! Every value is stored under a string key (see
//! [`QueryKey`](projectdesk_api::QueryKey)). An entry is *fresh* for
//! `stale_time` after it was fetched and is dropped once it is older than
//! `gc_time`. Concurrent fetches for the same key share one request.

use std::future::Future;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use projectdesk_api::Error;
use tokio::time::Instant;

use crate::config::CacheConfig;

type SharedFetch<V> = Shared<BoxFuture<'static, Result<V, Error>>>;

/// A single cached value with the time it was fetched.
struct CacheEntry<V> {
    value: V,
    fetched_at: Instant,
}

/// Thread-safe query cache with stale/garbage-collection times.
///
/// Expired entries are lazily evicted on the next read for that key, or in
/// bulk by [`QueryCache::gc`].
pub struct QueryCache<V> {
    store: DashMap<String, CacheEntry<V>>,
    in_flight: DashMap<String, SharedFetch<V>>,
    stale_time: Duration,
    gc_time: Duration,
}

impl<V> QueryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(config: CacheConfig) -> Self {
        Self {
            store: DashMap::new(),
            in_flight: DashMap::new(),
            stale_time: config.stale_time,
            gc_time: config.gc_time,
        }
    }

    /// Returns the value for `key` if it is still fresh.
    pub fn get_fresh(&self, key: &str) -> Option<V> {
        self.read(key, self.stale_time)
    }

    /// Returns the value for `key` even if stale, as long as it hasn't been collected.
    pub fn get(&self, key: &str) -> Option<V> {
        self.read(key, self.gc_time)
    }

    fn read(&self, key: &str, max_age: Duration) -> Option<V> {
        let entry = self.store.get(key)?;
        let age = entry.fetched_at.elapsed();
        if age >= self.gc_time {
            drop(entry);
            self.store.remove(key);
            return None;
        }
        (age < max_age).then(|| entry.value.clone())
    }

    /// Inserts or overwrites an entry, fresh from now.
    pub fn set(&self, key: String, value: V) {
        self.store.insert(
            key,
            CacheEntry {
                value,
                fetched_at: Instant::now(),
            },
        );
    }

    /// True while a request for `key` is running.
    pub fn is_fetching(&self, key: &str) -> bool {
        self.in_flight.contains_key(key)
    }

    /// Returns the fresh value for `key`, or runs `fetch` to get one.
    ///
    /// If a request for `key` is already running, waits for that request
    /// instead of starting another; `fetch` is not called. Successful results
    /// are stored; failures are not.
    pub async fn fetch<F, Fut>(&self, key: &str, fetch: F) -> Result<V, Error>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, Error>> + Send + 'static,
    {
        if let Some(value) = self.get_fresh(key) {
            tracing::debug!("Cache hit for {}", key);
            return Ok(value);
        }

        let shared = match self.in_flight.entry(key.to_string()) {
            Entry::Occupied(running) => {
                tracing::debug!("Joining in-flight request for {}", key);
                running.get().clone()
            }
            Entry::Vacant(slot) => {
                let shared = fetch().boxed().shared();
                slot.insert(shared.clone());
                shared
            }
        };

        let result = shared.clone().await;
        self.in_flight
            .remove_if(key, |_, running| running.ptr_eq(&shared));
        if let Ok(value) = &result {
            self.set(key.to_string(), value.clone());
        }
        result
    }

    /// Drops the entry for `key` so the next read refetches.
    pub fn invalidate(&self, key: &str) {
        self.store.remove(key);
    }

    /// Drops every entry whose key starts with `prefix`.
    pub fn invalidate_prefix(&self, prefix: &str) {
        self.store.retain(|key, _| !key.starts_with(prefix));
    }

    /// Removes every entry older than the collection time. Returns how many were dropped.
    pub fn gc(&self) -> usize {
        let before = self.store.len();
        let gc_time = self.gc_time;
        self.store
            .retain(|_, entry| entry.fetched_at.elapsed() < gc_time);
        before - self.store.len()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Removes all entries from the cache.
    pub fn clear(&self) {
        self.store.clear();
    }
}

impl<V> Default for QueryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
