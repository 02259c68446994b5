//! Result cache with sliding and absolute expiration
//!
//! Entries are keyed by [`SourceSet::cache_key`], so requests naming the same
//! sources in any order share one entry. An entry expires when it has been idle
//! for `sliding_expiration` or has existed for `absolute_expiration`, whichever
//! comes first. Expired entries are removed when looked up, whenever a new
//! entry is stored, and by the optional background sweeper.
//!
//! With `single_flight` enabled, concurrent misses for one key share a single
//! spawned computation. The computation is owned by its own task, so it runs to
//! completion and populates the cache even if the request that started it is
//! dropped.

use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::CacheConfig;
use crate::error::EngineError;
use crate::types::{AggregateResult, CacheStatus, SourceSet};

type Computation = Shared<BoxFuture<'static, Result<AggregateResult, EngineError>>>;

/// A memoized aggregate
#[derive(Clone, Debug)]
pub struct CacheEntry {
    /// Canonical key of the source set
    pub key: String,
    /// Stored result
    pub result: AggregateResult,
    /// When the entry was stored
    pub created_at: Instant,
    /// Last time the entry was served
    pub last_access: Instant,
}

impl CacheEntry {
    fn new(key: String, result: AggregateResult, now: Instant) -> Self {
        Self {
            key,
            result,
            created_at: now,
            last_access: now,
        }
    }

    /// Whether either expiration boundary has been reached at `now`
    pub fn is_expired(&self, now: Instant, config: &CacheConfig) -> bool {
        now.duration_since(self.last_access) >= config.sliding_expiration
            || now.duration_since(self.created_at) >= config.absolute_expiration
    }
}

struct CacheInner {
    config: CacheConfig,
    entries: Mutex<HashMap<String, CacheEntry>>,
    in_flight: Mutex<HashMap<String, Computation>>,
}

/// Shared, cheaply cloneable result cache
#[derive(Clone)]
pub struct ResultCache {
    inner: Arc<CacheInner>,
}

impl ResultCache {
    /// Create an empty cache
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                config,
                entries: Mutex::new(HashMap::new()),
                in_flight: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Cache settings
    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    /// Return the cached aggregate for `sources`, or compute and store it
    ///
    /// A hit refreshes the entry's sliding window. Errors are returned to every
    /// waiter and never stored.
    pub async fn get_or_compute<F, Fut>(
        &self,
        sources: &SourceSet,
        compute: F,
    ) -> Result<(AggregateResult, CacheStatus), EngineError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<AggregateResult, EngineError>> + Send + 'static,
    {
        if !self.inner.config.enabled {
            return Ok((compute().await?, CacheStatus::Bypass));
        }

        let key = sources.cache_key();
        if let Some(result) = self.lookup(&key).await {
            tracing::debug!(key = %key, "Cache hit");
            return Ok((result, CacheStatus::Hit));
        }

        if !self.inner.config.single_flight {
            tracing::debug!(key = %key, "Cache miss");
            let result = compute().await?;
            self.store(key, result.clone()).await;
            return Ok((result, CacheStatus::Miss));
        }

        let (computation, status) = {
            let mut in_flight = self.inner.in_flight.lock().await;
            match in_flight.get(&key) {
                Some(existing) => {
                    tracing::debug!(key = %key, "Joining in-flight computation");
                    (existing.clone(), CacheStatus::Shared)
                }
                None => {
                    // A computation may have finished since the first lookup;
                    // entries are stored before the in-flight slot is released.
                    if let Some(result) = self.lookup(&key).await {
                        tracing::debug!(key = %key, "Cache hit");
                        return Ok((result, CacheStatus::Hit));
                    }
                    tracing::debug!(key = %key, "Cache miss");
                    let computation = self.spawn_computation(key.clone(), compute());
                    in_flight.insert(key, computation.clone());
                    (computation, CacheStatus::Miss)
                }
            }
        };

        let result = computation.await?;
        Ok((result, status))
    }

    fn spawn_computation<Fut>(&self, key: String, compute: Fut) -> Computation
    where
        Fut: Future<Output = Result<AggregateResult, EngineError>> + Send + 'static,
    {
        let cache = self.clone();
        let handle = tokio::spawn(async move {
            let result = match AssertUnwindSafe(compute).catch_unwind().await {
                Ok(result) => result,
                Err(_) => Err(EngineError::Unexpected(
                    "aggregation task panicked".to_string(),
                )),
            };
            if let Ok(result) = &result {
                cache.store(key.clone(), result.clone()).await;
            }
            cache.inner.in_flight.lock().await.remove(&key);
            result
        });

        async move {
            handle
                .await
                .unwrap_or_else(|e| Err(EngineError::Unexpected(e.to_string())))
        }
        .boxed()
        .shared()
    }

    async fn lookup(&self, key: &str) -> Option<AggregateResult> {
        let now = Instant::now();
        let mut entries = self.inner.entries.lock().await;
        let entry = entries.get_mut(key)?;
        if entry.is_expired(now, &self.inner.config) {
            entries.remove(key);
            tracing::debug!(key = %key, "Cache entry expired");
            return None;
        }
        entry.last_access = now;
        Some(entry.result.clone())
    }

    // Expired entries are dropped on every store, so keys that are never
    // looked up again do not accumulate without a sweeper.
    async fn store(&self, key: String, result: AggregateResult) {
        let now = Instant::now();
        let mut entries = self.inner.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now, &self.inner.config));
        let purged = before - entries.len();
        if purged > 0 {
            tracing::debug!(purged, "Dropped expired cache entries on store");
        }
        entries.insert(key.clone(), CacheEntry::new(key, result, now));
    }

    /// Drop the entry for one source set; returns whether one existed
    pub async fn invalidate(&self, sources: &SourceSet) -> bool {
        self.inner
            .entries
            .lock()
            .await
            .remove(&sources.cache_key())
            .is_some()
    }

    /// Drop every entry; returns how many were removed
    pub async fn clear(&self) -> usize {
        let mut entries = self.inner.entries.lock().await;
        let count = entries.len();
        entries.clear();
        count
    }

    /// Drop expired entries; returns how many were removed
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.inner.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now, &self.inner.config));
        before - entries.len()
    }

    /// Number of stored entries, expired or not
    pub async fn len(&self) -> usize {
        self.inner.entries.lock().await.len()
    }

    /// Whether no entries are stored
    pub async fn is_empty(&self) -> bool {
        self.inner.entries.lock().await.is_empty()
    }

    /// Purge expired entries every `interval` until `token` is cancelled
    pub fn spawn_sweeper(&self, interval: Duration, token: CancellationToken) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let purged = cache.purge_expired().await;
                        if purged > 0 {
                            tracing::debug!(purged, "Purged expired cache entries");
                        }
                    }
                    _ = token.cancelled() => {
                        tracing::debug!("Cache sweeper stopped");
                        break;
                    }
                }
            }
        })
    }
}
