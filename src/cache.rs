//! Process-local cache with per-entry time-to-live.
//!
//! Entries expire lazily when read, and a background sweep removes expired
//! entries that nobody reads. Timestamps use the tokio clock.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

struct CacheEntry<V> {
    data: V,
    created_at: Instant,
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) >= self.ttl
    }
}

type Entries<V> = Mutex<HashMap<String, CacheEntry<V>>>;

pub struct TtlCache<V> {
    entries: Arc<Entries<V>>,
}

impl<V> Clone for TtlCache<V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<V> Default for TtlCache<V> {
    fn default() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<V: Clone + Send + 'static> TtlCache<V> {
    /// Cache without a background sweep; expiry happens on read only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache swept every `interval`. The sweep task stops once the last
    /// handle to the cache is dropped.
    pub fn with_sweep(interval: Duration) -> Self {
        let cache = Self::default();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let weak = Arc::downgrade(&cache.entries);
                let start = Instant::now() + interval;
                handle.spawn(sweep_loop(weak, start, interval));
            }
            Err(_) => tracing::warn!("no tokio runtime, cache sweep disabled"),
        }
        cache
    }

    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let key = key.into();
        tracing::debug!(key = %key, ttl_ms = ttl.as_millis() as u64, "cache set");
        self.entries.lock().insert(
            key,
            CacheEntry {
                data: value,
                created_at: Instant::now(),
                ttl,
            },
        );
    }

    /// `None` on miss or expiry.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock();
        let expired = match entries.get(key) {
            None => {
                tracing::debug!(key, "cache miss");
                return None;
            }
            Some(entry) => entry.is_expired(Instant::now()),
        };
        if expired {
            entries.remove(key);
            tracing::debug!(key, "cache expired");
            return None;
        }
        tracing::debug!(key, "cache hit");
        entries.get(key).map(|entry| entry.data.clone())
    }

    pub fn delete(&self, key: &str) -> bool {
        let removed = self.entries.lock().remove(key).is_some();
        if removed {
            tracing::debug!(key, "cache delete");
        }
        removed
    }

    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        let removed = entries.len();
        entries.clear();
        tracing::info!(removed, "cache cleared");
    }

    /// Number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every expired entry and return how many were dropped.
    pub fn sweep(&self) -> usize {
        sweep_entries(&self.entries)
    }
}

fn sweep_entries<V>(entries: &Entries<V>) -> usize {
    let now = Instant::now();
    let mut entries = entries.lock();
    let before = entries.len();
    entries.retain(|_, entry| !entry.is_expired(now));
    let removed = before - entries.len();
    if removed > 0 {
        tracing::debug!(removed, "cache sweep");
    }
    removed
}

/// First sweep at `start`, fixed from cache creation rather than first poll.
async fn sweep_loop<V>(entries: Weak<Entries<V>>, start: Instant, interval: Duration) {
    let mut ticker = tokio::time::interval_at(start, interval);
    loop {
        ticker.tick().await;
        let Some(entries) = entries.upgrade() else {
            break;
        };
        sweep_entries(&entries);
    }
}
