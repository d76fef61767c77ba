//! Keyed query cache with freshness and retention windows.
//!
//! Each entry remembers when it was fetched and when it was last used. A
//! lookup inside the freshness window is served from the cache; an entry
//! unused for longer than the retention window is evicted on access. A
//! stale-but-retained entry reports a miss so the caller refetches and
//! overwrites it.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::hash::Hash;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    fetched_at: DateTime<Utc>,
    last_used: DateTime<Utc>,
}

#[derive(Debug)]
pub struct QueryCache<K, V> {
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    fresh_window: Duration,
    retention_window: Duration,
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(fresh_window: Duration, retention_window: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            fresh_window,
            retention_window,
        }
    }

    /// Look up a key.
    ///
    /// Retention is checked first: an entry unused past the retention window
    /// is evicted even if it would otherwise still count as fresh. A fresh
    /// hit bumps `last_used`; a stale miss does not, so a failed refetch
    /// leaves the original retention clock running.
    pub async fn get(&self, key: &K) -> Option<V> {
        let now = Utc::now();
        let mut entries = self.entries.write().await;

        let entry = entries.get_mut(key)?;

        if now.signed_duration_since(entry.last_used) > self.retention_window {
            debug!("Cache entry past retention window, evicting");
            entries.remove(key);
            return None;
        }

        if now.signed_duration_since(entry.fetched_at) < self.fresh_window {
            entry.last_used = now;
            return Some(entry.value.clone());
        }

        None
    }

    /// Insert or overwrite an entry, resetting both timestamps.
    pub async fn insert(&self, key: K, value: V) {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            CacheEntry {
                value,
                fetched_at: now,
                last_used: now,
            },
        );
    }

    /// Drop every entry past its retention window.
    ///
    /// Eviction is otherwise lazy (performed on access); owners that prefer
    /// a periodic pass can call this from a background task.
    pub async fn sweep(&self) {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| {
            now.signed_duration_since(entry.last_used) <= self.retention_window
        });
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
