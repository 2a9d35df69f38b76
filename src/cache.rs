/// Cache defines a Lazy-TTL based HashMap.
/// Reads never return an entry older than the TTL; expired entries linger
/// until `expire_keys` sweeps them, which a background task does
/// periodically.
///
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, error};

use crate::concurrency_error;
use crate::error::Result;

#[derive(Clone, Debug)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

#[derive(Clone, Debug)]
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Arc<Mutex<HashMap<K, CacheEntry<V>>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + 'static,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<K, CacheEntry<V>>>> {
        self.entries
            .lock()
            .map_err(|e| concurrency_error!("Failed to acquire cache lock: {}", e))
    }

    /// Value for `key` unless absent or older than the TTL
    pub fn get(&self, key: &K) -> Result<Option<V>> {
        let entries = self.lock()?;
        Ok(entries
            .get(key)
            .filter(|entry| entry.inserted_at.elapsed() < self.ttl)
            .map(|entry| entry.value.clone()))
    }

    pub fn insert(&self, key: K, value: V) -> Result<()> {
        self.lock()?.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
        Ok(())
    }

    /// Entries held, expired or not
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    /// Drop every expired entry; returns how many were removed
    pub fn expire_keys(&self) -> Result<usize> {
        let mut entries = self.lock()?;
        let before = entries.len();
        let ttl = self.ttl;
        entries.retain(|_key, entry| entry.inserted_at.elapsed() < ttl);
        Ok(before - entries.len())
    }

    /// Sweep expired entries every `interval` until the handle is aborted
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            // first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match cache.expire_keys() {
                    Ok(0) => {}
                    Ok(removed) => debug!("Expired {} cache entries", removed),
                    Err(err) => error!("Cache sweep failed: {}", err),
                }
            }
        })
    }
}
